//! Filter-and-aggregate pipeline for investor RFM datasets.
//!
//! A [`state::DashboardState`] owns the loaded table and the user's current
//! selection; each [`state::DashboardState::recompute`] runs the filter
//! cascade, the segment aggregations and the RFM projection from scratch.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::PipelineConfig;
pub use data::filter::{CascadeMode, FilterSelection};
pub use data::model::{CellValue, Record, RecordSet};
pub use data::predicate::TokenMatch;
pub use error::PipelineError;
pub use state::{DashboardState, DashboardView};
