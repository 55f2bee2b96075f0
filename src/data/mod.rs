/// Data layer: core types, loading, filtering and summarising.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordSet (dates normalised)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   RecordSet   │  immutable store, typed cells
///   └──────────────┘
///        │   expand: industry tokens → option lists
///        ▼
///   ┌──────────┐
///   │  filter   │  date + industry → region → country / state cascade
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐     ┌──────┐
///   │ aggregate  │     │ rfm  │  segment tables, RFM projection
///   └───────────┘     └──────┘
///        │               │
///        ▼               ▼
///   ┌──────────┐
///   │  export   │  CSV extracts
///   └──────────┘
/// ```

pub mod aggregate;
pub mod expand;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod predicate;
pub mod rfm;
