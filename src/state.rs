use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::data::aggregate::{aggregate, Aggregation, GroupSpec};
use crate::data::export::{self, INVESTOR_VIEW_FILE, RFM_CAMPAIGN_FILE, SEGMENT_VIEW_FILE};
use crate::data::filter::{run_filters, FilterOutcome, FilterSelection};
use crate::data::loader;
use crate::data::model::RecordSet;
use crate::data::rfm::{invalid_score_rows, rfm_projection};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Selection dimensions
// ---------------------------------------------------------------------------

/// A multi-select filter a front-end can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Industry,
    Region,
    Country,
    State,
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything a front-end renders for one selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub outcome: FilterOutcome,
    /// Investor count per segment.
    pub segments: Aggregation,
    /// Investor count per segment and primary investor type.
    pub investor_types: Aggregation,
    /// Investor count and summed last investment size per segment, when the
    /// dataset carries investment sizes.
    pub investment: Option<Aggregation>,
    pub rfm: RecordSet,
    /// Rows of `rfm` whose score is not a valid three-quintile score.
    pub invalid_rfm_rows: Vec<usize>,
}

impl DashboardView {
    pub fn filtered(&self) -> &RecordSet {
        &self.outcome.filtered
    }

    /// Write the three downloadable extracts into `dir`.
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let segments = self.segments.to_record_set();
        let investor_types = self.investor_types.to_record_set();
        export::export_tables(
            dir,
            &[
                (SEGMENT_VIEW_FILE, &segments),
                (INVESTOR_VIEW_FILE, &investor_types),
                (RFM_CAMPAIGN_FILE, &self.rfm),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The loaded store plus the current selection, independent of rendering.
///
/// The store is never mutated after construction; every call to
/// [`DashboardState::recompute`] derives a fresh view from it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    store: RecordSet,
    pub config: PipelineConfig,
    pub selection: FilterSelection,
}

impl DashboardState {
    /// Wrap an already prepared store, checking its schema.
    pub fn new(store: RecordSet, config: PipelineConfig) -> Result<Self> {
        store.require_columns(&config.columns.required())?;
        Ok(Self {
            store,
            config,
            selection: FilterSelection::default(),
        })
    }

    pub fn load(path: &Path, config: PipelineConfig) -> anyhow::Result<Self> {
        let store = loader::load_file(path, &config)?;
        Ok(Self::new(store, config)?)
    }

    pub fn store(&self) -> &RecordSet {
        &self.store
    }

    fn values_mut(&mut self, dim: Dimension) -> &mut Vec<String> {
        match dim {
            Dimension::Industry => &mut self.selection.industries,
            Dimension::Region => &mut self.selection.regions,
            Dimension::Country => &mut self.selection.countries,
            Dimension::State => &mut self.selection.states,
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.values_mut(dim);
        if let Some(pos) = selected.iter().position(|v| v == value) {
            selected.remove(pos);
        } else {
            selected.push(value.to_string());
        }
    }

    /// Drop every value of a dimension, lifting its constraint.
    pub fn clear(&mut self, dim: Dimension) {
        self.values_mut(dim).clear();
    }

    /// Run filters, aggregations and the RFM projection for the current selection.
    pub fn recompute(&self) -> Result<DashboardView> {
        let cols = &self.config.columns;
        let outcome = run_filters(&self.store, &self.selection, &self.config)?;
        let filtered = &outcome.filtered;

        let segments = aggregate(
            filtered,
            &GroupSpec::count(vec![cols.segment.as_str()], cols.investors.as_str()),
        )?;
        let investor_types = aggregate(
            filtered,
            &GroupSpec::count(
                vec![cols.segment.as_str(), cols.investor_type.as_str()],
                cols.investors.as_str(),
            ),
        )?;
        let investment = if filtered.has_column(&cols.investment_size) {
            Some(aggregate(
                filtered,
                &GroupSpec::count(vec![cols.segment.as_str()], cols.investors.as_str())
                    .with_sum(cols.investment_size.as_str()),
            )?)
        } else {
            None
        };

        let rfm = rfm_projection(filtered);
        let invalid_rfm_rows = invalid_score_rows(&rfm);

        log::info!(
            "Recomputed view: {} rows, {} segments, {} segment/type groups",
            filtered.len(),
            segments.len(),
            investor_types.len()
        );

        Ok(DashboardView {
            outcome,
            segments,
            investor_types,
            investment,
            rfm,
            invalid_rfm_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DashboardState {
        let cfg = PipelineConfig::default();
        let csv = "\
Last Updated Date,Preferred Industry,HQ Global Region,HQ Country/Territory,HQ State/Province,Segment,Investors,Primary Investor Type
2023-01-01,AI,EMEA,UK,London,Core,A,VC
2023-01-02,Retail,Americas,USA,NY,Core,B,Angel
";
        let raw = loader::read_csv(csv.as_bytes()).unwrap();
        DashboardState::new(loader::prepare(raw, &cfg).unwrap(), cfg).unwrap()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut st = state();
        st.toggle(Dimension::Region, "EMEA");
        assert_eq!(st.selection.regions, vec!["EMEA".to_string()]);
        assert_eq!(st.recompute().unwrap().filtered().len(), 1);
        st.toggle(Dimension::Region, "EMEA");
        assert!(st.selection.regions.is_empty());
        assert_eq!(st.recompute().unwrap().filtered().len(), 2);
    }

    #[test]
    fn clear_lifts_only_that_dimension() {
        let mut st = state();
        st.toggle(Dimension::Region, "EMEA");
        st.toggle(Dimension::Region, "Americas");
        st.toggle(Dimension::Industry, "AI");
        assert_eq!(st.recompute().unwrap().filtered().len(), 1);

        st.clear(Dimension::Industry);
        assert!(st.selection.industries.is_empty());
        assert_eq!(st.selection.regions.len(), 2);
        assert_eq!(st.recompute().unwrap().filtered().len(), 2);

        st.clear(Dimension::Region);
        assert_eq!(st.selection, FilterSelection::default());
    }

    #[test]
    fn investment_view_needs_its_column() {
        let view = state().recompute().unwrap();
        assert!(view.investment.is_none());
        assert_eq!(view.segments.total_count(), 2);
        assert!(view.rfm.columns().contains(&"Investors".to_string()));
    }

    #[test]
    fn schema_mismatch_is_rejected_up_front() {
        let set = RecordSet::new(vec!["Segment".into()], Vec::new());
        assert!(DashboardState::new(set, PipelineConfig::default()).is_err());
    }
}
