use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expand::distinct_tokens;
use super::model::{CellValue, Record, RecordSet};
use super::predicate::MembershipPredicate;
use crate::config::PipelineConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter selection: what the user picked in each dimension
// ---------------------------------------------------------------------------

/// The user's constraints for one recomputation.
///
/// An empty list means "no constraint" for that dimension, never "match
/// nothing". A missing date bound defaults to the dataset's own extreme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub industries: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub regions: Vec<String>,
    pub countries: Vec<String>,
    pub states: Vec<String>,
}

/// Inclusive date range; an open side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Fill unset bounds of `selection` from the dataset's `(min, max)`.
    pub fn resolve(selection: &FilterSelection, bounds: Option<(NaiveDate, NaiveDate)>) -> Self {
        DateRange {
            start: selection.start.or(bounds.map(|(lo, _)| lo)),
            end: selection.end.or(bounds.map(|(_, hi)| hi)),
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Rows without a date never fall inside a range.
    pub fn contains(&self, cell: &CellValue) -> bool {
        let Some(d) = cell.as_date() else {
            return false;
        };
        self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e)
    }
}

// ---------------------------------------------------------------------------
// Cascade dispatch
// ---------------------------------------------------------------------------

/// How region / country / state selections combine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CascadeMode {
    /// Every non-empty selection narrows the result.
    #[default]
    Corrected,
    /// Fixed case table of the first dashboard release, in which a country
    /// selected on its own is ignored.
    Legacy,
}

/// Which of the three location dimensions carry a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionCase {
    Unconstrained,
    RegionOnly,
    CountryOnly,
    StateOnly,
    RegionCountry,
    RegionState,
    CountryState,
    All,
}

impl SelectionCase {
    pub fn classify(region: bool, country: bool, state: bool) -> Self {
        match (region, country, state) {
            (false, false, false) => SelectionCase::Unconstrained,
            (true, false, false) => SelectionCase::RegionOnly,
            (false, true, false) => SelectionCase::CountryOnly,
            (false, false, true) => SelectionCase::StateOnly,
            (true, true, false) => SelectionCase::RegionCountry,
            (true, false, true) => SelectionCase::RegionState,
            (false, true, true) => SelectionCase::CountryState,
            (true, true, true) => SelectionCase::All,
        }
    }

    pub fn of(selection: &FilterSelection) -> Self {
        Self::classify(
            !selection.regions.is_empty(),
            !selection.countries.is_empty(),
            !selection.states.is_empty(),
        )
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Option lists offered for each dimension given the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOptions {
    /// Industry tokens across the whole store (nulls kept as one token).
    pub industries: BTreeSet<CellValue>,
    /// Regions present after the date and industry filters.
    pub regions: BTreeSet<CellValue>,
    /// Countries present after the region filter.
    pub countries: BTreeSet<CellValue>,
    /// States present after the region filter.
    pub states: BTreeSet<CellValue>,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub filtered: RecordSet,
    pub case: SelectionCase,
    pub range: DateRange,
    pub options: CascadeOptions,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Exact membership of a single-valued cell; null never matches.
fn is_member(cell: &CellValue, values: &[String]) -> bool {
    match cell {
        CellValue::Null => false,
        CellValue::String(s) => values.iter().any(|v| v == s),
        other => {
            let text = other.to_string();
            values.iter().any(|v| *v == text)
        }
    }
}

/// Keep rows satisfying every `(column index, values)` membership test.
fn narrow(base: &RecordSet, tests: &[(usize, &[String])]) -> RecordSet {
    base.filter_rows(|r: &Record| tests.iter().all(|(idx, values)| is_member(r.get(*idx), values)))
}

/// Apply the date range and industry predicate. This is the cascade's base set.
pub fn apply_base_filters(
    set: &RecordSet,
    selection: &FilterSelection,
    range: &DateRange,
    config: &PipelineConfig,
) -> Result<RecordSet> {
    let cols = &config.columns;
    let date_idx = set.column_index(&cols.date)?;
    let industry_idx = set.column_index(&cols.industry)?;
    let industry = MembershipPredicate::new(
        &selection.industries,
        &config.token_delimiter,
        config.token_match,
    );

    if range.is_inverted() {
        log::warn!(
            "Start date {:?} is after end date {:?}; no rows can match",
            range.start,
            range.end
        );
    }

    Ok(set.filter_rows(|r| range.contains(r.get(date_idx)) && industry.matches(r.get(industry_idx))))
}

/// Run the full cascade over `set`: base filters, then region, country and
/// state according to `config.cascade`.
pub fn run_filters(
    set: &RecordSet,
    selection: &FilterSelection,
    config: &PipelineConfig,
) -> Result<FilterOutcome> {
    let cols = &config.columns;
    set.require_columns(&[
        &cols.date,
        &cols.industry,
        &cols.region,
        &cols.country,
        &cols.state,
    ])?;
    let region_idx = set.column_index(&cols.region)?;
    let country_idx = set.column_index(&cols.country)?;
    let state_idx = set.column_index(&cols.state)?;

    let range = DateRange::resolve(selection, set.date_bounds(&cols.date)?);
    let r0 = apply_base_filters(set, selection, &range, config)?;

    let r1 = if selection.regions.is_empty() {
        r0.clone()
    } else {
        narrow(&r0, &[(region_idx, selection.regions.as_slice())])
    };

    let options = CascadeOptions {
        industries: distinct_tokens(set, &cols.industry, &config.token_delimiter)?,
        regions: r0.unique_non_null(&cols.region)?,
        countries: r1.unique_non_null(&cols.country)?,
        states: r1.unique_non_null(&cols.state)?,
    };

    let region = (region_idx, selection.regions.as_slice());
    let country = (country_idx, selection.countries.as_slice());
    let state = (state_idx, selection.states.as_slice());

    let case = SelectionCase::of(selection);
    log::debug!("Location selection {case:?} dispatched in {:?} mode", config.cascade);

    let filtered = match config.cascade {
        CascadeMode::Corrected => match case {
            SelectionCase::Unconstrained => r0,
            SelectionCase::RegionOnly => r1,
            SelectionCase::CountryOnly | SelectionCase::RegionCountry => narrow(&r1, &[country]),
            SelectionCase::StateOnly | SelectionCase::RegionState => narrow(&r1, &[state]),
            SelectionCase::CountryState | SelectionCase::All => narrow(&r1, &[country, state]),
        },
        CascadeMode::Legacy => match case {
            SelectionCase::Unconstrained => r0,
            SelectionCase::RegionOnly => narrow(&r0, &[region]),
            // Filters the base set directly, bypassing the region step.
            SelectionCase::StateOnly => narrow(&r0, &[state]),
            SelectionCase::RegionState => narrow(&r1, &[region, state]),
            SelectionCase::CountryState => narrow(&r1, &[country, state]),
            SelectionCase::RegionCountry => narrow(&r1, &[region, country]),
            SelectionCase::All => narrow(&r1, &[region, country, state]),
            // Falls through to the catch-all branch: the country is not applied.
            SelectionCase::CountryOnly => r1,
        },
    };

    log::info!(
        "Filtered {} of {} rows ({case:?}, {:?})",
        filtered.len(),
        set.len(),
        config.cascade
    );

    Ok(FilterOutcome {
        filtered,
        case,
        range,
        options,
    })
}
