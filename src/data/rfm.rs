use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::model::{CellValue, RecordSet};

/// Columns of the RFM campaign extract, in output order.
pub const RFM_COLUMNS: [&str; 7] = [
    "RFM Score",
    "Investors",
    "Primary Investor Type",
    "Last Investment Delta",
    "Total Investments",
    "Last Investment Size",
    "Preferred Industry",
];

/// Recency / frequency / monetary quintiles, each in `1..=5`.
///
/// Scores arrive precomputed with the dataset; this type only validates and
/// splits them. `111` is the weakest investor, `555` the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RfmScore {
    recency: u8,
    frequency: u8,
    monetary: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid RFM score '{0}': expected three digits between 1 and 5")]
pub struct InvalidRfmScore(pub String);

impl RfmScore {
    pub fn new(recency: u8, frequency: u8, monetary: u8) -> Result<Self, InvalidRfmScore> {
        let score = RfmScore {
            recency,
            frequency,
            monetary,
        };
        if [recency, frequency, monetary].iter().all(|q| (1..=5).contains(q)) {
            Ok(score)
        } else {
            Err(InvalidRfmScore(score.to_string()))
        }
    }

    /// Read a score cell, which may have been typed as text or integer.
    pub fn from_cell(cell: &CellValue) -> Result<Self, InvalidRfmScore> {
        match cell {
            CellValue::String(s) => s.parse(),
            CellValue::Integer(i) => i.to_string().parse(),
            other => Err(InvalidRfmScore(other.to_string())),
        }
    }

    pub fn recency(&self) -> u8 {
        self.recency
    }

    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    pub fn monetary(&self) -> u8 {
        self.monetary
    }

    /// Sum of the three quintiles, 3 to 15.
    pub fn total(&self) -> u8 {
        self.recency + self.frequency + self.monetary
    }
}

impl FromStr for RfmScore {
    type Err = InvalidRfmScore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .trim()
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| InvalidRfmScore(s.to_string()))?;
        match digits.as_slice() {
            [r, f, m] => RfmScore::new(*r, *f, *m).map_err(|_| InvalidRfmScore(s.to_string())),
            _ => Err(InvalidRfmScore(s.to_string())),
        }
    }
}

impl fmt::Display for RfmScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.recency, self.frequency, self.monetary)
    }
}

/// Project the filtered set onto the RFM campaign columns that exist.
pub fn rfm_projection(set: &RecordSet) -> RecordSet {
    set.project(&RFM_COLUMNS)
}

/// Row indices whose `RFM Score` is present but not a valid score.
///
/// Returns nothing when the column is absent; nulls are not reported.
pub fn invalid_score_rows(set: &RecordSet) -> Vec<usize> {
    let Ok(cells) = set.column(RFM_COLUMNS[0]) else {
        return Vec::new();
    };
    let bad: Vec<usize> = cells
        .enumerate()
        .filter(|(_, c)| !c.is_null() && RfmScore::from_cell(c).is_err())
        .map(|(i, _)| i)
        .collect();
    if !bad.is_empty() {
        log::warn!("{} rows carry an invalid RFM score", bad.len());
    }
    bad
}
