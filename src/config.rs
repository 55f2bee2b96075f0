use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::CascadeMode;
use crate::data::predicate::TokenMatch;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Names of the columns each pipeline stage reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub date: String,
    pub industry: String,
    pub region: String,
    pub country: String,
    pub state: String,
    pub segment: String,
    pub investors: String,
    pub investor_type: String,
    pub investment_size: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: "Last Updated Date".into(),
            industry: "Preferred Industry".into(),
            region: "HQ Global Region".into(),
            country: "HQ Country/Territory".into(),
            state: "HQ State/Province".into(),
            segment: "Segment".into(),
            investors: "Investors".into(),
            investor_type: "Primary Investor Type".into(),
            investment_size: "Last Investment Size".into(),
        }
    }
}

impl Columns {
    /// Columns the filter engine and aggregator cannot run without.
    pub fn required(&self) -> [&str; 8] {
        [
            &self.date,
            &self.industry,
            &self.region,
            &self.country,
            &self.state,
            &self.segment,
            &self.investors,
            &self.investor_type,
        ]
    }
}

// ---------------------------------------------------------------------------
// Source encoding
// ---------------------------------------------------------------------------

/// Byte encoding of delimited-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[default]
    Latin1,
    Utf8,
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Everything the pipeline needs besides the data and the user's selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: Columns,
    /// Separator between tokens of a multi-valued cell.
    pub token_delimiter: String,
    pub encoding: SourceEncoding,
    pub token_match: TokenMatch,
    pub cascade: CascadeMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            token_delimiter: ", ".into(),
            encoding: SourceEncoding::default(),
            token_match: TokenMatch::default(),
            cascade: CascadeMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PipelineConfig = serde_json::from_str(
            r#"{ "cascade": "legacy", "columns": { "segment": "Tier" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.cascade, CascadeMode::Legacy);
        assert_eq!(cfg.columns.segment, "Tier");
        assert_eq!(cfg.columns.date, "Last Updated Date");
        assert_eq!(cfg.token_delimiter, ", ");
        assert_eq!(cfg.encoding, SourceEncoding::Latin1);
        assert_eq!(cfg.token_match, TokenMatch::TokenSet);
    }
}
