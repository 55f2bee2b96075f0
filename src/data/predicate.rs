use serde::{Deserialize, Serialize};

use super::expand::split_tokens;
use super::model::CellValue;

/// How selected tokens are tested against a raw multi-valued cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TokenMatch {
    /// Any selected token occurs as a substring of the raw cell. Over-matches
    /// when a token is part of an unrelated one ("AI" inside "Retail").
    Substring,
    /// The cell's token set intersects the selection.
    #[default]
    TokenSet,
}

/// Membership test built from a list of selected tokens.
///
/// An empty selection places no constraint and accepts every cell, nulls
/// included. With a non-empty selection a null or non-text cell never matches.
#[derive(Debug, Clone)]
pub struct MembershipPredicate {
    selected: Vec<String>,
    delimiter: String,
    mode: TokenMatch,
}

impl MembershipPredicate {
    pub fn new<S: AsRef<str>>(selected: &[S], delimiter: &str, mode: TokenMatch) -> Self {
        Self {
            selected: selected.iter().map(|s| s.as_ref().to_string()).collect(),
            delimiter: delimiter.to_string(),
            mode,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        let Some(raw) = cell.as_str() else {
            return false;
        };
        match self.mode {
            TokenMatch::Substring => self.selected.iter().any(|s| raw.contains(s.as_str())),
            TokenMatch::TokenSet => split_tokens(raw, &self.delimiter)
                .any(|tok| self.selected.iter().any(|s| s == tok)),
        }
    }
}
