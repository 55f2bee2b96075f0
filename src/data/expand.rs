use std::collections::BTreeSet;

use super::model::{CellValue, RecordSet};
use crate::error::Result;

/// Split one multi-valued cell into its tokens.
pub fn split_tokens<'a>(raw: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    raw.split(delimiter)
}

/// Collect every distinct token of a multi-valued column.
///
/// String cells are split on `delimiter`; a null cell contributes a single
/// opaque [`CellValue::Null`] token and non-string cells are kept whole, so
/// a column without any delimiter degrades to plain distinct values.
pub fn distinct_tokens(set: &RecordSet, field: &str, delimiter: &str) -> Result<BTreeSet<CellValue>> {
    let mut tokens = BTreeSet::new();
    for cell in set.column(field)? {
        match cell {
            CellValue::String(raw) => {
                tokens.extend(split_tokens(raw, delimiter).map(CellValue::from));
            }
            other => {
                tokens.insert(other.clone());
            }
        }
    }
    Ok(tokens)
}
