use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the investor table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used as a `BTreeSet` / `BTreeMap` key downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Total order so option lists and group keys sort; floats via total_cmp, nulls first --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to interpret the value as an `f64` for sums.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

static NULL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single investor row. Cells are positional, aligned with the owning
/// [`RecordSet`]'s column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<CellValue>,
}

impl Record {
    pub fn new(values: Vec<CellValue>) -> Self {
        Record { values }
    }

    /// Cell at `index`; a short row reads as null past its end.
    pub fn get(&self, index: usize) -> &CellValue {
        self.values.get(index).unwrap_or(&NULL)
    }
}

impl From<Vec<CellValue>> for Record {
    fn from(values: Vec<CellValue>) -> Self {
        Record::new(values)
    }
}

// ---------------------------------------------------------------------------
// RecordSet – an ordered table sharing one schema
// ---------------------------------------------------------------------------

/// An ordered, immutable sequence of records sharing a schema.
///
/// Every transformation returns a fresh `RecordSet`; nothing here mutates
/// the rows of an existing set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        RecordSet { columns, rows }
    }

    /// An empty set with the same schema as `self`.
    pub fn empty_like(&self) -> Self {
        RecordSet::new(self.columns.clone(), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of `name` in the schema. A missing column is a schema
    /// mismatch, never a per-row skip.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Iterate the cells of one column in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| r.get(idx)))
    }

    /// Fail with [`PipelineError::MissingColumn`] on the first absent name.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.column_index(name.as_ref())?;
        }
        Ok(())
    }

    /// Keep the rows passing `keep`, preserving their relative order.
    pub fn filter_rows<F>(&self, mut keep: F) -> RecordSet
    where
        F: FnMut(&Record) -> bool,
    {
        let rows = self.rows.iter().filter(|r| keep(r)).cloned().collect();
        RecordSet::new(self.columns.clone(), rows)
    }

    /// Project onto `names`, silently skipping columns the schema lacks.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> RecordSet {
        let picked: Vec<(usize, String)> = names
            .iter()
            .filter_map(|n| {
                let n = n.as_ref();
                self.columns
                    .iter()
                    .position(|c| c == n)
                    .map(|i| (i, n.to_string()))
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|r| Record::new(picked.iter().map(|(i, _)| r.get(*i).clone()).collect()))
            .collect();
        RecordSet::new(picked.into_iter().map(|(_, n)| n).collect(), rows)
    }

    /// Sorted distinct non-null values of a single-valued column.
    pub fn unique_non_null(&self, name: &str) -> Result<BTreeSet<CellValue>> {
        Ok(self
            .column(name)?
            .filter(|v| !v.is_null())
            .cloned()
            .collect())
    }

    /// Earliest and latest date in `name`, or `None` when no cell holds a date.
    pub fn date_bounds(&self, name: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for d in self.column(name)?.filter_map(CellValue::as_date) {
            bounds = Some(match bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        Ok(bounds)
    }

    /// Rebuild the set with every cell of column `name` passed through `f`.
    pub fn try_map_column<F>(self, name: &str, mut f: F) -> Result<RecordSet>
    where
        F: FnMut(usize, CellValue) -> Result<CellValue>,
    {
        let idx = self.column_index(name)?;
        let RecordSet { columns, rows } = self;
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_no, record)| {
                let mut values = record.values;
                if idx < values.len() {
                    let cell = std::mem::replace(&mut values[idx], CellValue::Null);
                    values[idx] = f(row_no, cell)?;
                }
                Ok(Record::new(values))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordSet::new(columns, rows))
    }
}
