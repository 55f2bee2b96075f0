use std::collections::BTreeMap;

use super::model::{CellValue, Record, RecordSet};
use crate::error::Result;

/// What to group by and what to measure.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    /// Grouping columns, outermost first.
    pub keys: Vec<String>,
    /// Column whose rows are counted; the count column keeps this name.
    pub metric: String,
    /// Optional numeric column summed per group.
    pub sum_of: Option<String>,
}

impl GroupSpec {
    pub fn count<S: Into<String>>(keys: Vec<S>, metric: impl Into<String>) -> Self {
        GroupSpec {
            keys: keys.into_iter().map(Into::into).collect(),
            metric: metric.into(),
            sum_of: None,
        }
    }

    pub fn with_sum(mut self, column: impl Into<String>) -> Self {
        self.sum_of = Some(column.into());
        self
    }
}

/// One group of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: Vec<CellValue>,
    pub count: usize,
    pub sum: Option<f64>,
}

/// A grouped summary, ordered by ascending count.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub spec: GroupSpec,
    pub rows: Vec<AggregateRow>,
}

impl Aggregation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Flatten into a table: key columns, then the count, then the sum.
    pub fn to_record_set(&self) -> RecordSet {
        let mut columns = self.spec.keys.clone();
        columns.push(self.spec.metric.clone());
        if let Some(sum_col) = &self.spec.sum_of {
            columns.push(sum_col.clone());
        }

        let rows = self
            .rows
            .iter()
            .map(|agg| {
                let mut values = agg.key.clone();
                values.push(CellValue::Integer(agg.count as i64));
                if self.spec.sum_of.is_some() {
                    values.push(CellValue::Float(agg.sum.unwrap_or(0.0)));
                }
                Record::new(values)
            })
            .collect();
        RecordSet::new(columns, rows)
    }
}

/// Group `set` by `spec.keys` and count (and optionally sum) each group.
///
/// Null keys form their own group. Ties in count keep key order.
pub fn aggregate(set: &RecordSet, spec: &GroupSpec) -> Result<Aggregation> {
    let key_idx = spec
        .keys
        .iter()
        .map(|k| set.column_index(k))
        .collect::<Result<Vec<_>>>()?;
    set.column_index(&spec.metric)?;
    let sum_idx = spec
        .sum_of
        .as_deref()
        .map(|c| set.column_index(c))
        .transpose()?;

    let mut groups: BTreeMap<Vec<CellValue>, (usize, f64)> = BTreeMap::new();
    for record in set.rows() {
        let key: Vec<CellValue> = key_idx.iter().map(|i| record.get(*i).clone()).collect();
        let entry = groups.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        if let Some(v) = sum_idx.and_then(|i| record.get(i).as_f64()) {
            entry.1 += v;
        }
    }

    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(key, (count, sum))| AggregateRow {
            key,
            count,
            sum: sum_idx.map(|_| sum),
        })
        .collect();
    rows.sort_by_key(|r| r.count);

    Ok(Aggregation {
        spec: spec.clone(),
        rows,
    })
}
