use std::io::Write;
use std::path::{Path, PathBuf};

use super::model::{CellValue, RecordSet};
use crate::error::Result;

pub const SEGMENT_VIEW_FILE: &str = "Segment_ViewData.csv";
pub const INVESTOR_VIEW_FILE: &str = "Investor_ViewData.csv";
pub const RFM_CAMPAIGN_FILE: &str = "RFM_Campaign.csv";

/// Text form of a cell as written to CSV.
///
/// Nulls become empty fields. Floats use the shortest representation that
/// parses back to the same value and always keep a fractional part, so a
/// re-read never turns them into integers.
pub fn field_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Float(v) => format!("{v:?}"),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        other => other.to_string(),
    }
}

/// Write `set` as UTF-8 CSV: one header row, then one line per record.
pub fn write_csv<W: Write>(set: &RecordSet, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(set.columns())?;
    for record in set.rows() {
        out.write_record(
            (0..set.columns().len()).map(|i| field_text(record.get(i))),
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn to_csv_bytes(set: &RecordSet) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(set, &mut buf)?;
    Ok(buf)
}

pub fn write_csv_file(set: &RecordSet, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(set, std::io::BufWriter::new(file))?;
    log::info!("Wrote {} rows to {}", set.len(), path.display());
    Ok(())
}

/// Write each `(file name, table)` pair into `dir`, returning the paths.
pub fn export_tables(dir: &Path, tables: &[(&str, &RecordSet)]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    tables
        .iter()
        .map(|(name, set)| {
            let path = dir.join(name);
            write_csv_file(set, &path)?;
            Ok(path)
        })
        .collect()
}
