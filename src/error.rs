use thiserror::Error;

/// Failures raised by the filter-and-aggregate pipeline.
///
/// Everything here is fatal for the current recomputation; recoverable
/// conditions (null cells, empty selections, empty results) never surface
/// as errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configured column is not part of the record schema.
    #[error("schema mismatch: column '{column}' not found (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A cell of the designated date column could not be parsed.
    #[error("row {row}: cannot parse '{value}' in date column '{column}'")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
