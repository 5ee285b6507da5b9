use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    /// A toggle named a series key the visibility map was never built with.
    #[error("unknown series key: {0}")]
    UnknownSeries(String),

    #[error("no records to draw for chart {0:?}")]
    EmptyFrame(String),

    #[error("group {group:?}: record {index} does not share the schema of the first record (field {field:?})")]
    SchemaMismatch {
        group: String,
        index: usize,
        field: String,
    },

    #[error("render failed: {0}")]
    Render(String),
}
