//! Unified error type of the public API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CnabError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("file contains no records")]
    EmptyFile,

    #[error("value of {field} does not fit in {width} digits: {cents} cents")]
    FieldOverflow {
        field: &'static str,
        width: usize,
        cents: i64,
    },
}

pub type Result<T> = std::result::Result<T, CnabError>;
