//! cnablib — reading, point-editing and writing of CNAB 400 (Bradesco) return files.

pub mod codec;
pub mod edit;
pub mod error;
pub mod model;
pub mod schema;
pub mod traits;

pub mod formats {
    pub mod cnab400;
    pub mod csv;
}

pub use edit::{apply_point_edits, ModificationSet};
pub use error::{CnabError, Result};
pub use model::{CnabFile, Detail, FieldValue, FileSummary, Header, RecordKind, Trailer};
