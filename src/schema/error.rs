use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Conditions reported while loading an `ApiSchema`
///
/// Completion itself never fails; these only surface at startup, where the
/// caller degrades to `ApiSchema::empty()`.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema declares no globals, types or constants")]
    Empty,
}
