//! Error taxonomy for the warehouse refresh.
//!
//! Every variant is fatal for the run it occurs in. Row-level problems
//! (unresolved geography, unparseable values) are not errors and never
//! show up here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input file {path} is missing or empty")]
    MissingInput { path: PathBuf },

    #[error("input file {path} contains no data rows")]
    EmptyInput { path: PathBuf },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Database stayed unreachable for every connection attempt.
    #[error("could not connect to database after {attempts} attempts: {source}")]
    Connectivity {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("schema statement failed ({statement}): {source}")]
    Schema {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = EtlError> = std::result::Result<T, E>;
