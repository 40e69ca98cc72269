use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a translation oracle.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid document {}: {reason}", .path.display())]
    Document { path: PathBuf, reason: String },

    #[error("translation failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("failed to write {}: {reason}", .path.display())]
    Serialization { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn document(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Document {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Serialization {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
