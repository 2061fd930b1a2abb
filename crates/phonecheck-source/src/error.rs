use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("expected phone file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("expected phone file has no usable records: {0}")]
    NoRecords(PathBuf),
    #[error("expected phone file {path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[cfg(feature = "http")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "http")]
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

impl SourceError {
    /// Errors that must stop a run before any page is visited.
    pub fn is_setup(&self) -> bool {
        matches!(self, SourceError::FileNotFound(_) | SourceError::NoRecords(_))
    }

    /// Errors caused by malformed user data rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            SourceError::MissingColumn { .. }
            | SourceError::Csv { .. }
            | SourceError::Selector { .. }
            | SourceError::Parse(_) => true,
            SourceError::FileNotFound(_) | SourceError::NoRecords(_) | SourceError::Read { .. } => {
                false
            }
            #[cfg(feature = "http")]
            SourceError::Http(_) => false,
            #[cfg(feature = "http")]
            SourceError::Url(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
