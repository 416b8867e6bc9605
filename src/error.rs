use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that stop a search before or while it is set up.
#[derive(Error, Debug)]
pub enum SearchError {
    /// No keys were read, so there is nothing to hash.
    #[error("no keys given: the key set is empty")]
    EmptyKeySet,

    /// An input file (or stdin) could not be read.
    #[error("could not read keys from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON config file is malformed.
    #[error("could not parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A merged config value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
