use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the credential store, the sheet client and the row locator.
///
/// Only `main` decides to terminate the process; every component hands one of
/// these back instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing configuration: unreadable credential file, bad column flag.
    #[error("configuration error: {0}")]
    Config(String),

    /// Client secret could not be parsed or the token exchange failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network or API failure on a read or a write.
    #[error("sheets request failed: {0}")]
    Transport(String),

    /// Cell content that cannot be used, e.g. a non-numeric counter.
    #[error("unexpected sheet data: {0}")]
    Data(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
