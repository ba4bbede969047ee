#![forbid(unsafe_code)]

use folio_core::FolioError;
use thiserror::Error;

/// Errors surfaced to the host by the page runner.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input or config JSON did not decode.
    #[error("malformed host input: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] FolioError),
    /// Unrecognized reveal effect name.
    #[error("unknown reveal effect: {0}")]
    UnknownEffect(String),
    #[error("runner has been disposed")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, InputError>;
