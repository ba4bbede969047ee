#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FolioError>;

/// Configuration errors raised at construction time.
///
/// Nothing in the page is allowed to fail at runtime: a missing element or a
/// late callback degrades to "no animation" instead of surfacing an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FolioError {
    #[error("phrase sequence is empty")]
    EmptyPhraseSequence,

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl FolioError {
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            FolioError::EmptyPhraseSequence.to_string(),
            "phrase sequence is empty"
        );
        assert_eq!(
            FolioError::invalid("reveal_threshold", "must be within [0, 1]").to_string(),
            "invalid config value for reveal_threshold: must be within [0, 1]"
        );
    }
}
