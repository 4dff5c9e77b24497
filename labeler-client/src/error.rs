//! Client error types

use thiserror::Error;

/// Checks that fail before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select an image first")]
    NoImageSelected,

    #[error("Please enter your name")]
    MissingLabelerName,

    #[error("Please make at least one comparison")]
    NoComparisonMade,

    #[error("Draw a pair of images first")]
    NoPairDrawn,

    #[error("Need at least two images to compare, catalog has {0}")]
    CatalogTooSmall(usize),
}

/// Errors surfaced by the annotation client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Saved {saved} of {attempted} comparisons; failed: {}", .failed.join(", "))]
    PartialSave {
        saved: usize,
        attempted: usize,
        failed: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_save_message_lists_failures() {
        let err = ClientError::PartialSave {
            saved: 1,
            attempted: 3,
            failed: vec!["dense: timeout".to_string(), "sparse: 500".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Saved 1 of 3 comparisons; failed: dense: timeout, sparse: 500"
        );
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: ClientError = ValidationError::MissingLabelerName.into();
        assert_eq!(err.to_string(), "Please enter your name");
    }
}
