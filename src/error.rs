use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("issue {key} not found")]
    NotFound { key: String },
    #[error("authentication rejected: {0}")]
    Authentication(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("no ticket keys found in block {block_id}")]
    NoIssues { block_id: String },
    #[error("block {block_id} does not exist")]
    BlockNotFound { block_id: String },
    #[error("block store error: {0}")]
    BlockStore(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Per-ticket failures that are reported and skipped instead of aborting a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::Authentication(_) | AppError::IssueTracker(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_recoverable() {
        assert!(
            AppError::NotFound {
                key: "DEV-1".to_string()
            }
            .is_recoverable()
        );
        assert!(AppError::IssueTracker("timeout".to_string()).is_recoverable());
        assert!(AppError::Authentication("401".to_string()).is_recoverable());
    }

    #[test]
    fn configuration_failures_abort() {
        assert!(!AppError::Configuration("missing token".to_string()).is_recoverable());
        assert!(
            !AppError::NoIssues {
                block_id: "b".to_string()
            }
            .is_recoverable()
        );
    }
}
