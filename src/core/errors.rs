use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Target {0} is out of scope")]
    ScopeViolation(String),

    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("persistence failure: {0}")]
    StoreUnavailable(String),

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconError {
    pub fn invalid_target(target: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ReconResult<T> = std::result::Result<T, ReconError>;
