use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PacingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type PacingResult<T> = Result<T, PacingError>;
