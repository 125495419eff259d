use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("student {0} not found")]
    SubjectNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
