use thiserror::Error;

/// Outcomes of a failed `send` or `verify`. Each variant maps to distinct
/// guidance for the user ("request a new code" vs "check the code").
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("no active verification code for this email")]
    NoActiveChallenge,

    #[error("verification code has expired")]
    Expired,

    #[error("verification code does not match")]
    CodeMismatch,

    #[error("verification code has already been used")]
    AlreadyConsumed,

    #[error("too many incorrect attempts, request a new code")]
    Exhausted,

    #[error("failed to deliver verification code: {0}")]
    DeliveryFailed(String),
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("mail relay rejected message with status {0}")]
    Rejected(u16),
}
