use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use studybuddy_matcher::MatchError;
use studybuddy_otp::OtpError;
use studybuddy_types::api::ErrorResponse;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("email not verified, request and enter a verification code first")]
    NotVerified,

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// The matcher only ever sees profiles loaded from storage, so malformed
/// input there is a server-side data problem rather than a bad request.
impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::InvalidInput(msg) => {
                ApiError::Internal(anyhow::anyhow!("corrupt stored profile: {}", msg))
            }
            MatchError::SubjectNotFound(id) => ApiError::NotFound(format!("student {} not found", id)),
            MatchError::Store(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Otp(e) => match e {
                OtpError::NoActiveChallenge | OtpError::CodeMismatch => StatusCode::BAD_REQUEST,
                OtpError::Expired => StatusCode::GONE,
                OtpError::AlreadyConsumed => StatusCode::CONFLICT,
                OtpError::Exhausted => StatusCode::TOO_MANY_REQUESTS,
                OtpError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotVerified => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "internal server error".to_string()
            }
            // Mail transport details stay in the log.
            ApiError::Otp(OtpError::DeliveryFailed(_)) => {
                "failed to send verification code, please try again".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
