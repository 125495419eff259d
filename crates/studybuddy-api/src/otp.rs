use axum::{Json, extract::State, response::IntoResponse};

use studybuddy_types::api::{MessageResponse, SendOtpRequest, SendOtpResponse, VerifyOtpRequest};
use studybuddy_types::models::OtpPurpose;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;
use crate::validation::{check_code_format, check_email_domain, normalize_email};

/// POST /otp/send: issue (or reissue) a code for the given flow.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    check_email_domain(&email, &state.email_domain)?;

    // Fail early on flows that could never complete.
    let db = state.db.clone();
    let lookup = email.clone();
    let registered = run_blocking(move || Ok(db.get_student_by_email(&lookup)?.is_some())).await?;
    match (req.purpose, registered) {
        (OtpPurpose::Registration, true) => {
            return Err(ApiError::Conflict("email already registered".into()));
        }
        (OtpPurpose::Login, false) => {
            return Err(ApiError::NotFound(
                "no account found with this email, please register first".into(),
            ));
        }
        _ => {}
    }

    let issued = state.otp.send(&email, req.purpose).await?;

    Ok(Json(SendOtpResponse {
        message: "verification code sent to your email".into(),
        expires_at: issued.expires_at,
    }))
}

/// POST /otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    let code = req.code.trim();
    if email.is_empty() {
        return Err(ApiError::InvalidInput("email is required".into()));
    }
    check_code_format(code)?;

    state.otp.verify(&email, req.purpose, code).await?;

    Ok(Json(MessageResponse {
        message: "email verified successfully".into(),
    }))
}
