use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use studybuddy_db::Database;
use studybuddy_matcher::Matcher;
use studybuddy_otp::OtpVerifier;
use studybuddy_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use studybuddy_types::models::{OtpPurpose, StudentProfile};
use studybuddy_types::vocabulary::Vocabulary;

use crate::error::ApiError;
use crate::run_blocking;
use crate::validation::{check_department, check_email_domain, check_preferences, normalize_email};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub otp: Arc<OtpVerifier>,
    pub matcher: Matcher,
    pub vocabulary: Vocabulary,
    pub jwt_secret: String,
    pub email_domain: String,
    /// Top-N cut applied by the matches endpoint; 0 returns everything.
    pub match_limit: usize,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    check_email_domain(&email, &state.email_domain)?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name is required".into()));
    }
    check_department(&state.vocabulary, &req.college, &req.department)?;
    let prefs = check_preferences(
        &state.vocabulary,
        &req.courses,
        &req.study_spots,
        &req.study_times,
    )?;

    let student = StudentProfile {
        id: Uuid::new_v4(),
        name,
        email: email.clone(),
        college: req.college,
        department: req.department,
        courses: prefs.courses,
        study_spots: prefs.study_spots,
        study_times: prefs.study_times,
        created_at: Utc::now(),
    };

    // Redeeming the code is the last check before the insert so a rejected
    // form does not burn the verification.
    if !state.otp.take_verified(&email, OtpPurpose::Registration).await {
        return Err(ApiError::NotVerified);
    }

    let db = state.db.clone();
    let student = run_blocking(move || {
        if db.create_student(&student)? {
            Ok(student)
        } else {
            Err(ApiError::Conflict("email already registered".into()))
        }
    })
    .await?;

    info!("Registered student {} <{}>", student.id, student.email);

    let token = create_token(&state.jwt_secret, &student)?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            student_id: student.id,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);
    check_email_domain(&email, &state.email_domain)?;

    let db = state.db.clone();
    let lookup = email.clone();
    let student = run_blocking(move || Ok(db.get_student_by_email(&lookup)?))
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("no account found with this email, please register first".into())
        })?;

    if !state.otp.take_verified(&email, OtpPurpose::Login).await {
        return Err(ApiError::NotVerified);
    }

    let token = create_token(&state.jwt_secret, &student)?;
    info!("Student {} logged in", student.id);

    Ok(Json(LoginResponse {
        student_id: student.id,
        name: student.name,
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let student = run_blocking(move || Ok(db.get_student(claims.sub)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(student))
}

pub fn create_token(secret: &str, student: &StudentProfile) -> anyhow::Result<String> {
    let claims = Claims {
        sub: student.id,
        email: student.email.clone(),
        name: student.name.clone(),
        exp: (Utc::now() + chrono::Duration::days(7)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
