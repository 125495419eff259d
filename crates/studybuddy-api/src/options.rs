use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use studybuddy_types::api::{DepartmentsResponse, OptionsResponse};

use crate::auth::AppState;

pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to StudyBuddy!",
        "endpoints": {
            "send_otp": "POST /otp/send",
            "verify_otp": "POST /otp/verify",
            "register": "POST /auth/register",
            "login": "POST /auth/login",
            "me": "GET /me (requires auth)",
            "update_profile": "PUT /me/profile (requires auth)",
            "students": "GET /students (requires auth)",
            "student": "GET /students/{student_id} (requires auth)",
            "matches": "GET /matches/{student_id} (requires auth)",
            "options": "GET /options",
            "departments": "GET /options/departments/{college}",
        }
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    let vocab = &state.vocabulary;
    Json(OptionsResponse {
        colleges: vocab.colleges.clone(),
        study_spots: vocab.study_spots.clone(),
        study_times: vocab.study_times.clone(),
    })
}

/// Unknown colleges get an empty list rather than a 404.
pub async fn get_departments(
    State(state): State<AppState>,
    Path(college): Path<String>,
) -> impl IntoResponse {
    let departments = state
        .vocabulary
        .departments_of(&college)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    Json(DepartmentsResponse { departments })
}
