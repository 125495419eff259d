use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use studybuddy_types::api::{Claims, StudentsResponse, UpdateProfileRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;
use crate::validation::check_preferences;

pub async fn list_students(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let students = run_blocking(move || Ok(db.list_students()?)).await?;
    Ok(Json(StudentsResponse {
        count: students.len(),
        students,
    }))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let student = run_blocking(move || Ok(db.get_student(student_id)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("student not found".into()))?;
    Ok(Json(student))
}

/// PUT /me/profile: replace the caller's courses, spots and times.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prefs = check_preferences(
        &state.vocabulary,
        &req.courses,
        &req.study_spots,
        &req.study_times,
    )?;

    let db = state.db.clone();
    let id = claims.sub;
    let student = run_blocking(move || {
        if !db.update_preferences(id, &prefs.courses, &prefs.study_spots, &prefs.study_times)? {
            return Err(ApiError::NotFound("user not found".into()));
        }
        db.get_student(id)?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    })
    .await?;

    info!("Student {} updated preferences", id);
    Ok(Json(student))
}
