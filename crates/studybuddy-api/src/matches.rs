use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use studybuddy_matcher::matches_for;
use studybuddy_types::api::MatchesResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    /// Overrides the configured top-N cut; 0 returns every match.
    pub limit: Option<usize>,
}

/// GET /matches/{student_id}: ranked study partners for one student.
pub async fn get_matches(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let matcher = state.matcher;
    let (subject, mut matches, total_checked) =
        run_blocking(move || Ok(matches_for(db.as_ref(), &matcher, student_id)?)).await?;

    let limit = query.limit.unwrap_or(state.match_limit);
    if limit > 0 {
        matches.truncate(limit);
    }
    debug!(
        "Returning {} matches for {} out of {} candidates",
        matches.len(),
        student_id,
        total_checked
    );

    Ok(Json(MatchesResponse {
        target_student: subject.name,
        matches,
        total_checked,
    }))
}
