use studybuddy_types::models::{MatchResult, StudentProfile};
use uuid::Uuid;

use crate::error::MatchError;
use crate::matcher::Matcher;

/// Backing store the matcher reads its subject and candidate pool from.
pub trait ProfileStore {
    fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<StudentProfile>>;

    /// Every stored profile except `exclude_id`.
    fn list_candidates(&self, exclude_id: Uuid) -> anyhow::Result<Vec<StudentProfile>>;
}

/// Load `subject_id` and everyone else from `store`, then rank them.
///
/// Returns the subject alongside its matches and the pool size, which the
/// HTTP layer reports back as `total_checked`.
pub fn matches_for<S: ProfileStore + ?Sized>(
    store: &S,
    matcher: &Matcher,
    subject_id: Uuid,
) -> Result<(StudentProfile, Vec<MatchResult>, usize), MatchError> {
    let subject = store
        .get_profile(subject_id)?
        .ok_or(MatchError::SubjectNotFound(subject_id))?;
    let pool = store.list_candidates(subject_id)?;
    let matches = matcher.compute_matches(&subject, &pool)?;
    Ok((subject, matches, pool.len()))
}
