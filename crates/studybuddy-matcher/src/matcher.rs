use std::cmp::Ordering;
use std::collections::HashSet;

use studybuddy_types::models::{MatchResult, StudentProfile};
use tracing::debug;
use uuid::Uuid;

use crate::error::MatchError;
use crate::weights::MatchWeights;

/// Pure scoring engine. Holds nothing but its weights, so a single
/// instance can be shared freely across request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    weights: MatchWeights,
}

impl Matcher {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> MatchWeights {
        self.weights
    }

    /// Rank `pool` against `subject`.
    ///
    /// Candidates with no overlap in any category are left out. Results are
    /// sorted by similarity, then shared-course count (both descending), then
    /// candidate id ascending.
    pub fn compute_matches(
        &self,
        subject: &StudentProfile,
        pool: &[StudentProfile],
    ) -> Result<Vec<MatchResult>, MatchError> {
        validate_profile(subject)?;
        let mut seen = HashSet::with_capacity(pool.len());
        for candidate in pool {
            validate_profile(candidate)?;
            if !seen.insert(candidate.id) {
                return Err(MatchError::InvalidInput(format!(
                    "candidate {} appears more than once in the pool",
                    candidate.id
                )));
            }
        }

        let mut results: Vec<MatchResult> = pool
            .iter()
            .filter(|candidate| candidate.id != subject.id)
            .filter_map(|candidate| self.score(subject, candidate))
            .collect();

        results.sort_by(rank_order);

        debug!(
            "Matched {} of {} candidates for {}",
            results.len(),
            pool.len(),
            subject.id
        );
        Ok(results)
    }

    fn score(&self, subject: &StudentProfile, candidate: &StudentProfile) -> Option<MatchResult> {
        let courses = Overlap::of(&subject.courses, &candidate.courses);
        let spots = Overlap::of(&subject.study_spots, &candidate.study_spots);
        let times = Overlap::of(&subject.study_times, &candidate.study_times);

        let combined = self.weights.courses * courses.jaccard()
            + self.weights.spots * spots.jaccard()
            + self.weights.times * times.jaccard();
        let similarity = (combined * 100.0).round().clamp(0.0, 100.0) as u8;

        let any_shared =
            !courses.shared.is_empty() || !spots.shared.is_empty() || !times.shared.is_empty();
        if similarity == 0 && !any_shared {
            return None;
        }

        Some(MatchResult {
            candidate_id: candidate.id,
            name: candidate.name.clone(),
            department: candidate.department.clone(),
            shared_courses: courses.shared,
            shared_spots: spots.shared,
            shared_times: times.shared,
            similarity,
        })
    }
}

/// [`Matcher::compute_matches`] with the default weights.
pub fn compute_matches(
    subject: &StudentProfile,
    pool: &[StudentProfile],
) -> Result<Vec<MatchResult>, MatchError> {
    Matcher::default().compute_matches(subject, pool)
}

fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.similarity
        .cmp(&a.similarity)
        .then_with(|| b.shared_courses.len().cmp(&a.shared_courses.len()))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

/// Intersection of one category, in the subject's order, plus the union size.
struct Overlap {
    shared: Vec<String>,
    union: usize,
}

impl Overlap {
    fn of(subject: &[String], candidate: &[String]) -> Self {
        let theirs: HashSet<&str> = candidate.iter().map(String::as_str).collect();
        let shared: Vec<String> = subject
            .iter()
            .filter(|item| theirs.contains(item.as_str()))
            .cloned()
            .collect();
        // Both sides are duplicate-free, so |A ∪ B| = |A| + |B| - |A ∩ B|.
        let union = subject.len() + candidate.len() - shared.len();
        Self { shared, union }
    }

    /// Empty on both sides contributes 0 rather than being skipped.
    fn jaccard(&self) -> f64 {
        if self.union == 0 {
            0.0
        } else {
            self.shared.len() as f64 / self.union as f64
        }
    }
}

fn validate_profile(profile: &StudentProfile) -> Result<(), MatchError> {
    if profile.id == Uuid::nil() {
        return Err(MatchError::InvalidInput("profile is missing an id".into()));
    }
    if profile.name.trim().is_empty() {
        return Err(MatchError::InvalidInput(format!(
            "profile {} has no name",
            profile.id
        )));
    }
    if profile.email.trim().is_empty() {
        return Err(MatchError::InvalidInput(format!(
            "profile {} has no email",
            profile.id
        )));
    }
    validate_category(profile.id, "courses", &profile.courses)?;
    validate_category(profile.id, "study_spots", &profile.study_spots)?;
    validate_category(profile.id, "study_times", &profile.study_times)
}

fn validate_category(id: Uuid, field: &str, items: &[String]) -> Result<(), MatchError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.is_empty() {
            return Err(MatchError::InvalidInput(format!(
                "profile {id} has an empty entry in {field}"
            )));
        }
        if !seen.insert(item.as_str()) {
            return Err(MatchError::InvalidInput(format!(
                "profile {id} lists '{item}' twice in {field}"
            )));
        }
    }
    Ok(())
}
