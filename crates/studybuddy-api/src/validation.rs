//! Intake checks applied before anything reaches the matcher or the store.

use std::collections::HashSet;

use studybuddy_types::vocabulary::Vocabulary;

use crate::error::ApiError;

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `email` must already be normalized.
pub fn check_email_domain(email: &str, domain: &str) -> Result<(), ApiError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && !host.contains('@') && email.ends_with(domain));
    if !valid {
        return Err(ApiError::InvalidInput(format!(
            "please use a valid email address ending with {}",
            domain
        )));
    }
    Ok(())
}

pub fn check_code_format(code: &str) -> Result<(), ApiError> {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidInput(
            "verification code must be 6 digits".into(),
        ));
    }
    Ok(())
}

/// Trim entries, drop duplicates (first occurrence wins) and require at
/// least one entry.
pub fn clean_list(field: &str, items: &[String]) -> Result<Vec<String>, ApiError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            return Err(ApiError::InvalidInput(format!("{} contains an empty entry", field)));
        }
        if seen.insert(item) {
            out.push(item.to_string());
        }
    }
    if out.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must be a non-empty list", field)));
    }
    Ok(out)
}

pub struct Preferences {
    pub courses: Vec<String>,
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
}

pub fn check_preferences(
    vocab: &Vocabulary,
    courses: &[String],
    study_spots: &[String],
    study_times: &[String],
) -> Result<Preferences, ApiError> {
    let courses = clean_list("courses", courses)?;
    let study_spots = clean_list("study_spots", study_spots)?;
    let study_times = clean_list("study_times", study_times)?;

    if let Some(spot) = study_spots.iter().find(|s| !vocab.has_spot(s)) {
        return Err(ApiError::InvalidInput(format!("unknown study spot '{}'", spot)));
    }
    if let Some(time) = study_times.iter().find(|t| !vocab.has_time(t)) {
        return Err(ApiError::InvalidInput(format!("unknown study time '{}'", time)));
    }

    Ok(Preferences {
        courses,
        study_spots,
        study_times,
    })
}

pub fn check_department(vocab: &Vocabulary, college: &str, department: &str) -> Result<(), ApiError> {
    if vocab.departments_of(college).is_none() {
        return Err(ApiError::InvalidInput("invalid college selected".into()));
    }
    if !vocab.has_department(college, department) {
        return Err(ApiError::InvalidInput(
            "invalid department for selected college".into(),
        ));
    }
    Ok(())
}
