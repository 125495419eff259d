use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student as the matcher sees it.
///
/// `courses`, `study_spots` and `study_times` behave as sets: entries are
/// unique and compared by exact, case-sensitive string equality. They are
/// kept as vectors so that intersections come out in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub college: String,
    pub department: String,
    pub courses: Vec<String>,
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One ranked partner suggestion. Built fresh per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: Uuid,
    pub name: String,
    pub department: String,
    pub shared_courses: Vec<String>,
    pub shared_spots: Vec<String>,
    pub shared_times: Vec<String>,
    /// Integer percentage in `0..=100`.
    pub similarity: u8,
}

/// The flow an OTP is scoped to. A code issued for one purpose never
/// satisfies the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    #[default]
    Registration,
    Login,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::Login => "login",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&OtpPurpose::Registration).unwrap();
        assert_eq!(json, "\"registration\"");

        let parsed: OtpPurpose = serde_json::from_str("\"login\"").unwrap();
        assert_eq!(parsed, OtpPurpose::Login);

        assert!(serde_json::from_str::<OtpPurpose>("\"Login\"").is_err());
    }
}
