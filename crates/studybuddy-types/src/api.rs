use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{MatchResult, OtpPurpose, StudentProfile};
use crate::vocabulary::College;

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

// -- OTP --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendOtpRequest {
    pub email: String,
    #[serde(default)]
    pub purpose: OtpPurpose,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(default)]
    pub purpose: OtpPurpose,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub college: String,
    pub department: String,
    pub courses: Vec<String>,
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub student_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub student_id: Uuid,
    pub name: String,
    pub token: String,
}

// -- Profiles --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub courses: Vec<String>,
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    pub students: Vec<StudentProfile>,
    pub count: usize,
}

// -- Matches --

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub target_student: String,
    pub matches: Vec<MatchResult>,
    pub total_checked: usize,
}

// -- Options --

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub colleges: Vec<College>,
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentsResponse {
    pub departments: Vec<String>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
