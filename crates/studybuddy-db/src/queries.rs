use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use studybuddy_matcher::ProfileStore;
use studybuddy_types::models::StudentProfile;
use uuid::Uuid;

use crate::Database;
use crate::models::StudentRow;

const STUDENT_COLUMNS: &str =
    "id, name, email, college, department, courses, study_spots, study_times, created_at";

impl Database {
    // -- Students --

    /// Insert a new student. Returns `false` if the email is already taken.
    pub fn create_student(&self, student: &StudentProfile) -> Result<bool> {
        let courses = serde_json::to_string(&student.courses)?;
        let spots = serde_json::to_string(&student.study_spots)?;
        let times = serde_json::to_string(&student.study_times)?;

        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO students
                    (id, name, email, college, department, courses, study_spots, study_times, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![
                    student.id.to_string(),
                    student.name,
                    student.email,
                    student.college,
                    student.department,
                    courses,
                    spots,
                    times,
                    student.created_at.to_rfc3339(),
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_student(&self, id: Uuid) -> Result<Option<StudentProfile>> {
        let row = self.with_conn(|conn| query_student(conn, "id", &id.to_string()))?;
        row.map(into_profile).transpose()
    }

    pub fn get_student_by_email(&self, email: &str) -> Result<Option<StudentProfile>> {
        let row = self.with_conn(|conn| query_student(conn, "email", email))?;
        row.map(into_profile).transpose()
    }

    pub fn list_students(&self) -> Result<Vec<StudentProfile>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at, id"
            ))?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.into_iter().map(into_profile).collect()
    }

    /// Replace the three preference lists. Returns `false` if no such student.
    pub fn update_preferences(
        &self,
        id: Uuid,
        courses: &[String],
        study_spots: &[String],
        study_times: &[String],
    ) -> Result<bool> {
        let courses = serde_json::to_string(courses)?;
        let spots = serde_json::to_string(study_spots)?;
        let times = serde_json::to_string(study_times)?;

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE students SET courses = ?2, study_spots = ?3, study_times = ?4 WHERE id = ?1",
                rusqlite::params![id.to_string(), courses, spots, times],
            )?;
            Ok(updated == 1)
        })
    }
}

impl ProfileStore for Database {
    fn get_profile(&self, id: Uuid) -> Result<Option<StudentProfile>> {
        self.get_student(id)
    }

    fn list_candidates(&self, exclude_id: Uuid) -> Result<Vec<StudentProfile>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STUDENT_COLUMNS} FROM students WHERE id != ?1"
            ))?;
            let rows = stmt
                .query_map([exclude_id.to_string()], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.into_iter().map(into_profile).collect()
    }
}

fn query_student(conn: &Connection, column: &str, value: &str) -> Result<Option<StudentRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE {column} = ?1"
    ))?;
    let row = stmt.query_row([value], map_row).optional()?;
    Ok(row)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StudentRow> {
    Ok(StudentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        college: row.get(3)?,
        department: row.get(4)?,
        courses: row.get(5)?,
        study_spots: row.get(6)?,
        study_times: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn into_profile(row: StudentRow) -> Result<StudentProfile> {
    let id: Uuid = row
        .id
        .parse()
        .with_context(|| format!("corrupt student id '{}'", row.id))?;
    let list = |field: &str, json: &str| -> Result<Vec<String>> {
        serde_json::from_str(json).with_context(|| format!("corrupt {} on student {}", field, id))
    };

    Ok(StudentProfile {
        id,
        courses: list("courses", &row.courses)?,
        study_spots: list("study_spots", &row.study_spots)?,
        study_times: list("study_times", &row.study_times)?,
        created_at: parse_timestamp(&row.created_at)
            .with_context(|| format!("corrupt created_at '{}' on student {}", row.created_at, id))?,
        name: row.name,
        email: row.email,
        college: row.college,
        department: row.department,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Ok(ts);
    }
    // SQLite's datetime('now') has no timezone; it is UTC.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")?;
    Ok(naive.and_utc())
}
