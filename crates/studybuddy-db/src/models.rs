/// Database row types. These map directly to SQLite rows.
/// The three preference lists are stored as JSON arrays.

pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub college: String,
    pub department: String,
    pub courses: String,
    pub study_spots: String,
    pub study_times: String,
    pub created_at: String,
}
