use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS students (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            college     TEXT NOT NULL,
            department  TEXT NOT NULL,
            courses     TEXT NOT NULL DEFAULT '[]',
            study_spots TEXT NOT NULL DEFAULT '[]',
            study_times TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_students_created
            ON students(created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
