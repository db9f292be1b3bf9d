// src/repository.rs

use crate::models::{ActivityRecord, Classroom, ScheduleEvent};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::collections::HashMap;

// --- Scores ---

/// Fetches every recorded score for a learner. Unknown learners simply
/// produce an empty map; absence of progress is a valid state.
pub fn get_scores(conn: &Connection, username: &str) -> Result<HashMap<String, f64>> {
    let mut stmt = conn.prepare("SELECT topic, score FROM scores WHERE username = ?")?;
    let rows = stmt.query_map([username], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn upsert_score(conn: &Connection, username: &str, topic: &str, score: f64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO scores (username, topic, score) VALUES (?, ?, ?)",
        params![username, topic, score],
    )?;
    Ok(())
}

// --- Activity Log ---

/// Appends one activity record. The log is append-only; nothing ever
/// updates or deletes rows.
pub fn append_activity(
    conn: &Connection,
    username: &str,
    kind: &str,
    minutes: i64,
    timestamp: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity_log (username, kind, minutes, timestamp) VALUES (?, ?, ?, ?)",
        params![username, kind, minutes, timestamp],
    )?;
    Ok(())
}

pub fn get_activity(conn: &Connection, username: &str) -> Result<Vec<ActivityRecord>> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, kind, minutes FROM activity_log WHERE username = ? ORDER BY timestamp",
    )?;
    let rows = stmt.query_map([username], |row| {
        Ok(ActivityRecord {
            timestamp: row.get(0)?,
            kind: row.get(1)?,
            minutes: row.get(2)?,
        })
    })?;
    rows.collect()
}

pub fn activity_timestamps(conn: &Connection, username: &str) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT timestamp FROM activity_log WHERE username = ?")?;
    let rows = stmt.query_map([username], |row| row.get(0))?;
    rows.collect()
}

pub fn total_minutes(conn: &Connection, username: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(minutes), 0) FROM activity_log WHERE username = ?",
        [username],
        |row| row.get(0),
    )
}

// --- Chapter Progress ---

pub fn completed_chapter_counts(conn: &Connection, username: &str) -> Result<HashMap<String, i64>> {
    let mut stmt =
        conn.prepare("SELECT topic, completed FROM chapter_progress WHERE username = ?")?;
    let rows = stmt.query_map([username], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn get_chapter_completed(conn: &Connection, username: &str, topic: &str) -> Result<i64> {
    conn.query_row(
        "SELECT completed FROM chapter_progress WHERE username = ? AND topic = ?",
        params![username, topic],
        |row| row.get(0),
    )
    .optional()
    .map(|v| v.unwrap_or(0))
}

/// Marks one more chapter of `topic` complete, clamped to the catalog's
/// chapter count for that topic.
pub fn increment_chapter(conn: &Connection, username: &str, topic: &str, total: i64) -> Result<i64> {
    let completed = get_chapter_completed(conn, username, topic)?;
    let next = (completed + 1).min(total);
    conn.execute(
        "INSERT OR REPLACE INTO chapter_progress (username, topic, completed) VALUES (?, ?, ?)",
        params![username, topic, next],
    )?;
    Ok(next)
}

// --- Enrollment / Schedule Registry ---

/// Lists all classrooms. `active_students` counts enrollment rows and
/// `available_spots` is computed here at read time, never stored.
pub fn list_classrooms(conn: &Connection) -> Result<Vec<Classroom>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, c.instructor, c.capacity, count(e.username)
         FROM classrooms c
         LEFT JOIN enrollments e ON e.classroom_id = c.id
         GROUP BY c.id
         ORDER BY c.name",
    )?;
    let rows = stmt.query_map([], |row| {
        let capacity: i64 = row.get(2)?;
        let active_students: i64 = row.get(3)?;
        Ok(Classroom {
            name: row.get(0)?,
            instructor: row.get(1)?,
            capacity,
            active_students,
            available_spots: capacity - active_students,
        })
    })?;
    rows.collect()
}

pub fn enrolled_classrooms(conn: &Connection, username: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.name FROM classrooms c
         JOIN enrollments e ON e.classroom_id = c.id
         WHERE e.username = ?
         ORDER BY c.name",
    )?;
    let rows = stmt.query_map([username], |row| row.get(0))?;
    rows.collect()
}

pub fn list_schedule(conn: &Connection) -> Result<Vec<ScheduleEvent>> {
    let mut stmt = conn.prepare(
        "SELECT title, date, time, kind FROM schedule_events ORDER BY date, time",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ScheduleEvent {
            title: row.get(0)?,
            date: row.get(1)?,
            time: row.get(2)?,
            kind: row.get(3)?,
        })
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        database::init_db(&conn).unwrap();
        conn
    }

    #[test]
    fn scores_roundtrip_and_default_empty() {
        let conn = test_conn();
        assert!(get_scores(&conn, "nobody").unwrap().is_empty());

        upsert_score(&conn, "dana", "Walkers", 0.4).unwrap();
        upsert_score(&conn, "dana", "Walkers", 0.7).unwrap();
        let scores = get_scores(&conn, "dana").unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores["Walkers"] - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn activity_appends_and_sums() {
        let conn = test_conn();
        append_activity(&conn, "dana", "chapter", 30, 1_700_000_000).unwrap();
        append_activity(&conn, "dana", "quiz", 15, 1_700_000_100).unwrap();
        assert_eq!(total_minutes(&conn, "dana").unwrap(), 45);
        assert_eq!(get_activity(&conn, "dana").unwrap().len(), 2);
        assert_eq!(total_minutes(&conn, "nobody").unwrap(), 0);
    }

    #[test]
    fn chapter_completion_clamps_at_total() {
        let conn = test_conn();
        for _ in 0..5 {
            increment_chapter(&conn, "dana", "Walkers", 3).unwrap();
        }
        assert_eq!(get_chapter_completed(&conn, "dana", "Walkers").unwrap(), 3);
    }

    #[test]
    fn classroom_spots_reflect_enrollments() {
        let conn = test_conn();
        let rooms = list_classrooms(&conn).unwrap();
        let lab = rooms.iter().find(|c| c.name == "Graph Programming Lab").unwrap();
        assert_eq!(lab.capacity, 20);
        assert_eq!(lab.active_students, 1);
        assert_eq!(lab.available_spots, 19);
    }

    #[test]
    fn enrollment_readthrough() {
        let conn = test_conn();
        let rooms = enrolled_classrooms(&conn, "Alice").unwrap();
        assert_eq!(rooms, vec!["Graph Programming Lab", "Jac Fundamentals"]);
        assert!(enrolled_classrooms(&conn, "nobody").unwrap().is_empty());
    }
}
