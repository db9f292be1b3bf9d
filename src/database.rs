// src/database.rs

use chrono::{Duration, Utc};
use log::info;
use rusqlite::{params, Connection, Result};

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scores (
            username TEXT NOT NULL,
            topic TEXT NOT NULL,
            score REAL NOT NULL,
            PRIMARY KEY (username, topic)
        );
        CREATE TABLE IF NOT EXISTS activity_log (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL,
            kind TEXT NOT NULL,
            minutes INTEGER NOT NULL,
            timestamp INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS chapter_progress (
            username TEXT NOT NULL,
            topic TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (username, topic)
        );
        CREATE TABLE IF NOT EXISTS classrooms (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            instructor TEXT NOT NULL,
            capacity INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS enrollments (
            classroom_id INTEGER NOT NULL,
            username TEXT NOT NULL,
            PRIMARY KEY (classroom_id, username)
        );
        CREATE TABLE IF NOT EXISTS schedule_events (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            kind TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_activity_user ON activity_log (username, timestamp);
        ",
    )?;

    let count: i64 = conn.query_row("SELECT count(*) FROM classrooms", [], |row| row.get(0))?;
    if count == 0 {
        info!("Empty registry tables. Seeding demo data...");
        seed_data(conn)?;
    }

    Ok(())
}

fn seed_data(conn: &Connection) -> Result<()> {
    // 1. Classrooms
    let classrooms = vec![
        ("Jac Fundamentals", "Prof. Rivera", 30),
        ("Graph Programming Lab", "Dr. Chen", 20),
        ("Agentic AI Studio", "Prof. Okafor", 25),
    ];
    let mut stmt =
        conn.prepare("INSERT INTO classrooms (name, instructor, capacity) VALUES (?, ?, ?)")?;
    for (name, instructor, capacity) in &classrooms {
        stmt.execute(params![name, instructor, capacity])?;
    }

    // 2. Enrollments
    let enrollments = vec![
        ("Jac Fundamentals", "Alice"),
        ("Graph Programming Lab", "Alice"),
        ("Jac Fundamentals", "Bob"),
    ];
    let mut stmt = conn.prepare(
        "INSERT INTO enrollments (classroom_id, username)
         SELECT id, ? FROM classrooms WHERE name = ?",
    )?;
    for (classroom, username) in &enrollments {
        stmt.execute(params![username, classroom])?;
    }

    // 3. Schedule
    let events = vec![
        ("Walkers Workshop", "2026-08-10", "14:00", "workshop"),
        ("OSP Guest Lecture", "2026-08-12", "10:00", "lecture"),
        ("Quiz: Jac Basics", "2026-08-14", "09:30", "assessment"),
    ];
    let mut stmt = conn
        .prepare("INSERT INTO schedule_events (title, date, time, kind) VALUES (?, ?, ?, ?)")?;
    for (title, date, time, kind) in &events {
        stmt.execute(params![title, date, time, kind])?;
    }

    // 4. Demo learner
    let mut stmt =
        conn.prepare("INSERT INTO scores (username, topic, score) VALUES ('Alice', ?, ?)")?;
    stmt.execute(params!["Jac Basics", 0.95])?;
    stmt.execute(params!["Walkers", 0.60])?;

    let now = Utc::now();
    let yesterday = now - Duration::days(1);
    let mut stmt = conn.prepare(
        "INSERT INTO activity_log (username, kind, minutes, timestamp) VALUES ('Alice', ?, ?, ?)",
    )?;
    stmt.execute(params!["chapter", 40, yesterday.timestamp()])?;
    stmt.execute(params!["quiz", 25, now.timestamp()])?;

    let mut stmt = conn.prepare(
        "INSERT INTO chapter_progress (username, topic, completed) VALUES ('Alice', ?, ?)",
    )?;
    stmt.execute(params!["Jac Basics", 3])?;
    stmt.execute(params!["Walkers", 1])?;

    Ok(())
}
