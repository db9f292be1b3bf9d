// src/dashboard.rs

use crate::catalog::Catalog;
use crate::models::DashboardSnapshot;
use crate::repository;
use chrono::{DateTime, NaiveDate};
use log::info;
use rusqlite::Connection;
use std::collections::HashSet;

// --- Public Interface ---

/// Assembles a learner's dashboard snapshot. Unknown learners get a
/// zeroed snapshot; no progress yet is not an error.
pub fn snapshot(
    conn: &Connection,
    catalog: &Catalog,
    username: &str,
    today: NaiveDate,
) -> rusqlite::Result<DashboardSnapshot> {
    let timestamps = repository::activity_timestamps(conn, username)?;
    let total_time = repository::total_minutes(conn, username)?;
    let completed = repository::completed_chapter_counts(conn, username)?;
    let enrolled = repository::enrolled_classrooms(conn, username)?;

    let snapshot = DashboardSnapshot {
        study_streak: study_streak(&timestamps, today),
        total_time,
        completed_chapters: completed.values().sum(),
        total_chapters: catalog.total_chapters(),
        enrolled_classrooms: enrolled,
    };
    info!(
        "Dashboard for {}: streak {}, {} min total",
        username, snapshot.study_streak, snapshot.total_time
    );
    Ok(snapshot)
}

// --- Internal Algorithm Logic ---

/// Consecutive UTC calendar days with at least one activity record,
/// counting back from today. A day without activity ends the run, except
/// that today itself gets a grace period: a streak is not considered
/// broken until a full day passes with no activity.
pub fn study_streak(timestamps: &[i64], today: NaiveDate) -> u32 {
    let active_days: HashSet<NaiveDate> = timestamps
        .iter()
        .filter_map(|ts| DateTime::from_timestamp(*ts, 0))
        .map(|dt| dt.date_naive())
        .collect();

    let start = if active_days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if active_days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut cursor = start;
    while active_days.contains(&cursor) {
        streak += 1;
        cursor = match cursor.pred_opt() {
            Some(prev) => prev,
            None => break,
        };
    }
    streak
}
