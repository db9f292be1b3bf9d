// src/models.rs

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::catalog::Catalog;

// --- App State ---

pub struct AppState {
    pub db: Mutex<Connection>,
    pub catalog: Catalog,
    pub mastery_threshold: f64,
}

impl AppState {
    pub fn new(conn: Connection, catalog: Catalog, mastery_threshold: f64) -> Self {
        AppState {
            db: Mutex::new(conn),
            catalog,
            mastery_threshold,
        }
    }
}

// --- Catalog Models ---

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub name: String,
    pub description: String,
    pub difficulty: i64,
    #[serde(default)]
    pub chapters: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prerequisite {
    pub topic: String,
    pub required_score: f64,
}

// --- Derived Views ---

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub unlocked: Vec<UnlockedTopic>,
    pub locked: Vec<LockedTopic>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UnlockedTopic {
    pub topic: String,
    pub difficulty: i64,
    pub current_score: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LockedTopic {
    pub topic: String,
    pub missing_prereqs: Vec<MissingPrereq>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MissingPrereq {
    pub topic: String,
    pub required: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub study_streak: u32,
    pub total_time: i64,
    pub completed_chapters: i64,
    pub total_chapters: i64,
    pub enrolled_classrooms: Vec<String>,
}

// --- Registry Models ---

#[derive(Serialize, Debug, Clone)]
pub struct Classroom {
    pub name: String,
    pub instructor: String,
    pub capacity: i64,
    pub active_students: i64,
    pub available_spots: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct ScheduleEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// --- Progress Store Models ---

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub timestamp: i64,
    pub kind: String,
    pub minutes: i64,
}
