// src/engine.rs

use crate::catalog::Catalog;
use crate::models::{LockedTopic, MissingPrereq, RecommendationResult, UnlockedTopic};
use crate::repository;
use log::{debug, info};
use rusqlite::Connection;
use std::collections::HashMap;

// --- Public Interface ---

/// Computes recommendations for a learner from their stored scores.
pub fn recommend_for(
    conn: &Connection,
    catalog: &Catalog,
    username: &str,
    mastery_threshold: f64,
) -> rusqlite::Result<RecommendationResult> {
    let scores = repository::get_scores(conn, username)?;
    debug!("Scores for {}: {:?}", username, scores);

    let result = recommend(catalog, &scores, mastery_threshold);
    info!(
        "Recommendations for {}: {} unlocked, {} locked",
        username,
        result.unlocked.len(),
        result.locked.len()
    );
    Ok(result)
}

/// Pure recommendation computation. Walks the catalog in its fixed
/// (difficulty, name) order, so identical inputs always produce identical
/// output.
pub fn recommend(
    catalog: &Catalog,
    scores: &HashMap<String, f64>,
    mastery_threshold: f64,
) -> RecommendationResult {
    let mut unlocked = Vec::new();
    let mut locked = Vec::new();

    for topic in catalog.all() {
        let score = scores.get(&topic.name).copied().unwrap_or(0.0);

        // Mastered topics are no longer worth recommending; they stay
        // visible in raw progress only.
        if score >= mastery_threshold {
            continue;
        }

        let missing: Vec<MissingPrereq> = topic
            .prerequisites
            .iter()
            .filter(|p| scores.get(&p.topic).copied().unwrap_or(0.0) < p.required_score)
            .map(|p| MissingPrereq {
                topic: p.topic.clone(),
                required: p.required_score,
            })
            .collect();

        if missing.is_empty() {
            unlocked.push(UnlockedTopic {
                topic: topic.name.clone(),
                difficulty: topic.difficulty,
                current_score: score,
            });
        } else {
            locked.push(LockedTopic {
                topic: topic.name.clone(),
                missing_prereqs: missing,
            });
        }
    }

    RecommendationResult { unlocked, locked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Prerequisite, Topic};

    fn topic(name: &str, difficulty: i64, prereqs: &[(&str, f64)]) -> Topic {
        Topic {
            name: name.to_string(),
            description: String::new(),
            difficulty,
            chapters: Vec::new(),
            prerequisites: prereqs
                .iter()
                .map(|(t, s)| Prerequisite {
                    topic: t.to_string(),
                    required_score: *s,
                })
                .collect(),
        }
    }

    fn course_catalog() -> Catalog {
        Catalog::from_topics(vec![
            topic("Basics", 1, &[]),
            topic("Walkers", 2, &[("Basics", 0.6)]),
            topic("Graphs", 3, &[("Walkers", 0.7)]),
        ])
        .unwrap()
    }

    fn scores(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn concrete_scenario() {
        let catalog = course_catalog();
        let scores = scores(&[("Basics", 0.8), ("Walkers", 0.5)]);
        let result = recommend(&catalog, &scores, 1.0);

        let unlocked: Vec<&str> = result.unlocked.iter().map(|u| u.topic.as_str()).collect();
        assert_eq!(unlocked, vec!["Basics", "Walkers"]);

        assert_eq!(result.locked.len(), 1);
        assert_eq!(result.locked[0].topic, "Graphs");
        assert_eq!(result.locked[0].missing_prereqs.len(), 1);
        assert_eq!(result.locked[0].missing_prereqs[0].topic, "Walkers");
        assert!((result.locked[0].missing_prereqs[0].required - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn idempotent_for_unchanged_inputs() {
        let catalog = course_catalog();
        let scores = scores(&[("Basics", 0.8), ("Walkers", 0.5)]);
        let first = recommend(&catalog, &scores, 1.0);
        let second = recommend(&catalog, &scores, 1.0);
        assert_eq!(first, second);
    }

    #[test]
    fn no_prereq_topic_unlocked_until_mastered() {
        let catalog = course_catalog();
        let result = recommend(&catalog, &scores(&[]), 1.0);
        assert!(result.unlocked.iter().any(|u| u.topic == "Basics"));

        let result = recommend(&catalog, &scores(&[("Basics", 1.0)]), 1.0);
        assert!(!result.unlocked.iter().any(|u| u.topic == "Basics"));
        assert!(!result.locked.iter().any(|l| l.topic == "Basics"));
    }

    #[test]
    fn raising_prereq_score_only_unlocks() {
        let catalog = course_catalog();
        let before = recommend(&catalog, &scores(&[("Basics", 0.8), ("Walkers", 0.5)]), 1.0);
        assert!(before.locked.iter().any(|l| l.topic == "Graphs"));

        let after = recommend(&catalog, &scores(&[("Basics", 0.8), ("Walkers", 0.7)]), 1.0);
        assert!(after.unlocked.iter().any(|u| u.topic == "Graphs"));
        // Nothing unlocked before may be locked now.
        for u in &before.unlocked {
            assert!(!after.locked.iter().any(|l| l.topic == u.topic));
        }
    }

    #[test]
    fn missing_prereqs_are_all_genuinely_unmet() {
        let catalog = Catalog::from_topics(vec![
            topic("A", 1, &[]),
            topic("B", 1, &[]),
            topic("C", 2, &[("A", 0.5), ("B", 0.9)]),
        ])
        .unwrap();
        let scores = scores(&[("A", 0.6), ("B", 0.2)]);
        let result = recommend(&catalog, &scores, 1.0);

        let locked = result.locked.iter().find(|l| l.topic == "C").unwrap();
        for missing in &locked.missing_prereqs {
            let have = scores.get(&missing.topic).copied().unwrap_or(0.0);
            assert!(have < missing.required);
        }
        // The satisfied prerequisite must not be listed.
        assert!(!locked.missing_prereqs.iter().any(|m| m.topic == "A"));
    }

    #[test]
    fn missing_prereqs_keep_declared_order() {
        let catalog = Catalog::from_topics(vec![
            topic("A", 1, &[]),
            topic("B", 1, &[]),
            topic("C", 2, &[("B", 0.9), ("A", 0.5)]),
        ])
        .unwrap();
        let result = recommend(&catalog, &scores(&[]), 1.0);
        let locked = result.locked.iter().find(|l| l.topic == "C").unwrap();
        let order: Vec<&str> = locked.missing_prereqs.iter().map(|m| m.topic.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn lower_mastery_threshold_hides_learned_topics() {
        let catalog = course_catalog();
        let result = recommend(&catalog, &scores(&[("Basics", 0.85)]), 0.8);
        assert!(!result.unlocked.iter().any(|u| u.topic == "Basics"));
        // Basics still counts toward the Walkers prerequisite.
        assert!(result.unlocked.iter().any(|u| u.topic == "Walkers"));
    }
}
