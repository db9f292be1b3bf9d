// src/catalog.rs

use crate::models::Topic;
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

/// Fatal configuration problems detected while loading the topic catalog.
/// Any of these must abort startup; they are never surfaced at request time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog seed is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate topic '{0}'")]
    DuplicateTopic(String),
    #[error("topic '{topic}' requires unknown topic '{prereq}'")]
    UnknownPrereq { topic: String, prereq: String },
    #[error("topic '{topic}' has required score {value} outside [0,1]")]
    InvalidThreshold { topic: String, value: f64 },
    #[error("prerequisite cycle involving topic '{0}'")]
    Cycle(String),
}

/// Immutable topic catalog. Built once at startup, validated, then shared
/// read-only across all request handlers.
#[derive(Debug)]
pub struct Catalog {
    topics: Vec<Topic>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Loads the embedded topic seed and validates it.
    pub fn load_embedded() -> Result<Catalog, CatalogError> {
        let data = include_str!("data/topics.json");
        let topics: Vec<Topic> = serde_json::from_str(data)?;
        Catalog::from_topics(topics)
    }

    /// Builds a catalog from a topic list, rejecting duplicates, dangling
    /// prerequisite references, out-of-range thresholds, and cycles.
    /// Topics are stored sorted by (difficulty, name); that ordering fixes
    /// recommendation output deterministically.
    pub fn from_topics(mut topics: Vec<Topic>) -> Result<Catalog, CatalogError> {
        topics.sort_by(|a, b| {
            a.difficulty
                .cmp(&b.difficulty)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut index = HashMap::new();
        for (i, t) in topics.iter().enumerate() {
            if index.insert(t.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateTopic(t.name.clone()));
            }
        }

        for t in &topics {
            for p in &t.prerequisites {
                if !index.contains_key(&p.topic) {
                    return Err(CatalogError::UnknownPrereq {
                        topic: t.name.clone(),
                        prereq: p.topic.clone(),
                    });
                }
                if !(0.0..=1.0).contains(&p.required_score) {
                    return Err(CatalogError::InvalidThreshold {
                        topic: t.name.clone(),
                        value: p.required_score,
                    });
                }
            }
        }

        let catalog = Catalog { topics, index };
        catalog.check_acyclic()?;
        debug!("Catalog validated: {} topics", catalog.topics.len());
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.index.get(name).map(|&i| &self.topics[i])
    }

    /// All topics, ascending by (difficulty, name).
    pub fn all(&self) -> &[Topic] {
        &self.topics
    }

    /// Catalog-wide chapter count, the fixed dashboard denominator.
    pub fn total_chapters(&self) -> i64 {
        self.topics.iter().map(|t| t.chapters.len() as i64).sum()
    }

    // Depth-first traversal over prerequisite edges. A node revisited while
    // still on the current path is a back edge, i.e. a cycle.
    fn check_acyclic(&self) -> Result<(), CatalogError> {
        const UNSEEN: u8 = 0;
        const ON_PATH: u8 = 1;
        const DONE: u8 = 2;

        let mut state = vec![UNSEEN; self.topics.len()];

        for start in 0..self.topics.len() {
            if state[start] != UNSEEN {
                continue;
            }
            // Stack of (topic index, next prerequisite position).
            let mut stack = vec![(start, 0usize)];
            state[start] = ON_PATH;

            while let Some(top) = stack.last_mut() {
                let (i, next) = *top;
                if next >= self.topics[i].prerequisites.len() {
                    state[i] = DONE;
                    stack.pop();
                    continue;
                }
                top.1 += 1;
                let target = self.index[&self.topics[i].prerequisites[next].topic];
                match state[target] {
                    ON_PATH => {
                        return Err(CatalogError::Cycle(self.topics[target].name.clone()))
                    }
                    UNSEEN => {
                        state[target] = ON_PATH;
                        stack.push((target, 0));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prerequisite;

    fn topic(name: &str, difficulty: i64, prereqs: &[(&str, f64)]) -> Topic {
        Topic {
            name: name.to_string(),
            description: String::new(),
            difficulty,
            chapters: vec!["Intro".to_string()],
            prerequisites: prereqs
                .iter()
                .map(|(t, s)| Prerequisite {
                    topic: t.to_string(),
                    required_score: *s,
                })
                .collect(),
        }
    }

    #[test]
    fn embedded_seed_is_valid() {
        let catalog = Catalog::load_embedded().expect("seed must validate");
        assert!(catalog.get("Walkers").is_some());
        assert!(catalog.total_chapters() > 0);
    }

    #[test]
    fn topics_sorted_by_difficulty_then_name() {
        let catalog = Catalog::from_topics(vec![
            topic("Zeta", 1, &[]),
            topic("Alpha", 2, &[]),
            topic("Beta", 1, &[]),
        ])
        .unwrap();
        let names: Vec<&str> = catalog.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Zeta", "Alpha"]);
    }

    #[test]
    fn rejects_direct_cycle() {
        let err = Catalog::from_topics(vec![
            topic("A", 1, &[("B", 0.5)]),
            topic("B", 1, &[("A", 0.5)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::Cycle(_)));
    }

    #[test]
    fn rejects_transitive_cycle() {
        let err = Catalog::from_topics(vec![
            topic("A", 1, &[("C", 0.5)]),
            topic("B", 1, &[("A", 0.5)]),
            topic("C", 1, &[("B", 0.5)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::Cycle(_)));
    }

    #[test]
    fn rejects_dangling_prereq() {
        let err = Catalog::from_topics(vec![topic("A", 1, &[("Ghost", 0.5)])]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPrereq { .. }));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Catalog::from_topics(vec![
            topic("A", 1, &[]),
            topic("B", 1, &[("A", 1.5)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidThreshold { .. }));
    }

    #[test]
    fn rejects_duplicate_topic() {
        let err =
            Catalog::from_topics(vec![topic("A", 1, &[]), topic("A", 2, &[])]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTopic(_)));
    }

    #[test]
    fn diamond_dependency_is_fine() {
        let catalog = Catalog::from_topics(vec![
            topic("Base", 1, &[]),
            topic("Left", 2, &[("Base", 0.5)]),
            topic("Right", 2, &[("Base", 0.5)]),
            topic("Top", 3, &[("Left", 0.5), ("Right", 0.5)]),
        ]);
        assert!(catalog.is_ok());
    }
}
