//! Worker model.
//!
//! A worker is a human resource with a set of skills (the tasks they are
//! trained for) and a preference flag. Preferred workers are favored when
//! several allocations use the same headcount, so consecutive runs on the
//! same day keep the same crew.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A worker available for allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker name.
    pub name: String,
    /// Names of the tasks this worker may perform.
    pub skills: BTreeSet<String>,
    /// Whether this worker should be favored.
    pub preferred: bool,
}

impl Worker {
    /// Creates an unskilled, non-preferred worker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: BTreeSet::new(),
            preferred: false,
        }
    }

    /// Adds a skill.
    pub fn with_skill(mut self, task: impl Into<String>) -> Self {
        self.skills.insert(task.into());
        self
    }

    /// Adds several skills.
    pub fn with_skills<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills.extend(tasks.into_iter().map(Into::into));
        self
    }

    /// Marks the worker as preferred.
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    /// Whether this worker may perform the named task.
    pub fn has_skill(&self, task: &str) -> bool {
        self.skills.contains(task)
    }
}
