//! Relations between tasks.
//!
//! - [`TaskPair`]: two sequential tasks between which one worker may split a
//!   100-point occupation budget.
//! - [`Coupling`]: two tasks that at least one worker must perform together,
//!   e.g. keeping a machine operator at the upstream quality gate.

use serde::{Deserialize, Serialize};

/// An unordered occupation-sharing pair of sequential tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPair {
    pub task_a: String,
    pub task_b: String,
}

impl TaskPair {
    /// Creates a sharing pair.
    pub fn new(task_a: impl Into<String>, task_b: impl Into<String>) -> Self {
        Self {
            task_a: task_a.into(),
            task_b: task_b.into(),
        }
    }

    /// Whether the pair contains the named task.
    pub fn involves(&self, task: &str) -> bool {
        self.task_a == task || self.task_b == task
    }

    /// Whether this pair relates the same two tasks as `other`, in either order.
    pub fn same_tasks(&self, other: &TaskPair) -> bool {
        (self.task_a == other.task_a && self.task_b == other.task_b)
            || (self.task_a == other.task_b && self.task_b == other.task_a)
    }
}

/// A hard co-assignment requirement between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupling {
    pub task_a: String,
    pub task_b: String,
}

impl Coupling {
    /// Creates a coupling.
    pub fn new(task_a: impl Into<String>, task_b: impl Into<String>) -> Self {
        Self {
            task_a: task_a.into(),
            task_b: task_b.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let p = TaskPair::new("Wash Glass", "Lay EVA");
        let q = TaskPair::new("Lay EVA", "Wash Glass");
        assert!(p.same_tasks(&q));
        assert!(p.involves("Lay EVA"));
        assert!(!p.involves("Closing"));
    }
}
