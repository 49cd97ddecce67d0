//! Task models.
//!
//! A production line has three kinds of work:
//! - **Sequential** manual tasks sit in the flow of units. Their throughput
//!   scales with headcount: effective time = (multiplier × base time) / workers.
//! - **Non-sequential** manual tasks (stringing, machine operation) need a fixed
//!   number of workers regardless of the line rate.
//! - **Automated** tasks run at a fixed cycle time; the slowest one sets the
//!   pace for the whole line.
//!
//! # Reference
//! Boysen, Fliedner & Scholl (2008), "Assembly line balancing: Which model to
//! use when?", Int. J. Production Economics 111(2)

use serde::{Deserialize, Serialize};

use crate::time::Minutes;

/// A manual task whose staffing level determines its throughput.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialTask {
    /// Unique task name.
    pub name: String,
    /// Minutes of work per produced unit for a single repetition.
    pub base_time: Minutes,
    /// Minimum number of workers (default: 1).
    pub min_workers: i32,
    /// Repetitions per unit, e.g. two glass sheets washed per panel (default: 1).
    pub multiplier: i32,
}

impl SequentialTask {
    /// Creates a sequential task with one required worker and multiplier 1.
    pub fn new(name: impl Into<String>, base_time: Minutes) -> Self {
        Self {
            name: name.into(),
            base_time,
            min_workers: 1,
            multiplier: 1,
        }
    }

    /// Sets the minimum worker count.
    pub fn with_min_workers(mut self, min_workers: i32) -> Self {
        self.min_workers = min_workers;
        self
    }

    /// Sets the repetition multiplier.
    pub fn with_multiplier(mut self, multiplier: i32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Total minutes of work per unit (multiplier × base time).
    pub fn workload(&self) -> Minutes {
        self.base_time * Minutes::from_integer(i64::from(self.multiplier))
    }

    /// Effective time per unit when staffed by `workers` people.
    ///
    /// Returns `None` for zero workers.
    pub fn effective_time(&self, workers: i64) -> Option<Minutes> {
        if workers <= 0 {
            return None;
        }
        Some(self.workload() / Minutes::from_integer(workers))
    }
}

/// A manual task pinned to a fixed number of workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTask {
    /// Unique task name.
    pub name: String,
    /// Exact number of workers (default: 1).
    pub workers: i32,
    /// Whether a worker may hold this task on top of another task
    /// (e.g. one operator running two linked machines).
    pub exempt_from_cap: bool,
}

impl FixedTask {
    /// Creates a fixed task staffed by exactly one worker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: 1,
            exempt_from_cap: false,
        }
    }

    /// Sets the exact worker count.
    pub fn with_workers(mut self, workers: i32) -> Self {
        self.workers = workers;
        self
    }

    /// Exempts this task from the one-task-per-worker cap.
    pub fn exempt_from_cap(mut self) -> Self {
        self.exempt_from_cap = true;
        self
    }
}

/// An automated station running at a fixed cycle time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatedTask {
    /// Unique station name.
    pub name: String,
    /// Minutes per produced unit.
    pub cycle_time: Minutes,
}

impl AutomatedTask {
    /// Creates an automated task.
    pub fn new(name: impl Into<String>, cycle_time: Minutes) -> Self {
        Self {
            name: name.into(),
            cycle_time,
        }
    }
}

/// Manual task classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Rate-dependent staffing.
    Sequential,
    /// Fixed staffing.
    NonSequential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_builder() {
        let task = SequentialTask::new("Wash Glass", Minutes::new(1, 2))
            .with_min_workers(2)
            .with_multiplier(2);

        assert_eq!(task.name, "Wash Glass");
        assert_eq!(task.min_workers, 2);
        assert_eq!(task.multiplier, 2);
        assert_eq!(task.workload(), Minutes::from_integer(1));
    }

    #[test]
    fn test_effective_time() {
        let task = SequentialTask::new("Closing", Minutes::from_integer(9));
        assert_eq!(task.effective_time(2), Some(Minutes::new(9, 2)));
        assert_eq!(task.effective_time(3), Some(Minutes::from_integer(3)));
        assert_eq!(task.effective_time(0), None);
    }

    #[test]
    fn test_fixed_task_defaults() {
        let task = FixedTask::new("Stringing");
        assert_eq!(task.workers, 1);
        assert!(!task.exempt_from_cap);

        let op = FixedTask::new("Operate Laminator").with_workers(2).exempt_from_cap();
        assert_eq!(op.workers, 2);
        assert!(op.exempt_from_cap);
    }
}
