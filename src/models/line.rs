//! Production line catalog.
//!
//! Collects everything one allocation run needs: the three task groups,
//! the worker roster, sharing pairs, couplings, and the sharing threshold.
//! Manual tasks are indexed densely with sequential tasks first, followed by
//! non-sequential tasks; that ordering is the column order of every
//! worker × task variable grid.

use serde::{Deserialize, Serialize};

use super::{AutomatedTask, Coupling, FixedTask, SequentialTask, TaskKind, TaskPair, Worker};
use crate::time::Minutes;

/// Default occupation threshold for workers splitting a task pair (points).
pub const DEFAULT_OCCUPATION_THRESHOLD: i32 = 50;

/// A production line to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionLine {
    /// Rate-dependent manual tasks.
    pub sequential: Vec<SequentialTask>,
    /// Fixed-staffing manual tasks.
    pub non_sequential: Vec<FixedTask>,
    /// Automated stations defining the bottleneck.
    pub automated: Vec<AutomatedTask>,
    /// Available workers.
    pub workers: Vec<Worker>,
    /// Occupation-sharing pairs.
    pub pairs: Vec<TaskPair>,
    /// Hard co-assignment requirements.
    pub couplings: Vec<Coupling>,
    /// Maximum occupation (0..=100) a worker may hold on each task of a pair
    /// they split.
    pub occupation_threshold: i32,
}

impl Default for ProductionLine {
    fn default() -> Self {
        Self {
            sequential: Vec::new(),
            non_sequential: Vec::new(),
            automated: Vec::new(),
            workers: Vec::new(),
            pairs: Vec::new(),
            couplings: Vec::new(),
            occupation_threshold: DEFAULT_OCCUPATION_THRESHOLD,
        }
    }
}

impl ProductionLine {
    /// Creates an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sequential task.
    pub fn with_sequential(mut self, task: SequentialTask) -> Self {
        self.sequential.push(task);
        self
    }

    /// Adds a non-sequential task.
    pub fn with_fixed(mut self, task: FixedTask) -> Self {
        self.non_sequential.push(task);
        self
    }

    /// Adds an automated station.
    pub fn with_automated(mut self, task: AutomatedTask) -> Self {
        self.automated.push(task);
        self
    }

    /// Adds a worker.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    /// Declares an occupation-sharing pair.
    pub fn with_pair(mut self, pair: TaskPair) -> Self {
        self.pairs.push(pair);
        self
    }

    /// Declares a coupling.
    pub fn with_coupling(mut self, coupling: Coupling) -> Self {
        self.couplings.push(coupling);
        self
    }

    /// Sets the occupation threshold.
    pub fn with_occupation_threshold(mut self, threshold: i32) -> Self {
        self.occupation_threshold = threshold;
        self
    }

    /// Bottleneck cycle time: the slowest automated station.
    ///
    /// Returns `None` if the line has no automated stations.
    pub fn bottleneck(&self) -> Option<Minutes> {
        self.automated.iter().map(|a| a.cycle_time).max()
    }

    /// Number of manual tasks (sequential + non-sequential).
    pub fn task_count(&self) -> usize {
        self.sequential.len() + self.non_sequential.len()
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Name of the manual task at a dense index.
    pub fn task_name(&self, index: usize) -> Option<&str> {
        if index < self.sequential.len() {
            Some(&self.sequential[index].name)
        } else {
            self.non_sequential
                .get(index - self.sequential.len())
                .map(|t| t.name.as_str())
        }
    }

    /// Dense index of a manual task.
    pub fn task_index(&self, name: &str) -> Option<usize> {
        self.sequential
            .iter()
            .position(|t| t.name == name)
            .or_else(|| {
                self.non_sequential
                    .iter()
                    .position(|t| t.name == name)
                    .map(|i| i + self.sequential.len())
            })
    }

    /// Kind of the manual task at a dense index.
    pub fn task_kind(&self, index: usize) -> Option<TaskKind> {
        if index < self.sequential.len() {
            Some(TaskKind::Sequential)
        } else if index < self.task_count() {
            Some(TaskKind::NonSequential)
        } else {
            None
        }
    }

    /// Manual task names in dense index order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.sequential
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.non_sequential.iter().map(|t| t.name.as_str()))
    }

    /// Whether a sequential task belongs to any sharing pair.
    pub fn is_paired(&self, task: &str) -> bool {
        self.pairs.iter().any(|p| p.involves(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> ProductionLine {
        ProductionLine::new()
            .with_automated(AutomatedTask::new("Lay-up machine", Minutes::new(16, 5)))
            .with_automated(AutomatedTask::new("Laminator", Minutes::from_integer(18)))
            .with_sequential(SequentialTask::new("Wash Glass", Minutes::new(1, 2)))
            .with_sequential(SequentialTask::new("Lay EVA", Minutes::from_integer(6)))
            .with_fixed(FixedTask::new("Stringing"))
            .with_pair(TaskPair::new("Wash Glass", "Lay EVA"))
    }

    #[test]
    fn test_bottleneck_is_slowest() {
        let line = sample_line();
        assert_eq!(line.bottleneck(), Some(Minutes::from_integer(18)));
        assert_eq!(ProductionLine::new().bottleneck(), None);
    }

    #[test]
    fn test_dense_task_indexing() {
        let line = sample_line();
        assert_eq!(line.task_count(), 3);
        assert_eq!(line.task_index("Wash Glass"), Some(0));
        assert_eq!(line.task_index("Stringing"), Some(2));
        assert_eq!(line.task_index("Flashen"), None);
        assert_eq!(line.task_name(2), Some("Stringing"));
        assert_eq!(line.task_name(3), None);
        assert_eq!(line.task_kind(1), Some(TaskKind::Sequential));
        assert_eq!(line.task_kind(2), Some(TaskKind::NonSequential));
        assert_eq!(
            line.task_names().collect::<Vec<_>>(),
            vec!["Wash Glass", "Lay EVA", "Stringing"]
        );
    }

    #[test]
    fn test_default_threshold() {
        let line = sample_line();
        assert_eq!(line.occupation_threshold, DEFAULT_OCCUPATION_THRESHOLD);
        assert!(line.is_paired("Lay EVA"));
        assert!(!line.is_paired("Stringing"));
    }
}
