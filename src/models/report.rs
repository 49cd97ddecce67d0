//! Allocation report (solution) model.
//!
//! An allocation report is the semantic reading of a solved model: who works
//! where, how fast each station runs, and who was used. Reports are plain
//! data; [`audit_report`](crate::allocator::audit_report) re-checks one
//! against its line and records any [`Violation`]s.

use serde::{Deserialize, Serialize};

use super::TaskKind;
use crate::time::{approx, Minutes};

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// An optimal assignment was found.
    Feasible,
    /// No assignment satisfies the hard constraints.
    Infeasible,
}

/// Bottleneck cycle time, exact and approximated for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckTime {
    /// Exact rational value used in every feasibility constraint.
    pub exact: Minutes,
    /// Decimal approximation. Display only.
    pub approx: f64,
}

impl BottleneckTime {
    /// Wraps an exact bottleneck time.
    pub fn new(exact: Minutes) -> Self {
        Self {
            exact,
            approx: approx(&exact),
        }
    }
}

/// One worker's occupation on a sequential task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerShare {
    /// Worker name.
    pub worker: String,
    /// Share of the worker's time on this task (0..=100 points).
    pub occupation: i64,
}

/// Staffing of a single manual task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStaffing {
    /// Task name.
    pub task: String,
    /// Task classification.
    pub kind: TaskKind,
    /// Number of workers assigned.
    pub assigned_workers: i64,
    /// Effective time per unit (sequential tasks only).
    pub effective_time: Option<Minutes>,
    /// Decimal approximation of `effective_time`. Display only.
    pub effective_time_approx: Option<f64>,
    /// Names of the assigned workers.
    pub workers: Vec<String>,
    /// Occupation per assigned worker (sequential tasks only).
    pub occupation: Vec<WorkerShare>,
    /// Uncovered occupation points (paired tasks only, otherwise 0).
    pub shortfall: i64,
}

/// Usage of a single worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerUsage {
    /// Worker name.
    pub worker: String,
    /// Whether the worker is part of the crew.
    pub used: bool,
    /// Whether the worker was marked preferred.
    pub preferred: bool,
    /// Tasks the worker was assigned to.
    pub tasks: Vec<String>,
}

/// A complete allocation (solution to a staffing problem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Whether an allocation exists.
    pub status: SolveStatus,
    /// Bottleneck cycle time the model was built against.
    pub bottleneck: BottleneckTime,
    /// Per-task staffing, in catalog order.
    pub tasks: Vec<TaskStaffing>,
    /// Per-worker usage, in roster order.
    pub workers: Vec<WorkerUsage>,
    /// Number of distinct workers used.
    pub total_workers_used: usize,
}

/// A violated allocation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (task or worker name).
    pub entity: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of allocation rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A worker holds a task outside their skill set.
    SkillMismatch,
    /// A sequential station runs slower than the bottleneck.
    RateExceeded,
    /// A task is staffed below its minimum or off its fixed count.
    StaffingMismatch,
    /// A worker holds more tasks than the cap allows.
    CapExceeded,
    /// No worker performs both tasks of a coupling.
    CouplingUnmet,
    /// A worker's occupation budget is exceeded.
    OccupationExceeded,
    /// A worker is assigned a sequential station but carries none of its work.
    IdleAssignment,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity: entity.into(),
            message: message.into(),
        }
    }
}

impl AllocationReport {
    /// Report for a line without a feasible allocation.
    pub fn infeasible(bottleneck: Minutes) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            bottleneck: BottleneckTime::new(bottleneck),
            tasks: Vec::new(),
            workers: Vec::new(),
            total_workers_used: 0,
        }
    }

    /// Whether an allocation was found.
    pub fn is_feasible(&self) -> bool {
        self.status == SolveStatus::Feasible
    }

    /// Staffing of the named task.
    pub fn task(&self, name: &str) -> Option<&TaskStaffing> {
        self.tasks.iter().find(|t| t.task == name)
    }

    /// Usage of the named worker.
    pub fn worker(&self, name: &str) -> Option<&WorkerUsage> {
        self.workers.iter().find(|w| w.worker == name)
    }

    /// Names of all used workers.
    pub fn used_workers(&self) -> Vec<&str> {
        self.workers
            .iter()
            .filter(|w| w.used)
            .map(|w| w.worker.as_str())
            .collect()
    }

    /// Occupation of a worker on a task (0 if unassigned).
    pub fn occupation(&self, task: &str, worker: &str) -> i64 {
        self.task(task)
            .and_then(|t| t.occupation.iter().find(|s| s.worker == worker))
            .map(|s| s.occupation)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AllocationReport {
        AllocationReport {
            status: SolveStatus::Feasible,
            bottleneck: BottleneckTime::new(Minutes::new(9, 2)),
            tasks: vec![TaskStaffing {
                task: "Wash Glass".into(),
                kind: TaskKind::Sequential,
                assigned_workers: 2,
                effective_time: Some(Minutes::from_integer(4)),
                effective_time_approx: Some(4.0),
                workers: vec!["Arben".into(), "Jamil".into()],
                occupation: vec![
                    WorkerShare { worker: "Arben".into(), occupation: 89 },
                    WorkerShare { worker: "Jamil".into(), occupation: 89 },
                ],
                shortfall: 0,
            }],
            workers: vec![
                WorkerUsage {
                    worker: "Arben".into(),
                    used: true,
                    preferred: true,
                    tasks: vec!["Wash Glass".into()],
                },
                WorkerUsage {
                    worker: "Jamil".into(),
                    used: true,
                    preferred: false,
                    tasks: vec!["Wash Glass".into()],
                },
                WorkerUsage {
                    worker: "Fazli".into(),
                    used: false,
                    preferred: false,
                    tasks: vec![],
                },
            ],
            total_workers_used: 2,
        }
    }

    #[test]
    fn test_bottleneck_approximation() {
        let b = BottleneckTime::new(Minutes::new(9, 2));
        assert!((b.approx - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_report_lookups() {
        let r = sample_report();
        assert!(r.is_feasible());
        assert_eq!(r.task("Wash Glass").unwrap().assigned_workers, 2);
        assert!(r.task("Closing").is_none());
        assert!(r.worker("Arben").unwrap().preferred);
        assert_eq!(r.used_workers(), vec!["Arben", "Jamil"]);
        assert_eq!(r.occupation("Wash Glass", "Jamil"), 89);
        assert_eq!(r.occupation("Wash Glass", "Fazli"), 0);
    }

    #[test]
    fn test_infeasible_report() {
        let r = AllocationReport::infeasible(Minutes::from_integer(18));
        assert!(!r.is_feasible());
        assert_eq!(r.total_workers_used, 0);
        assert_eq!(r.bottleneck.exact, Minutes::from_integer(18));
    }

    #[test]
    fn test_report_serializes() {
        let r = sample_report();
        let json = serde_json::to_string(&r).unwrap();
        let back: AllocationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
