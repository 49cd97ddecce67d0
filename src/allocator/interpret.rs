//! Solution interpretation.
//!
//! Reads a solved assignment back into an [`AllocationReport`]: per-task
//! headcount, worker names, effective time and occupation, plus per-worker
//! usage.

use crate::cp::{AllocationModel, CpSolution};
use crate::models::{
    AllocationReport, BottleneckTime, ProductionLine, SolveStatus, TaskKind, TaskStaffing,
    WorkerShare, WorkerUsage,
};
use crate::time::approx;

/// Builds the report of a feasible solution.
pub fn interpret(line: &ProductionLine, model: &AllocationModel, solution: &CpSolution) -> AllocationReport {
    let vars = model.vars();
    let sequential = line.sequential.len();

    let tasks = line
        .task_names()
        .enumerate()
        .map(|(t, name)| {
            let assigned: Vec<usize> = (0..line.worker_count())
                .filter(|&i| solution.is_set(vars.assign.at(i, t)))
                .collect();
            let count = solution.value(vars.count[t]);
            let workers = assigned.iter().map(|&i| line.workers[i].name.clone()).collect();

            if t < sequential {
                let effective_time = line.sequential[t].effective_time(count);
                TaskStaffing {
                    task: name.to_string(),
                    kind: TaskKind::Sequential,
                    assigned_workers: count,
                    effective_time_approx: effective_time.as_ref().map(approx),
                    effective_time,
                    workers,
                    occupation: assigned
                        .iter()
                        .map(|&i| WorkerShare {
                            worker: line.workers[i].name.clone(),
                            occupation: solution.value(vars.occupation.at(i, t)),
                        })
                        .collect(),
                    shortfall: vars.shortfall[t].map_or(0, |v| solution.value(v)),
                }
            } else {
                TaskStaffing {
                    task: name.to_string(),
                    kind: TaskKind::NonSequential,
                    assigned_workers: count,
                    effective_time: None,
                    effective_time_approx: None,
                    workers,
                    occupation: Vec::new(),
                    shortfall: 0,
                }
            }
        })
        .collect();

    let workers: Vec<WorkerUsage> = line
        .workers
        .iter()
        .enumerate()
        .map(|(i, worker)| WorkerUsage {
            worker: worker.name.clone(),
            used: solution.is_set(vars.used[i]),
            preferred: worker.preferred,
            tasks: line
                .task_names()
                .enumerate()
                .filter(|&(t, _)| solution.is_set(vars.assign.at(i, t)))
                .map(|(_, name)| name.to_string())
                .collect(),
        })
        .collect();

    AllocationReport {
        status: SolveStatus::Feasible,
        bottleneck: BottleneckTime::new(model.bottleneck()),
        total_workers_used: workers.iter().filter(|w| w.used).count(),
        tasks,
        workers,
    }
}
