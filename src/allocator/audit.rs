//! Report audit.
//!
//! Re-checks a solved [`AllocationReport`] against its line with exact
//! rational arithmetic, independently of the model that produced it:
//! - every assigned worker holds the task's skill
//! - sequential stations keep pace with the bottleneck and meet their minimum
//! - fixed stations have exactly their required headcount
//! - the one-task cap holds, except via exempt tasks or one declared pair
//! - every coupling is performed by some worker
//! - occupation stays within budget and within the threshold when splitting
//! - every worker on a sequential station carries part of its work

use std::collections::HashMap;

use crate::cp::TaskLoad;
use crate::models::{AllocationReport, ProductionLine, TaskPair, Violation, ViolationType};

/// Audits a report. Infeasible reports have nothing to check.
pub fn audit_report(line: &ProductionLine, report: &AllocationReport) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !report.is_feasible() {
        return violations;
    }

    check_staffing(line, report, &mut violations);
    check_cap(line, report, &mut violations);
    check_couplings(line, report, &mut violations);
    check_occupation(line, report, &mut violations);

    violations
}

fn check_staffing(line: &ProductionLine, report: &AllocationReport, violations: &mut Vec<Violation>) {
    for staffing in &report.tasks {
        for name in &staffing.workers {
            let skilled = line
                .workers
                .iter()
                .find(|w| &w.name == name)
                .is_some_and(|w| w.has_skill(&staffing.task));
            if !skilled {
                violations.push(Violation::new(
                    ViolationType::SkillMismatch,
                    &staffing.task,
                    format!("Worker '{}' lacks the skill for '{}'", name, staffing.task),
                ));
            }
        }

        if staffing.assigned_workers != staffing.workers.len() as i64 {
            violations.push(Violation::new(
                ViolationType::StaffingMismatch,
                &staffing.task,
                format!(
                    "Task '{}' reports {} workers but names {}",
                    staffing.task,
                    staffing.assigned_workers,
                    staffing.workers.len()
                ),
            ));
        }
    }

    for task in &line.sequential {
        let assigned = report.task(&task.name).map_or(0, |s| s.assigned_workers);
        if !TaskLoad::new(task, report.bottleneck.exact).keeps_pace(assigned) {
            violations.push(Violation::new(
                ViolationType::RateExceeded,
                &task.name,
                format!(
                    "Task '{}' with {} workers is slower than the bottleneck {}",
                    task.name, assigned, report.bottleneck.exact
                ),
            ));
        }
        if assigned < i64::from(task.min_workers) {
            violations.push(Violation::new(
                ViolationType::StaffingMismatch,
                &task.name,
                format!(
                    "Task '{}' has {} workers, minimum is {}",
                    task.name, assigned, task.min_workers
                ),
            ));
        }
    }

    for task in &line.non_sequential {
        let assigned = report.task(&task.name).map_or(0, |s| s.assigned_workers);
        if assigned != i64::from(task.workers) {
            violations.push(Violation::new(
                ViolationType::StaffingMismatch,
                &task.name,
                format!(
                    "Task '{}' has {} workers, requires exactly {}",
                    task.name, assigned, task.workers
                ),
            ));
        }
    }

    for usage in &report.workers {
        if !usage.tasks.is_empty() && !usage.used {
            violations.push(Violation::new(
                ViolationType::StaffingMismatch,
                &usage.worker,
                format!("Worker '{}' holds tasks but is not counted as used", usage.worker),
            ));
        }
    }
}

fn check_cap(line: &ProductionLine, report: &AllocationReport, violations: &mut Vec<Violation>) {
    let exempt: Vec<&str> = line
        .non_sequential
        .iter()
        .filter(|t| t.exempt_from_cap)
        .map(|t| t.name.as_str())
        .collect();

    for usage in &report.workers {
        let capped: Vec<&String> = usage
            .tasks
            .iter()
            .filter(|t| !exempt.contains(&t.as_str()))
            .collect();
        let allowed = match capped.as_slice() {
            [] | [_] => true,
            [a, b] => {
                let held = TaskPair::new(a.as_str(), b.as_str());
                line.pairs.iter().any(|p| p.same_tasks(&held))
            }
            _ => false,
        };
        if !allowed {
            violations.push(Violation::new(
                ViolationType::CapExceeded,
                &usage.worker,
                format!("Worker '{}' holds {} capped tasks", usage.worker, capped.len()),
            ));
        }
    }
}

fn check_couplings(line: &ProductionLine, report: &AllocationReport, violations: &mut Vec<Violation>) {
    for coupling in &line.couplings {
        let met = report.workers.iter().any(|w| {
            w.tasks.contains(&coupling.task_a) && w.tasks.contains(&coupling.task_b)
        });
        if !met {
            violations.push(Violation::new(
                ViolationType::CouplingUnmet,
                format!("{}+{}", coupling.task_a, coupling.task_b),
                format!(
                    "No worker performs both '{}' and '{}'",
                    coupling.task_a, coupling.task_b
                ),
            ));
        }
    }
}

fn check_occupation(line: &ProductionLine, report: &AllocationReport, violations: &mut Vec<Violation>) {
    let mut held: HashMap<&str, HashMap<&str, i64>> = HashMap::new();
    for staffing in &report.tasks {
        for share in &staffing.occupation {
            if share.occupation <= 0 {
                violations.push(Violation::new(
                    ViolationType::IdleAssignment,
                    share.worker.as_str(),
                    format!(
                        "Worker '{}' is assigned '{}' with no occupation",
                        share.worker, staffing.task
                    ),
                ));
            }
            held.entry(share.worker.as_str())
                .or_default()
                .insert(staffing.task.as_str(), share.occupation);
        }
    }

    let threshold = i64::from(line.occupation_threshold);
    for (worker, shares) in &held {
        let total: i64 = shares.values().sum();
        if total > 100 {
            violations.push(Violation::new(
                ViolationType::OccupationExceeded,
                *worker,
                format!("Worker '{worker}' is occupied {total} points (> 100)"),
            ));
        }

        for pair in &line.pairs {
            let (Some(&a), Some(&b)) = (
                shares.get(pair.task_a.as_str()),
                shares.get(pair.task_b.as_str()),
            ) else {
                continue;
            };
            if a > threshold || b > threshold {
                violations.push(Violation::new(
                    ViolationType::OccupationExceeded,
                    *worker,
                    format!(
                        "Worker '{}' splits '{}' ({a}) and '{}' ({b}) above threshold {threshold}",
                        worker, pair.task_a, pair.task_b
                    ),
                ));
            }
        }
    }
}
