//! Staffing quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Station utilization | effective time / bottleneck T, per sequential task |
//! | Avg Utilization | Mean station utilization |
//! | Preferred Share | Fraction of used workers who are preferred |
//! | Idle Workers | Workers not part of the crew |
//! | Total Shortfall | Uncovered occupation points over all paired tasks |
//!
//! # Reference
//! Scholl (1999), "Balancing and Sequencing of Assembly Lines", Ch. 2: Line efficiency

use std::collections::BTreeMap;

use crate::models::AllocationReport;
use crate::time::{approx, Minutes};

/// Allocation performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffingKpi {
    /// Workers used.
    pub total_workers_used: usize,
    /// Workers left idle.
    pub idle_workers: usize,
    /// Fraction of used workers who are preferred (0.0..=1.0).
    pub preferred_share: f64,
    /// Per-station utilization (0.0..=1.0).
    pub utilization_by_task: BTreeMap<String, f64>,
    /// Mean station utilization.
    pub avg_utilization: f64,
    /// Sum of shortfall points.
    pub total_shortfall: i64,
}

impl StaffingKpi {
    /// Computes KPIs from a report. Infeasible reports yield all zeros.
    pub fn calculate(report: &AllocationReport) -> Self {
        let used: Vec<_> = report.workers.iter().filter(|w| w.used).collect();
        let preferred = used.iter().filter(|w| w.preferred).count();
        let preferred_share = if used.is_empty() {
            0.0
        } else {
            preferred as f64 / used.len() as f64
        };

        let bottleneck = report.bottleneck.exact;
        let utilization_by_task: BTreeMap<String, f64> = report
            .tasks
            .iter()
            .filter_map(|t| {
                let effective = t.effective_time?;
                if bottleneck <= Minutes::from_integer(0) {
                    return None;
                }
                Some((t.task.clone(), approx(&(effective / bottleneck))))
            })
            .collect();

        let avg_utilization = if utilization_by_task.is_empty() {
            0.0
        } else {
            utilization_by_task.values().sum::<f64>() / utilization_by_task.len() as f64
        };

        Self {
            total_workers_used: report.total_workers_used,
            idle_workers: report.workers.len() - used.len(),
            preferred_share,
            utilization_by_task,
            avg_utilization,
            total_shortfall: report.tasks.iter().map(|t| t.shortfall).sum(),
        }
    }

    /// Whether every station reaches at least `min_utilization`.
    pub fn meets_utilization(&self, min_utilization: f64) -> bool {
        self.utilization_by_task.values().all(|&u| u >= min_utilization)
    }
}
