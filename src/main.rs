//! u-staffing command-line front end.
//!
//! Reads a JSON line configuration, allocates workers, and prints the
//! staffing report. Solve options come from `STAFFING_TIME_LIMIT_SECS` and
//! `STAFFING_OBJECTIVE`; log verbosity from `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use u_staffing::allocator::{audit_report, LineAllocator, StaffingKpi};
use u_staffing::config::{LineConfig, SolveOptions};
use u_staffing::models::{AllocationReport, TaskKind};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "u_staffing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: u-staffing <line-config.json>");
    };

    let config = LineConfig::from_path(&path)?;
    let line = config
        .into_problem()
        .with_context(|| format!("reading times from {}", path.display()))?;
    let options = SolveOptions::from_env()?;

    let report = LineAllocator::new().with_options(options).allocate(&line)?;

    for violation in audit_report(&line, &report) {
        warn!(entity = %violation.entity, "{}", violation.message);
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &AllocationReport) {
    println!(
        "Bottleneck cycle time: {} min (~{:.2})",
        report.bottleneck.exact, report.bottleneck.approx
    );
    if !report.is_feasible() {
        println!("No feasible allocation found.");
        return;
    }
    println!("Total workers used: {}", report.total_workers_used);
    println!();

    for task in &report.tasks {
        match (task.kind, task.effective_time_approx) {
            (TaskKind::Sequential, Some(eff)) => println!(
                "{}: {} worker(s), effective time {:.2} min",
                task.task, task.assigned_workers, eff
            ),
            _ => println!("{}: {} worker(s)", task.task, task.assigned_workers),
        }
        for name in &task.workers {
            let occupation = task
                .occupation
                .iter()
                .find(|s| &s.worker == name)
                .map(|s| format!(" ({}%)", s.occupation))
                .unwrap_or_default();
            println!("    - {name}{occupation}");
        }
        if task.shortfall > 0 {
            println!("    shortfall: {} points", task.shortfall);
        }
    }

    println!();
    println!("Worker usage:");
    for usage in report.workers.iter().filter(|w| w.used) {
        let preferred = if usage.preferred { " (preferred)" } else { "" };
        println!("    {}{}: {}", usage.worker, preferred, usage.tasks.join(", "));
    }

    let kpi = StaffingKpi::calculate(report);
    println!();
    println!(
        "Average station utilization: {:.1}%, preferred share: {:.1}%, idle workers: {}",
        kpi.avg_utilization * 100.0,
        kpi.preferred_share * 100.0,
        kpi.idle_workers
    );
}
