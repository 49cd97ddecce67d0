//! Allocation pipeline, report audit, and KPI evaluation.
//!
//! # Algorithm
//!
//! 1. Validate the line and build the constraint model.
//! 2. Compose the ordered objective (headcount, shortfall, preference).
//! 3. Solve, either once over dominance weights or once per level
//!    ([`ObjectiveStrategy`]).
//! 4. Interpret the optimal assignment into an [`AllocationReport`].
//!
//! Infeasibility is a report status, never an error, and is never relaxed.
//!
//! # References
//!
//! - Boysen, Fliedner & Scholl (2008), "Assembly line balancing: Which model
//!   to use when?"
//! - Ehrgott (2005), "Multicriteria Optimization", Ch. 5

mod audit;
mod interpret;
mod kpi;

pub use audit::audit_report;
pub use interpret::interpret;
pub use kpi::StaffingKpi;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::SolveOptions;
use crate::cp::{
    solve_with_deadline, AllocationModel, AllocationModelBuilder, ConstraintTag, CpSolver,
    LinearConstraint, MicroLpSolver, ObjectiveComposer, ObjectivePlan, ObjectiveStrategy,
    SolverOutcome,
};
use crate::error::AllocationError;
use crate::models::{AllocationReport, ProductionLine};

/// Allocates workers to the stations of a production line.
///
/// # Example
/// ```
/// use u_staffing::allocator::LineAllocator;
/// use u_staffing::models::{AutomatedTask, ProductionLine, SequentialTask, Worker};
/// use u_staffing::time::parse_minutes;
///
/// let line = ProductionLine::new()
///     .with_automated(AutomatedTask::new("Press", parse_minutes("5.0").unwrap()))
///     .with_sequential(SequentialTask::new("Wash", parse_minutes("5.0").unwrap()).with_multiplier(2))
///     .with_worker(Worker::new("Arben").with_skill("Wash"))
///     .with_worker(Worker::new("Jamil").with_skill("Wash"));
///
/// let report = LineAllocator::new().allocate(&line).unwrap();
/// assert_eq!(report.total_workers_used, 2);
/// ```
#[derive(Debug, Clone)]
pub struct LineAllocator<S = MicroLpSolver> {
    solver: S,
    options: SolveOptions,
}

impl LineAllocator<MicroLpSolver> {
    /// Creates an allocator over the default backend.
    pub fn new() -> Self {
        Self::with_solver(MicroLpSolver::new())
    }
}

impl Default for LineAllocator<MicroLpSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> LineAllocator<S>
where
    S: CpSolver + Clone + Send + 'static,
{
    /// Creates an allocator over a custom backend.
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            options: SolveOptions::default(),
        }
    }

    /// Sets solve options.
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solves the staffing problem of `line`.
    ///
    /// # Errors
    /// - `InvalidModelSpec` if the line fails validation
    /// - `SolverUnavailable` if the backend fails or the deadline passes
    pub fn allocate(&self, line: &ProductionLine) -> Result<AllocationReport, AllocationError> {
        let started = Instant::now();
        let model = AllocationModelBuilder::new(line).build()?;
        let plan = ObjectiveComposer::compose(&model, line);

        let outcome = match self.options.strategy {
            ObjectiveStrategy::Weighted => self.solve_weighted(&model, &plan, started)?,
            ObjectiveStrategy::Lexicographic => self.solve_staged(&model, &plan, started)?,
        };

        let report = match outcome {
            SolverOutcome::Optimal(solution) => interpret(line, &model, &solution),
            SolverOutcome::Infeasible => AllocationReport::infeasible(model.bottleneck()),
        };

        info!(
            status = ?report.status,
            workers_used = report.total_workers_used,
            strategy = %self.options.strategy,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "allocation finished"
        );
        Ok(report)
    }

    fn solve_weighted(
        &self,
        model: &AllocationModel,
        plan: &ObjectivePlan,
        started: Instant,
    ) -> Result<SolverOutcome, AllocationError> {
        let mut cp = model.cp().clone();
        cp.set_objective(plan.weighted()?);
        let outcome = solve_with_deadline(&self.solver, cp, self.remaining(started)?)?;
        if let SolverOutcome::Optimal(solution) = &outcome {
            debug!(objective = solution.objective(), "weighted solve finished");
        }
        Ok(outcome)
    }

    /// Minimizes each level in turn, pinning it at its optimum before moving
    /// to the next.
    fn solve_staged(
        &self,
        model: &AllocationModel,
        plan: &ObjectivePlan,
        started: Instant,
    ) -> Result<SolverOutcome, AllocationError> {
        let mut cp = model.cp().clone();
        let mut last = None;

        for level in plan.levels() {
            cp.set_objective(level.expr.clone());
            match solve_with_deadline(&self.solver, cp.clone(), self.remaining(started)?)? {
                SolverOutcome::Infeasible => return Ok(SolverOutcome::Infeasible),
                SolverOutcome::Optimal(solution) => {
                    let best = solution.evaluate(&level.expr);
                    debug!(level = ?level.kind, best, "stage solved");
                    cp.add_linear(
                        ConstraintTag::ObjectiveBound,
                        LinearConstraint::le(level.expr.clone(), best),
                    );
                    last = Some(solution);
                }
            }
        }

        match last {
            Some(solution) => Ok(SolverOutcome::Optimal(solution)),
            None => solve_with_deadline(&self.solver, cp, self.remaining(started)?),
        }
    }

    /// Time left before the deadline, `None` without one.
    fn remaining(&self, started: Instant) -> Result<Option<Duration>, AllocationError> {
        let Some(limit) = self.options.time_limit else {
            return Ok(None);
        };
        match limit.checked_sub(started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(Some(left)),
            _ => Err(AllocationError::SolverUnavailable(format!(
                "deadline of {:.3}s passed",
                limit.as_secs_f64()
            ))),
        }
    }
}
