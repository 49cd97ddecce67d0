//! Solving backends.
//!
//! [`CpSolver`] is the seam between model construction and the search
//! engine. The default backend, [`MicroLpSolver`], lowers the model to a
//! mixed-integer program and hands it to the pure-Rust `microlp` engine
//! through `good_lp`.
//!
//! Solves can be bounded by a wall-clock deadline with
//! [`solve_with_deadline`]; a solve that has not answered in time is reported
//! as `SolverUnavailable` and its late result is discarded.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{debug, warn};

use super::model::{CpModel, LinearExpr, Relation, VarId};
use crate::error::AllocationError;

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverOutcome {
    /// An optimal assignment.
    Optimal(CpSolution),
    /// The constraints admit no assignment.
    Infeasible,
}

/// A full variable assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    values: Vec<i64>,
    objective: i64,
}

impl CpSolution {
    /// Wraps an assignment, evaluating the model objective on it.
    pub fn new(model: &CpModel, values: Vec<i64>) -> Self {
        let objective = model.objective().evaluate(&values);
        Self { values, objective }
    }

    /// Value of a variable.
    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.index()]
    }

    /// Whether a boolean variable is set.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) == 1
    }

    /// Value of an expression.
    pub fn evaluate(&self, expr: &LinearExpr) -> i64 {
        expr.evaluate(&self.values)
    }

    /// Objective value.
    pub fn objective(&self) -> i64 {
        self.objective
    }

    /// All values, indexed by [`VarId::index`].
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

/// A backend that minimizes a [`CpModel`] objective.
pub trait CpSolver {
    /// Solves to optimality.
    ///
    /// # Errors
    /// `SolverUnavailable` if the backend fails for any reason other than
    /// infeasibility.
    fn solve(&self, model: &CpModel) -> Result<SolverOutcome, AllocationError>;
}

/// Mixed-integer backend over `good_lp`'s `microlp` engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for MicroLpSolver {
    fn solve(&self, model: &CpModel) -> Result<SolverOutcome, AllocationError> {
        let rows = model.linearize();

        // Rows without terms are decided here; microlp never sees them.
        if rows.iter().any(|r| r.expr.is_empty() && !r.holds_for(0)) {
            debug!(model = model.name(), "constant row violated");
            return Ok(SolverOutcome::Infeasible);
        }

        let mut problem_vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .vars()
            .iter()
            .map(|def| {
                let (min, max) = def.domain.bounds();
                problem_vars.add(
                    variable()
                        .integer()
                        .min(min as f64)
                        .max(max as f64)
                        .name(def.name.clone()),
                )
            })
            .collect();

        let mut problem = problem_vars
            .minimise(to_expression(model.objective(), &handles))
            .using(microlp);
        for row in rows.iter().filter(|r| !r.expr.is_empty()) {
            let lhs = to_expression(&row.expr, &handles);
            let rhs = row.rhs as f64;
            problem.add_constraint(match row.relation {
                Relation::Le => constraint::leq(lhs, rhs),
                Relation::Ge => constraint::geq(lhs, rhs),
                Relation::Eq => constraint::eq(lhs, rhs),
            });
        }

        debug!(
            model = model.name(),
            variables = handles.len(),
            rows = rows.len(),
            "solving with microlp"
        );

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<i64> = handles
                    .iter()
                    .map(|&v| solution.value(v).round() as i64)
                    .collect();
                if !model.is_satisfied(&values) {
                    return Err(AllocationError::SolverUnavailable(
                        "backend returned an assignment that violates the model".into(),
                    ));
                }
                Ok(SolverOutcome::Optimal(CpSolution::new(model, values)))
            }
            Err(ResolutionError::Infeasible) => Ok(SolverOutcome::Infeasible),
            Err(e) => Err(AllocationError::SolverUnavailable(e.to_string())),
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(0.0);
    for &(var, coef) in expr.terms() {
        out += coef as f64 * handles[var.index()];
    }
    out
}

/// Solves `model`, giving up after `limit`.
///
/// Without a limit the solve runs on the calling thread. With one it runs on
/// a worker thread named `u-staffing-solve`; if no answer arrives in time the
/// result is discarded and `SolverUnavailable` is returned.
///
/// The backend cannot be interrupted, so a timed-out worker thread keeps
/// running until its search ends and then exits on its own. Callers that
/// solve in stages stop at the first timeout, which leaves at most one such
/// thread per run.
pub fn solve_with_deadline<S>(
    solver: &S,
    model: CpModel,
    limit: Option<Duration>,
) -> Result<SolverOutcome, AllocationError>
where
    S: CpSolver + Clone + Send + 'static,
{
    let Some(limit) = limit else {
        return solver.solve(&model);
    };

    let (tx, rx) = mpsc::channel();
    let solver = solver.clone();
    thread::Builder::new()
        .name("u-staffing-solve".into())
        .spawn(move || {
            // The receiver is gone once the deadline passed.
            let _ = tx.send(solver.solve(&model));
        })
        .map_err(|e| AllocationError::SolverUnavailable(format!("cannot start solver thread: {e}")))?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(?limit, "solver deadline reached");
            Err(AllocationError::SolverUnavailable(format!(
                "no answer within {:.3}s",
                limit.as_secs_f64()
            )))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(AllocationError::SolverUnavailable(
            "solver thread terminated".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::model::{ConstraintTag, LinearConstraint};

    /// min x + y  s.t.  x + y ≥ 3, x ≤ 1
    fn small_model() -> (CpModel, VarId, VarId) {
        let mut model = CpModel::new("small");
        let x = model.add_integer("x", 0, 5);
        let y = model.add_integer("y", 0, 5);
        model.add_linear(
            ConstraintTag::Rate,
            LinearConstraint::ge(LinearExpr::sum([x, y]), 3),
        );
        model.add_linear(ConstraintTag::Rate, LinearConstraint::le(LinearExpr::sum([x]), 1));
        model.set_objective(LinearExpr::new().with_term(x, 1).with_term(y, 2));
        (model, x, y)
    }

    #[test]
    fn test_microlp_optimum() {
        let (model, x, y) = small_model();
        let SolverOutcome::Optimal(sol) = MicroLpSolver::new().solve(&model).unwrap() else {
            panic!("expected a solution");
        };
        assert_eq!(sol.value(x), 1);
        assert_eq!(sol.value(y), 2);
        assert_eq!(sol.objective(), 5);
    }

    #[test]
    fn test_microlp_infeasible() {
        let (mut model, _, y) = small_model();
        model.add_linear(ConstraintTag::Rate, LinearConstraint::le(LinearExpr::sum([y]), 1));
        assert_eq!(MicroLpSolver::new().solve(&model).unwrap(), SolverOutcome::Infeasible);
    }

    #[test]
    fn test_constant_row_infeasible() {
        let mut model = CpModel::new("empty");
        model.add_linear(ConstraintTag::Coupling, LinearConstraint::ge(LinearExpr::new(), 1));
        assert_eq!(MicroLpSolver::new().solve(&model).unwrap(), SolverOutcome::Infeasible);
    }

    #[test]
    fn test_logical_constraints_respected() {
        let mut model = CpModel::new("logic");
        let a = model.add_binary("a");
        let b = model.add_binary("b");
        let both = model.add_binary("both");
        model.add_and(ConstraintTag::PairSplit, both, vec![a, b]);
        model.add_linear(ConstraintTag::Rate, LinearConstraint::ge(LinearExpr::sum([both]), 1));
        model.set_objective(LinearExpr::sum([a, b]));

        let SolverOutcome::Optimal(sol) = MicroLpSolver::new().solve(&model).unwrap() else {
            panic!("expected a solution");
        };
        assert!(sol.is_set(a) && sol.is_set(b) && sol.is_set(both));
    }

    #[derive(Clone)]
    struct SlowSolver(Duration);

    impl CpSolver for SlowSolver {
        fn solve(&self, _model: &CpModel) -> Result<SolverOutcome, AllocationError> {
            thread::sleep(self.0);
            Ok(SolverOutcome::Infeasible)
        }
    }

    #[test]
    fn test_deadline_expires() {
        let solver = SlowSolver(Duration::from_millis(500));
        let err = solve_with_deadline(&solver, CpModel::new("slow"), Some(Duration::from_millis(20)))
            .unwrap_err();
        assert!(matches!(err, AllocationError::SolverUnavailable(_)));
    }

    #[test]
    fn test_deadline_met() {
        let (model, _, _) = small_model();
        let outcome =
            solve_with_deadline(&MicroLpSolver::new(), model, Some(Duration::from_secs(30))).unwrap();
        assert!(matches!(outcome, SolverOutcome::Optimal(_)));
    }
}
