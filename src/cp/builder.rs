//! Allocation model construction.
//!
//! Translates a [`ProductionLine`] into a [`CpModel`]. Variables:
//!
//! | Variable | Domain | Meaning |
//! |----------|--------|---------|
//! | `assign[i,t]` | bool | worker `i` works task `t` |
//! | `count[t]` | 0..=W | workers on task `t` |
//! | `used[i]` | bool | worker `i` is part of the crew |
//! | `occ[i,s]` | 0..=100 | occupation of worker `i` on sequential task `s` |
//! | `level[s][k]` | bool | sequential task `s` runs with `k` workers |
//! | `short[s]` | 0..=peak share | uncovered occupation of paired task `s` |
//! | `split[i,p]` | bool | worker `i` holds both tasks of pair `p` |
//! | `coupled[i,c]` | bool | worker `i` holds both tasks of coupling `c` |
//!
//! The line is validated first, so a failed build never creates variables.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::model::{ConstraintTag, CpModel, Domain, LinearConstraint, LinearExpr, VarGrid, VarId};
use super::sharing::{add_occupation_constraints, StaffingLevels, TaskLoad};
use crate::error::AllocationError;
use crate::models::ProductionLine;
use crate::time::Minutes;
use crate::validation::{validate_line, ValidationError, ValidationErrorKind};

/// Decision variables of an allocation model.
#[derive(Debug, Clone)]
pub struct ModelVars {
    /// Workers × manual tasks (dense task order).
    pub assign: VarGrid,
    /// Worker count per manual task.
    pub count: Vec<VarId>,
    /// Crew membership per worker.
    pub used: Vec<VarId>,
    /// Workers × sequential tasks.
    pub occupation: VarGrid,
    /// Staffing levels per sequential task.
    pub levels: Vec<StaffingLevels>,
    /// Shortfall per sequential task (paired tasks only).
    pub shortfall: Vec<Option<VarId>>,
    /// Workers × pairs.
    pub split: VarGrid,
    /// Workers × couplings.
    pub coupled: VarGrid,
}

/// A constraint model of one production line, with the handles needed to
/// read a solution back.
#[derive(Debug, Clone)]
pub struct AllocationModel {
    pub(crate) cp: CpModel,
    pub(crate) vars: ModelVars,
    pub(crate) bottleneck: Minutes,
    pub(crate) loads: Vec<TaskLoad>,
    /// Pairs as sequential task indices.
    pub(crate) pairs: Vec<(usize, usize)>,
    /// Couplings as dense task indices.
    pub(crate) couplings: Vec<(usize, usize)>,
}

impl AllocationModel {
    /// The constraint model.
    pub fn cp(&self) -> &CpModel {
        &self.cp
    }

    /// Variable handles.
    pub fn vars(&self) -> &ModelVars {
        &self.vars
    }

    /// Bottleneck cycle time the model was built against.
    pub fn bottleneck(&self) -> Minutes {
        self.bottleneck
    }

    /// Exact load of the sequential task at `index`.
    pub fn load(&self, index: usize) -> Option<&TaskLoad> {
        self.loads.get(index)
    }
}

/// Builds an [`AllocationModel`] from a production line.
///
/// # Example
/// ```
/// use u_staffing::cp::AllocationModelBuilder;
/// use u_staffing::models::{AutomatedTask, ProductionLine, SequentialTask, Worker};
/// use u_staffing::time::Minutes;
///
/// let line = ProductionLine::new()
///     .with_automated(AutomatedTask::new("Press", Minutes::from_integer(5)))
///     .with_sequential(SequentialTask::new("Wash", Minutes::from_integer(5)))
///     .with_worker(Worker::new("Arben").with_skill("Wash"));
///
/// let model = AllocationModelBuilder::new(&line).build().unwrap();
/// assert!(model.cp().var_count() > 0);
/// ```
pub struct AllocationModelBuilder<'a> {
    line: &'a ProductionLine,
}

impl<'a> AllocationModelBuilder<'a> {
    /// Creates a builder for `line`.
    pub fn new(line: &'a ProductionLine) -> Self {
        Self { line }
    }

    /// Validates the line and builds the model.
    ///
    /// # Errors
    /// `InvalidModelSpec` if the line fails validation.
    pub fn build(&self) -> Result<AllocationModel, AllocationError> {
        validate_line(self.line).map_err(AllocationError::InvalidModelSpec)?;
        let Some(bottleneck) = self.line.bottleneck() else {
            return Err(AllocationError::InvalidModelSpec(vec![ValidationError::new(
                ValidationErrorKind::MissingBottleneck,
                "Line has no automated station",
            )]));
        };
        self.warn_unknown_skills();

        let loads: Vec<TaskLoad> = self
            .line
            .sequential
            .iter()
            .map(|t| TaskLoad::new(t, bottleneck))
            .collect();
        let pairs = self.resolve_pairs();
        let couplings = self.resolve_couplings();

        let mut cp = CpModel::new("line_allocation");
        let vars = self.declare_vars(&mut cp, &loads, pairs.len(), couplings.len());

        let mut model = AllocationModel {
            cp,
            vars,
            bottleneck,
            loads,
            pairs,
            couplings,
        };

        let mut cp = std::mem::take(&mut model.cp);
        self.add_headcount(&mut cp, &model);
        self.add_skill_gates(&mut cp, &model);
        self.add_worker_cap(&mut cp, &model);
        self.add_rate(&mut cp, &model);
        self.add_fixed_staffing(&mut cp, &model);
        self.add_couplings(&mut cp, &model);
        add_occupation_constraints(&mut cp, &model, i64::from(self.line.occupation_threshold));
        self.add_usage(&mut cp, &model);
        model.cp = cp;

        debug!(
            workers = self.line.worker_count(),
            tasks = self.line.task_count(),
            pairs = model.pairs.len(),
            couplings = model.couplings.len(),
            variables = model.cp.var_count(),
            constraints = model.cp.constraint_count(),
            "built allocation model"
        );

        Ok(model)
    }

    fn warn_unknown_skills(&self) {
        let known: HashSet<&str> = self.line.task_names().collect();
        for worker in &self.line.workers {
            for skill in &worker.skills {
                if !known.contains(skill.as_str()) {
                    warn!(worker = %worker.name, skill = %skill, "skill names no manual task; ignored");
                }
            }
        }
    }

    fn resolve_pairs(&self) -> Vec<(usize, usize)> {
        self.line
            .pairs
            .iter()
            .filter_map(|p| Some((self.line.task_index(&p.task_a)?, self.line.task_index(&p.task_b)?)))
            .collect()
    }

    fn resolve_couplings(&self) -> Vec<(usize, usize)> {
        self.line
            .couplings
            .iter()
            .filter_map(|c| Some((self.line.task_index(&c.task_a)?, self.line.task_index(&c.task_b)?)))
            .collect()
    }

    fn declare_vars(
        &self,
        cp: &mut CpModel,
        loads: &[TaskLoad],
        pair_count: usize,
        coupling_count: usize,
    ) -> ModelVars {
        let line = self.line;
        let workers = line.worker_count();
        let tasks = line.task_count();
        let sequential = line.sequential.len();
        let names: Vec<&str> = line.task_names().collect();
        let w = workers as i64;

        let assign = VarGrid::allocate(cp, workers, tasks, Domain::Binary, |i, t| {
            format!("assign[{},{}]", line.workers[i].name, names[t])
        });
        let count = names
            .iter()
            .map(|name| cp.add_integer(format!("count[{name}]"), 0, w))
            .collect();
        let used = line
            .workers
            .iter()
            .map(|worker| cp.add_binary(format!("used[{}]", worker.name)))
            .collect();
        let occupation = VarGrid::allocate(
            cp,
            workers,
            sequential,
            Domain::Integer { min: 0, max: 100 },
            |i, s| format!("occ[{},{}]", line.workers[i].name, names[s]),
        );

        let levels: Vec<StaffingLevels> = line
            .sequential
            .iter()
            .zip(loads)
            .map(|(task, load)| {
                let first = i64::from(task.min_workers).max(load.rate_floor());
                let indicators = (first..=w)
                    .map(|k| cp.add_binary(format!("level[{},{}]", task.name, k)))
                    .collect();
                let shares = (first..=w).map(|k| load.share_points(k)).collect();
                StaffingLevels {
                    first,
                    indicators,
                    shares,
                }
            })
            .collect();

        let shortfall = line
            .sequential
            .iter()
            .zip(&levels)
            .map(|(task, level)| {
                line.is_paired(&task.name)
                    .then(|| cp.add_integer(format!("short[{}]", task.name), 0, level.peak_share()))
            })
            .collect();

        let split = VarGrid::allocate(cp, workers, pair_count, Domain::Binary, |i, p| {
            format!("split[{},{}]", line.workers[i].name, p)
        });
        let coupled = VarGrid::allocate(cp, workers, coupling_count, Domain::Binary, |i, c| {
            format!("coupled[{},{}]", line.workers[i].name, c)
        });

        ModelVars {
            assign,
            count,
            used,
            occupation,
            levels,
            shortfall,
            split,
            coupled,
        }
    }

    /// `Σᵢ assign[i,t] = count[t]`
    fn add_headcount(&self, cp: &mut CpModel, model: &AllocationModel) {
        let vars = &model.vars;
        for (t, &count) in vars.count.iter().enumerate() {
            let mut expr = LinearExpr::sum(vars.assign.col(t));
            expr.add_term(count, -1);
            cp.add_linear(ConstraintTag::Headcount, LinearConstraint::eq(expr, 0));
        }
    }

    fn add_skill_gates(&self, cp: &mut CpModel, model: &AllocationModel) {
        for (i, worker) in self.line.workers.iter().enumerate() {
            for (t, name) in self.line.task_names().enumerate() {
                if !worker.has_skill(name) {
                    cp.add_linear(
                        ConstraintTag::SkillGate,
                        LinearConstraint::eq(LinearExpr::sum([model.vars.assign.at(i, t)]), 0),
                    );
                }
            }
        }
    }

    /// At most one capped task per worker, except the two tasks of a single
    /// declared pair.
    fn add_worker_cap(&self, cp: &mut CpModel, model: &AllocationModel) {
        let vars = &model.vars;
        let sequential = self.line.sequential.len();
        let capped: Vec<usize> = (0..self.line.task_count())
            .filter(|&t| t < sequential || !self.line.non_sequential[t - sequential].exempt_from_cap)
            .collect();

        for i in 0..vars.assign.rows() {
            for (p, &(a, b)) in model.pairs.iter().enumerate() {
                cp.add_and(
                    ConstraintTag::PairSplit,
                    vars.split.at(i, p),
                    vec![vars.assign.at(i, a), vars.assign.at(i, b)],
                );
            }
            if model.pairs.len() > 1 {
                cp.add_linear(
                    ConstraintTag::PairSplit,
                    LinearConstraint::le(LinearExpr::sum(vars.split.row(i)), 1),
                );
            }

            let mut held = LinearExpr::sum(capped.iter().map(|&t| vars.assign.at(i, t)));
            for split in vars.split.row(i) {
                held.add_term(split, -1);
            }
            cp.add_linear(ConstraintTag::WorkerCap, LinearConstraint::le(held, 1));
        }
    }

    /// `capacity · count ≥ work`, the minimum staffing, and the level
    /// indicators tying `count` to one admissible value.
    fn add_rate(&self, cp: &mut CpModel, model: &AllocationModel) {
        let vars = &model.vars;
        for (s, task) in self.line.sequential.iter().enumerate() {
            let count = vars.count[s];
            let load = &model.loads[s];

            cp.add_linear(
                ConstraintTag::Rate,
                LinearConstraint::ge(LinearExpr::new().with_term(count, load.capacity()), load.work()),
            );
            cp.add_linear(
                ConstraintTag::MinimumWorkers,
                LinearConstraint::ge(LinearExpr::sum([count]), i64::from(task.min_workers)),
            );

            let levels = &vars.levels[s];
            if levels.indicators.is_empty() {
                continue;
            }
            cp.add_linear(
                ConstraintTag::StaffingLevel,
                LinearConstraint::eq(LinearExpr::sum(levels.indicators.iter().copied()), 1),
            );
            let mut tie = levels.count_expr();
            tie.add_term(count, -1);
            cp.add_linear(ConstraintTag::StaffingLevel, LinearConstraint::eq(tie, 0));
        }
    }

    fn add_fixed_staffing(&self, cp: &mut CpModel, model: &AllocationModel) {
        let offset = self.line.sequential.len();
        for (j, task) in self.line.non_sequential.iter().enumerate() {
            cp.add_linear(
                ConstraintTag::FixedStaffing,
                LinearConstraint::eq(
                    LinearExpr::sum([model.vars.count[offset + j]]),
                    i64::from(task.workers),
                ),
            );
        }
    }

    /// Some worker holds both tasks of every coupling.
    fn add_couplings(&self, cp: &mut CpModel, model: &AllocationModel) {
        let vars = &model.vars;
        for (c, &(a, b)) in model.couplings.iter().enumerate() {
            for i in 0..vars.assign.rows() {
                cp.add_and(
                    ConstraintTag::Coupling,
                    vars.coupled.at(i, c),
                    vec![vars.assign.at(i, a), vars.assign.at(i, b)],
                );
            }
            cp.add_linear(
                ConstraintTag::Coupling,
                LinearConstraint::ge(LinearExpr::sum(vars.coupled.col(c)), 1),
            );
        }
    }

    /// `assign[i,t] ⇒ used[i]`
    fn add_usage(&self, cp: &mut CpModel, model: &AllocationModel) {
        let vars = &model.vars;
        for (i, &used) in vars.used.iter().enumerate() {
            for assign in vars.assign.row(i) {
                cp.add_implication(
                    ConstraintTag::Usage,
                    assign,
                    LinearConstraint::ge(LinearExpr::sum([used]), 1),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AutomatedTask, Coupling, FixedTask, SequentialTask, TaskPair, Worker};

    fn sample_line() -> ProductionLine {
        ProductionLine::new()
            .with_automated(AutomatedTask::new("Press", Minutes::from_integer(10)))
            .with_sequential(SequentialTask::new("A", Minutes::from_integer(6)))
            .with_sequential(SequentialTask::new("B", Minutes::from_integer(3)))
            .with_sequential(SequentialTask::new("C", Minutes::from_integer(15)))
            .with_fixed(FixedTask::new("Operate").exempt_from_cap())
            .with_pair(TaskPair::new("A", "B"))
            .with_coupling(Coupling::new("C", "Operate"))
            .with_worker(Worker::new("W1").with_skills(["A", "B", "C"]))
            .with_worker(Worker::new("W2").with_skills(["C", "Operate"]))
            .with_worker(Worker::new("W3").with_skills(["A", "Unknown"]))
    }

    #[test]
    fn test_variable_layout() {
        let line = sample_line();
        let model = AllocationModelBuilder::new(&line).build().unwrap();
        let vars = model.vars();

        assert_eq!(vars.assign.rows(), 3);
        assert_eq!(vars.assign.cols(), 4);
        assert_eq!(vars.occupation.cols(), 3);
        assert_eq!(vars.split.cols(), 1);
        assert_eq!(vars.coupled.cols(), 1);
        assert!(vars.shortfall[0].is_some());
        assert!(vars.shortfall[1].is_some());
        assert!(vars.shortfall[2].is_none());
        assert_eq!(model.cp().var(vars.assign.at(1, 3)).name, "assign[W2,Operate]");
    }

    #[test]
    fn test_staffing_levels() {
        let line = sample_line();
        let model = AllocationModelBuilder::new(&line).build().unwrap();
        let levels = &model.vars().levels;

        // A: 6 of 10 minutes, levels 1..=3
        assert_eq!(levels[0].first, 1);
        assert_eq!(levels[0].shares, vec![60, 30, 20]);
        // C: 15 of 10 minutes needs two workers
        assert_eq!(levels[2].first, 2);
        assert_eq!(levels[2].shares, vec![75, 50]);

        // shortfall never exceeds the share of the smallest level
        let short_a = model.vars().shortfall[0].unwrap();
        assert_eq!(model.cp().var(short_a).domain.bounds(), (0, 60));
        let short_b = model.vars().shortfall[1].unwrap();
        assert_eq!(model.cp().var(short_b).domain.bounds(), (0, 30));
    }

    #[test]
    fn test_constraint_families() {
        let line = sample_line();
        let model = AllocationModelBuilder::new(&line).build().unwrap();
        let cp = model.cp();

        assert_eq!(cp.count_tagged(ConstraintTag::Headcount), 4);
        // W1 lacks Operate, W2 lacks A and B, W3 lacks B, C, Operate
        assert_eq!(cp.count_tagged(ConstraintTag::SkillGate), 6);
        assert_eq!(cp.count_tagged(ConstraintTag::WorkerCap), 3);
        assert_eq!(cp.count_tagged(ConstraintTag::Rate), 3);
        assert_eq!(cp.count_tagged(ConstraintTag::FixedStaffing), 1);
        // one conjunction per worker plus the cover row
        assert_eq!(cp.count_tagged(ConstraintTag::Coupling), 4);
        assert_eq!(cp.count_tagged(ConstraintTag::Coverage), 2);
        // one upper gate and one one-point floor per worker and sequential task
        assert_eq!(cp.count_tagged(ConstraintTag::OccupationGate), 18);
        assert_eq!(cp.count_tagged(ConstraintTag::Usage), 12);
    }

    #[test]
    fn test_invalid_line_rejected() {
        let line = ProductionLine::new()
            .with_sequential(SequentialTask::new("A", Minutes::from_integer(6)))
            .with_worker(Worker::new("W1").with_skill("A"));
        let err = AllocationModelBuilder::new(&line).build().unwrap_err();
        assert!(matches!(err, AllocationError::InvalidModelSpec(_)));
        assert_eq!(err.validation_errors()[0].kind, ValidationErrorKind::MissingBottleneck);
    }

    #[test]
    fn test_empty_level_range() {
        // 30 minutes against 10 needs three workers; only one exists
        let line = ProductionLine::new()
            .with_automated(AutomatedTask::new("Press", Minutes::from_integer(10)))
            .with_sequential(SequentialTask::new("A", Minutes::from_integer(30)))
            .with_worker(Worker::new("W1").with_skill("A"));
        let model = AllocationModelBuilder::new(&line).build().unwrap();
        assert!(model.vars().levels[0].indicators.is_empty());
        assert_eq!(model.cp().count_tagged(ConstraintTag::StaffingLevel), 0);
    }
}
