//! Solver-independent constraint model.
//!
//! A `CpModel` holds integer and boolean decision variables, constraints over
//! them, and a single linear objective to minimize. Coefficients are exact
//! `i64` values; nothing in the model is approximated.
//!
//! Besides plain linear (in)equalities the model carries two logical forms:
//! - `Implies`: a boolean condition switches a linear constraint on
//! - `And`: a boolean equals the conjunction of other booleans
//!
//! Backends that only understand linear rows call [`CpModel::linearize`],
//! which lowers both forms with big-M coefficients derived from the variable
//! domains.
//!
//! # Reference
//! Williams (2013), "Model Building in Mathematical Programming", Ch. 9

use std::fmt;

/// Handle to a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Dense index of the variable within its model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// 0 or 1.
    Binary,
    /// Any integer in `[min, max]`.
    Integer { min: i64, max: i64 },
}

impl Domain {
    /// Inclusive bounds.
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            Domain::Binary => (0, 1),
            Domain::Integer { min, max } => (min, max),
        }
    }
}

/// A named decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDef {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Variable domain.
    pub domain: Domain,
}

/// A linear expression `Σ coef·var` with integer coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of variables with unit coefficients.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Adds a term.
    pub fn with_term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds a term in place. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    /// Adds `factor · other` in place.
    pub fn add_scaled(&mut self, other: &LinearExpr, factor: i64) {
        for &(var, coef) in &other.terms {
            self.add_term(var, coef * factor);
        }
    }

    /// Terms of the expression.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// Whether the expression has no terms (it is identically zero).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression for a full variable assignment.
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values[var.index()])
            .sum()
    }
}

/// Comparison of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expr ≤ rhs`
    Le,
    /// `expr ≥ rhs`
    Ge,
    /// `expr = rhs`
    Eq,
}

/// A linear constraint `expr (≤ | ≥ | =) rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

impl LinearConstraint {
    /// `expr ≤ rhs`
    pub fn le(expr: LinearExpr, rhs: i64) -> Self {
        Self { expr, relation: Relation::Le, rhs }
    }

    /// `expr ≥ rhs`
    pub fn ge(expr: LinearExpr, rhs: i64) -> Self {
        Self { expr, relation: Relation::Ge, rhs }
    }

    /// `expr = rhs`
    pub fn eq(expr: LinearExpr, rhs: i64) -> Self {
        Self { expr, relation: Relation::Eq, rhs }
    }

    /// Whether the constraint holds when the expression evaluates to `lhs`.
    pub fn holds_for(&self, lhs: i64) -> bool {
        match self.relation {
            Relation::Le => lhs <= self.rhs,
            Relation::Ge => lhs >= self.rhs,
            Relation::Eq => lhs == self.rhs,
        }
    }

    /// Whether the constraint holds for a full variable assignment.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.holds_for(self.expr.evaluate(values))
    }
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Plain linear constraint.
    Linear(LinearConstraint),
    /// `condition = 1 ⇒ then`.
    Implies {
        condition: VarId,
        then: LinearConstraint,
    },
    /// `result = operands[0] ∧ operands[1] ∧ …`.
    And { result: VarId, operands: Vec<VarId> },
}

/// Constraint families, used for diagnostics and model inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintTag {
    Headcount,
    WorkerCap,
    PairSplit,
    SkillGate,
    Rate,
    MinimumWorkers,
    StaffingLevel,
    FixedStaffing,
    Coupling,
    OccupationGate,
    EvenShare,
    Coverage,
    PairBudget,
    SplitThreshold,
    SplitShare,
    OccupationBudget,
    Usage,
    ObjectiveBound,
}

/// A constraint model: variables, tagged constraints, and a minimization
/// objective.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    vars: Vec<VarDef>,
    constraints: Vec<(ConstraintTag, Constraint)>,
    objective: LinearExpr,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable.
    pub fn add_var(&mut self, name: impl Into<String>, domain: Domain) -> VarId {
        self.vars.push(VarDef {
            name: name.into(),
            domain,
        });
        VarId(self.vars.len() - 1)
    }

    /// Adds a boolean variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name, Domain::Binary)
    }

    /// Adds an integer variable in `[min, max]`.
    pub fn add_integer(&mut self, name: impl Into<String>, min: i64, max: i64) -> VarId {
        self.add_var(name, Domain::Integer { min, max })
    }

    /// Adds a constraint.
    pub fn add(&mut self, tag: ConstraintTag, constraint: Constraint) {
        self.constraints.push((tag, constraint));
    }

    /// Adds a linear constraint.
    pub fn add_linear(&mut self, tag: ConstraintTag, constraint: LinearConstraint) {
        self.add(tag, Constraint::Linear(constraint));
    }

    /// Adds `condition ⇒ then`.
    pub fn add_implication(&mut self, tag: ConstraintTag, condition: VarId, then: LinearConstraint) {
        self.add(tag, Constraint::Implies { condition, then });
    }

    /// Adds `result = ∧ operands`.
    pub fn add_and(&mut self, tag: ConstraintTag, result: VarId, operands: Vec<VarId>) {
        self.add(tag, Constraint::And { result, operands });
    }

    /// Sets the expression to minimize.
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Expression to minimize.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Variable definitions, indexed by [`VarId::index`].
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    /// Definition of one variable.
    pub fn var(&self, id: VarId) -> &VarDef {
        &self.vars[id.index()]
    }

    /// Tagged constraints in insertion order.
    pub fn constraints(&self) -> &[(ConstraintTag, Constraint)] {
        &self.constraints
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints with a given tag.
    pub fn count_tagged(&self, tag: ConstraintTag) -> usize {
        self.constraints.iter().filter(|(t, _)| *t == tag).count()
    }

    /// Smallest and largest value an expression can take over the variable
    /// domains.
    pub fn bounds(&self, expr: &LinearExpr) -> (i64, i64) {
        expr.terms()
            .iter()
            .fold((0, 0), |(lo, hi), &(var, coef)| {
                let (min, max) = self.var(var).domain.bounds();
                if coef >= 0 {
                    (lo + coef * min, hi + coef * max)
                } else {
                    (lo + coef * max, hi + coef * min)
                }
            })
    }

    /// Lowers every constraint to linear rows.
    ///
    /// - `c ⇒ expr ≤ rhs` becomes `expr + M·c ≤ rhs + M` with
    ///   `M = max(expr) − rhs`; rows that hold for every assignment are dropped.
    /// - `c ⇒ expr ≥ rhs` becomes `expr − M·c ≥ rhs − M` with
    ///   `M = rhs − min(expr)`.
    /// - `c ⇒ expr = rhs` becomes both of the above.
    /// - `r = ∧ oᵢ` becomes `r ≤ oᵢ` for each operand and `Σ oᵢ − r ≤ n − 1`.
    pub fn linearize(&self) -> Vec<LinearConstraint> {
        let mut rows = Vec::with_capacity(self.constraints.len());

        for (_, constraint) in &self.constraints {
            match constraint {
                Constraint::Linear(c) => rows.push(c.clone()),
                Constraint::Implies { condition, then } => {
                    let (min, max) = self.bounds(&then.expr);
                    let upper = matches!(then.relation, Relation::Le | Relation::Eq);
                    let lower = matches!(then.relation, Relation::Ge | Relation::Eq);

                    if upper {
                        let big_m = max - then.rhs;
                        if big_m > 0 {
                            rows.push(LinearConstraint::le(
                                then.expr.clone().with_term(*condition, big_m),
                                then.rhs + big_m,
                            ));
                        }
                    }
                    if lower {
                        let big_m = then.rhs - min;
                        if big_m > 0 {
                            rows.push(LinearConstraint::ge(
                                then.expr.clone().with_term(*condition, -big_m),
                                then.rhs - big_m,
                            ));
                        }
                    }
                }
                Constraint::And { result, operands } => {
                    for &op in operands {
                        rows.push(LinearConstraint::le(
                            LinearExpr::new().with_term(*result, 1).with_term(op, -1),
                            0,
                        ));
                    }
                    let mut all = LinearExpr::sum(operands.iter().copied());
                    all.add_term(*result, -1);
                    rows.push(LinearConstraint::le(all, operands.len() as i64 - 1));
                }
            }
        }

        rows
    }

    /// Whether a full assignment satisfies every domain and constraint.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let in_domain = self.vars.iter().zip(values).all(|(def, &v)| {
            let (min, max) = def.domain.bounds();
            (min..=max).contains(&v)
        });

        in_domain
            && self.constraints.iter().all(|(_, c)| match c {
                Constraint::Linear(lc) => lc.is_satisfied(values),
                Constraint::Implies { condition, then } => {
                    values[condition.index()] == 0 || then.is_satisfied(values)
                }
                Constraint::And { result, operands } => {
                    let all = operands.iter().all(|op| values[op.index()] == 1);
                    values[result.index()] == i64::from(all)
                }
            })
    }
}

impl fmt::Display for CpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} variables, {} constraints)",
            self.name,
            self.vars.len(),
            self.constraints.len()
        )
    }
}

/// Row-major block of variables indexed by `(row, col)`.
///
/// Allocated contiguously, so a cell's [`VarId`] is computed rather than
/// looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarGrid {
    first: usize,
    rows: usize,
    cols: usize,
}

impl VarGrid {
    /// Allocates `rows × cols` variables, naming each with `name(row, col)`.
    pub fn allocate<F>(model: &mut CpModel, rows: usize, cols: usize, domain: Domain, name: F) -> Self
    where
        F: Fn(usize, usize) -> String,
    {
        let first = model.var_count();
        for r in 0..rows {
            for c in 0..cols {
                model.add_var(name(r, c), domain);
            }
        }
        Self { first, rows, cols }
    }

    /// Variable at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> VarId {
        debug_assert!(row < self.rows && col < self.cols);
        VarId(self.first + row * self.cols + col)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Variables of one row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = VarId> + '_ {
        (0..self.cols).map(move |c| self.at(row, c))
    }

    /// Variables of one column.
    pub fn col(&self, col: usize) -> impl Iterator<Item = VarId> + '_ {
        (0..self.rows).map(move |r| self.at(r, col))
    }
}
