//! Rate arithmetic and the occupation sub-model.
//!
//! Every sequential task has a workload `L = multiplier × base time` that must
//! fit into one bottleneck cycle `T`. Expressed in exact integers:
//!
//! ```text
//! work     = multiplier × base.numer × T.denom
//! capacity = T.numer × base.denom
//! rate     : capacity × workers ≥ work
//! ```
//!
//! Occupation is the share of a worker's cycle spent on a task, in integer
//! points (0..=100). At staffing level `k` each worker on a task carries
//! `⌈100 · work / (k · capacity)⌉` points. Workers on unpaired tasks carry
//! exactly that share. On paired tasks the same share is the coverage the
//! task's workers must jointly reach at its current level, with any gap
//! absorbed by a shortfall variable. An assigned worker always carries at
//! least one point.

use num_integer::Integer;

use super::model::{ConstraintTag, CpModel, LinearConstraint, LinearExpr, VarId};
use super::AllocationModel;
use crate::models::SequentialTask;
use crate::time::Minutes;

/// Exact load of a sequential task against the bottleneck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLoad {
    work: i128,
    capacity: i128,
}

impl TaskLoad {
    /// Load of `task` paced by `bottleneck`.
    pub fn new(task: &SequentialTask, bottleneck: Minutes) -> Self {
        let base = task.base_time;
        Self {
            work: i128::from(task.multiplier)
                * i128::from(*base.numer())
                * i128::from(*bottleneck.denom()),
            capacity: i128::from(*bottleneck.numer()) * i128::from(*base.denom()),
        }
    }

    /// Right-hand side of the rate constraint.
    pub fn work(&self) -> i64 {
        saturate(self.work)
    }

    /// Coefficient of the worker count in the rate constraint.
    pub fn capacity(&self) -> i64 {
        saturate(self.capacity)
    }

    /// Fewest workers that keep up with the bottleneck.
    pub fn rate_floor(&self) -> i64 {
        saturate(Integer::div_ceil(&self.work, &self.capacity))
    }

    /// Whether `workers` people keep up with the bottleneck.
    pub fn keeps_pace(&self, workers: i64) -> bool {
        self.capacity * i128::from(workers) >= self.work
    }

    /// Occupation points each of `workers` people carries.
    pub fn share_points(&self, workers: i64) -> i64 {
        if workers <= 0 {
            return 0;
        }
        let denom = i128::from(workers) * self.capacity;
        saturate(Integer::div_ceil(&(100 * self.work), &denom))
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Staffing-level indicators of one sequential task.
///
/// Exactly one indicator is set; indicator `j` stands for `first + j`
/// workers. A task whose feasible range is empty has no indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffingLevels {
    /// Smallest admissible worker count.
    pub first: i64,
    /// One boolean per admissible count.
    pub indicators: Vec<VarId>,
    /// Per-worker occupation at each admissible count.
    pub shares: Vec<i64>,
}

impl StaffingLevels {
    /// Worker count of indicator `j`.
    pub fn level(&self, j: usize) -> i64 {
        self.first + j as i64
    }

    /// `Σ level · z`, equal to the worker count.
    pub fn count_expr(&self) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (j, &z) in self.indicators.iter().enumerate() {
            expr.add_term(z, self.level(j));
        }
        expr
    }

    /// Largest per-worker share, reached at the smallest admissible count.
    pub fn peak_share(&self) -> i64 {
        self.shares.iter().copied().max().unwrap_or(0)
    }

    /// `Σ share · z`, equal to the per-worker share at the chosen count.
    pub fn share_expr(&self) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (&z, &share) in self.indicators.iter().zip(&self.shares) {
            expr.add_term(z, share);
        }
        expr
    }

    /// Sum of the indicators whose per-worker share exceeds `threshold`.
    pub fn above(&self, threshold: i64) -> LinearExpr {
        LinearExpr::sum(
            self.indicators
                .iter()
                .zip(&self.shares)
                .filter(|(_, share)| **share > threshold)
                .map(|(&z, _)| z),
        )
    }
}

/// Adds occupation, coverage, and pair-splitting constraints.
pub(crate) fn add_occupation_constraints(cp: &mut CpModel, model: &AllocationModel, threshold: i64) {
    let vars = &model.vars;
    let workers = vars.assign.rows();
    let sequential = vars.occupation.cols();

    let mut paired = vec![false; sequential];
    for &(a, b) in &model.pairs {
        paired[a] = true;
        paired[b] = true;
    }

    for i in 0..workers {
        for s in 0..sequential {
            let occ = vars.occupation.at(i, s);
            let assigned = vars.assign.at(i, s);

            cp.add_linear(
                ConstraintTag::OccupationGate,
                LinearConstraint::le(
                    LinearExpr::new().with_term(occ, 1).with_term(assigned, -100),
                    0,
                ),
            );
            cp.add_implication(
                ConstraintTag::OccupationGate,
                assigned,
                LinearConstraint::ge(LinearExpr::sum([occ]), 1),
            );

            if !paired[s] {
                let mut gap = LinearExpr::new().with_term(occ, 1);
                gap.add_scaled(&vars.levels[s].share_expr(), -1);
                cp.add_linear(ConstraintTag::EvenShare, LinearConstraint::le(gap.clone(), 0));
                cp.add_implication(ConstraintTag::EvenShare, assigned, LinearConstraint::ge(gap, 0));
            }
        }

        if sequential > 0 {
            cp.add_linear(
                ConstraintTag::OccupationBudget,
                LinearConstraint::le(LinearExpr::sum(vars.occupation.row(i)), 100),
            );
        }

        for (p, &(a, b)) in model.pairs.iter().enumerate() {
            let split = vars.split.at(i, p);
            let occ_a = vars.occupation.at(i, a);
            let occ_b = vars.occupation.at(i, b);

            cp.add_linear(
                ConstraintTag::PairBudget,
                LinearConstraint::le(LinearExpr::sum([occ_a, occ_b]), 100),
            );

            for (task, occ) in [(a, occ_a), (b, occ_b)] {
                cp.add_implication(
                    ConstraintTag::SplitThreshold,
                    split,
                    LinearConstraint::le(LinearExpr::sum([occ]), threshold),
                );

                let over = vars.levels[task].above(threshold);
                if !over.is_empty() {
                    cp.add_implication(ConstraintTag::SplitShare, split, LinearConstraint::le(over, 0));
                }
            }
        }
    }

    for (s, short) in vars.shortfall.iter().enumerate() {
        let Some(short) = *short else { continue };
        let mut covered = LinearExpr::sum(vars.occupation.col(s));
        covered.add_term(short, 1);
        covered.add_scaled(&vars.levels[s].share_expr(), -1);
        cp.add_linear(ConstraintTag::Coverage, LinearConstraint::ge(covered, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(base: Minutes, multiplier: i32, bottleneck: Minutes) -> TaskLoad {
        TaskLoad::new(
            &SequentialTask::new("t", base).with_multiplier(multiplier),
            bottleneck,
        )
    }

    #[test]
    fn test_rate_floor() {
        // 2 × 5 minutes of work against a 5 minute cycle
        let l = load(Minutes::from_integer(5), 2, Minutes::from_integer(5));
        assert_eq!(l.rate_floor(), 2);
        assert!(!l.keeps_pace(1));
        assert!(l.keeps_pace(2));

        // 4.5 minutes against 4.5 fits exactly
        let l = load(Minutes::new(9, 2), 1, Minutes::new(9, 2));
        assert_eq!(l.rate_floor(), 1);
        assert!(l.keeps_pace(1));
    }

    #[test]
    fn test_rate_exact_boundary() {
        // 9.1 minutes against 4.55: exactly two workers
        let l = load(Minutes::new(91, 10), 1, Minutes::new(91, 20));
        assert_eq!(l.rate_floor(), 2);
        assert!(!l.keeps_pace(1));
    }

    #[test]
    fn test_share_points() {
        let l = load(Minutes::from_integer(6), 1, Minutes::from_integer(10));
        assert_eq!(l.share_points(1), 60);
        assert_eq!(l.share_points(2), 30);
        assert_eq!(l.share_points(0), 0);

        // 100/3 rounds up
        let l = load(Minutes::from_integer(1), 1, Minutes::from_integer(3));
        assert_eq!(l.share_points(1), 34);
        assert_eq!(l.share_points(3), 12);
    }

    #[test]
    fn test_levels_expressions() {
        let mut cp = CpModel::new("levels");
        let z2 = cp.add_binary("z2");
        let z3 = cp.add_binary("z3");
        let levels = StaffingLevels {
            first: 2,
            indicators: vec![z2, z3],
            shares: vec![60, 40],
        };

        assert_eq!(levels.level(1), 3);
        assert_eq!(levels.count_expr().evaluate(&[0, 1]), 3);
        assert_eq!(levels.share_expr().evaluate(&[1, 0]), 60);
        assert_eq!(levels.above(50).terms(), &[(z2, 1)]);
        assert!(levels.above(60).is_empty());
        assert_eq!(levels.peak_share(), 60);

        let empty = StaffingLevels {
            first: 3,
            indicators: Vec::new(),
            shares: Vec::new(),
        };
        assert_eq!(empty.peak_share(), 0);
    }
}
