//! Objective composition.
//!
//! Allocation quality has three ordered levels:
//!
//! | Level | Expression | Meaning |
//! |-------|------------|---------|
//! | Headcount | `Σ used` | distinct workers on the line |
//! | Shortfall | `Σ short` | uncovered occupation on paired tasks |
//! | Preference | `Σ used` over non-preferred workers | crew stability |
//!
//! A lower level may only break ties of every level above it. Two strategies
//! enforce that ordering:
//! - **Weighted**: one solve of `Σ wₖ · levelₖ`, with weights chosen so that
//!   one unit of a higher level outweighs the largest possible value of all
//!   lower levels combined (`w_last = 1`, `wₖ = 1 + Σ_{j>k} wⱼ · maxⱼ`).
//! - **Lexicographic**: one solve per level, each pinning the optimum of the
//!   levels before it.
//!
//! # Reference
//! Ehrgott (2005), "Multicriteria Optimization", Ch. 5: Lexicographic Optimality

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::LinearExpr;
use super::AllocationModel;
use crate::error::AllocationError;
use crate::models::ProductionLine;
use crate::validation::{ValidationError, ValidationErrorKind};

/// How the objective levels are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveStrategy {
    /// Single solve over a dominance-weighted sum.
    #[default]
    Weighted,
    /// One solve per level.
    Lexicographic,
}

impl fmt::Display for ObjectiveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

impl FromStr for ObjectiveStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "lexicographic" | "lex" => Ok(Self::Lexicographic),
            other => Err(format!("unknown objective strategy '{other}'")),
        }
    }
}

/// Objective level kinds, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    Headcount,
    Shortfall,
    Preference,
}

/// One level of the objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveLevel {
    /// Which quantity the level measures.
    pub kind: ObjectiveKind,
    /// Expression to minimize.
    pub expr: LinearExpr,
    /// Largest value the expression can take.
    pub max_value: i64,
}

/// Ordered objective levels of an allocation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectivePlan {
    levels: Vec<ObjectiveLevel>,
}

/// Builds the objective levels of an allocation model.
pub struct ObjectiveComposer;

impl ObjectiveComposer {
    /// Composes the levels for `model`, built from `line`.
    ///
    /// The shortfall level exists only when the line declares pairs, and the
    /// preference level only when some worker is not preferred.
    pub fn compose(model: &AllocationModel, line: &ProductionLine) -> ObjectivePlan {
        let vars = model.vars();
        let mut levels = Vec::with_capacity(3);

        levels.push(ObjectiveLevel {
            kind: ObjectiveKind::Headcount,
            expr: LinearExpr::sum(vars.used.iter().copied()),
            max_value: vars.used.len() as i64,
        });

        let shortfalls: Vec<_> = vars
            .shortfall
            .iter()
            .enumerate()
            .filter_map(|(s, v)| v.map(|v| (s, v)))
            .collect();
        if !shortfalls.is_empty() {
            levels.push(ObjectiveLevel {
                kind: ObjectiveKind::Shortfall,
                expr: LinearExpr::sum(shortfalls.iter().map(|&(_, v)| v)),
                max_value: shortfalls
                    .iter()
                    .map(|&(s, _)| vars.levels[s].peak_share())
                    .fold(0i64, i64::saturating_add),
            });
        }

        let others: Vec<_> = line
            .workers
            .iter()
            .zip(&vars.used)
            .filter(|(w, _)| !w.preferred)
            .map(|(_, &u)| u)
            .collect();
        if !others.is_empty() {
            levels.push(ObjectiveLevel {
                kind: ObjectiveKind::Preference,
                max_value: others.len() as i64,
                expr: LinearExpr::sum(others),
            });
        }

        ObjectivePlan { levels }
    }
}

impl ObjectivePlan {
    /// Levels in priority order.
    pub fn levels(&self) -> &[ObjectiveLevel] {
        &self.levels
    }

    /// Level of a given kind, if present.
    pub fn level(&self, kind: ObjectiveKind) -> Option<&ObjectiveLevel> {
        self.levels.iter().find(|l| l.kind == kind)
    }

    /// Dominance weights, one per level.
    ///
    /// Fails if a weight does not fit in `i64`.
    pub fn weights(&self) -> Result<Vec<i64>, AllocationError> {
        let mut weights = vec![0i64; self.levels.len()];
        let mut tail: i64 = 0;

        for (k, level) in self.levels.iter().enumerate().rev() {
            let w = tail.checked_add(1).ok_or_else(weight_overflow)?;
            weights[k] = w;
            let contribution = w.checked_mul(level.max_value).ok_or_else(weight_overflow)?;
            tail = tail.checked_add(contribution).ok_or_else(weight_overflow)?;
        }

        Ok(weights)
    }

    /// Weighted sum of every level.
    pub fn weighted(&self) -> Result<LinearExpr, AllocationError> {
        let weights = self.weights()?;
        let mut expr = LinearExpr::new();
        for (level, w) in self.levels.iter().zip(weights) {
            expr.add_scaled(&level.expr, w);
        }
        Ok(expr)
    }

    /// Whether `weights` let every level dominate all levels below it.
    pub fn dominates(&self, weights: &[i64]) -> bool {
        if weights.len() != self.levels.len() {
            return false;
        }
        (0..self.levels.len()).all(|k| {
            let below: i128 = self.levels[k + 1..]
                .iter()
                .zip(&weights[k + 1..])
                .map(|(l, &w)| i128::from(w) * i128::from(l.max_value))
                .sum();
            i128::from(weights[k]) > below
        })
    }
}

fn weight_overflow() -> AllocationError {
    AllocationError::InvalidModelSpec(vec![ValidationError::new(
        ValidationErrorKind::ValueOutOfRange,
        "Objective weights exceed 64-bit range",
    )])
}
