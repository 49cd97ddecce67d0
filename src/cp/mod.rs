//! Constraint-based staffing formulation.
//!
//! Builds an integer model of a production line (assignment, rate, skill,
//! cap, coupling, and occupation constraints), composes its ordered
//! objective, and solves it through a [`CpSolver`] backend.
//!
//! All coefficients are exact integers derived from rational times; no
//! floating-point value takes part in feasibility.
//!
//! # Reference
//! - Becker & Scholl (2006), "A survey on problems and methods in generalized
//!   assembly line balancing", EJOR 168(3)
//! - Williams (2013), "Model Building in Mathematical Programming"

mod builder;
pub mod model;
mod objective;
mod sharing;
mod solver;

pub use builder::{AllocationModel, AllocationModelBuilder, ModelVars};
pub use model::{ConstraintTag, CpModel, LinearConstraint, LinearExpr, VarId};
pub use objective::{ObjectiveComposer, ObjectiveKind, ObjectiveLevel, ObjectivePlan, ObjectiveStrategy};
pub use sharing::{StaffingLevels, TaskLoad};
pub use solver::{solve_with_deadline, CpSolution, CpSolver, MicroLpSolver, SolverOutcome};
