//! Production line domain models.
//!
//! Provides the catalog types describing a line to staff and the report type
//! describing a solved allocation.
//!
//! # Domain Mappings
//!
//! | u-staffing | Solar panel line | Assembly line |
//! |------------|------------------|---------------|
//! | SequentialTask | Wash Glass, Lay EVA | Station work element |
//! | FixedTask | Stringing, Operate Laminator | Machine tending |
//! | AutomatedTask | Laminator | Paced conveyor / robot cell |
//! | Worker | Operator | Operator |
//! | AllocationReport | Shift crew plan | Station staffing plan |

mod line;
mod relation;
mod report;
mod task;
mod worker;

pub use line::{ProductionLine, DEFAULT_OCCUPATION_THRESHOLD};
pub use relation::{Coupling, TaskPair};
pub use report::{
    AllocationReport, BottleneckTime, SolveStatus, TaskStaffing, Violation, ViolationType,
    WorkerShare, WorkerUsage,
};
pub use task::{AutomatedTask, FixedTask, SequentialTask, TaskKind};
pub use worker::Worker;
