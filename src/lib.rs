//! Production-line staffing for the U-Engine ecosystem.
//!
//! Allocates a pool of skilled workers to the manual stations of a production
//! line so that every station keeps pace with the slowest automated machine,
//! using as few workers as possible and favoring preferred ones.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `SequentialTask`, `FixedTask`,
//!   `AutomatedTask`, `Worker`, `TaskPair`, `Coupling`, `ProductionLine`,
//!   `AllocationReport`
//! - **`validation`**: Structural checks (duplicate names, dangling
//!   references, invalid counts, coefficient range)
//! - **`time`**: Exact decimal-to-rational time parsing
//! - **`cp`**: Integer model construction, objective composition, and the
//!   solver seam (`CpSolver`, `MicroLpSolver`)
//! - **`allocator`**: The end-to-end `LineAllocator`, report audit, and KPIs
//! - **`config`**: JSON line configuration and solve options
//!
//! # Example
//!
//! ```
//! use u_staffing::allocator::LineAllocator;
//! use u_staffing::config::LineConfig;
//!
//! let json = r#"{
//!     "sequentialTasks": [{ "name": "Closing", "baseTime": "9.0", "minimumWorkers": 2 }],
//!     "automatedTasks": [{ "name": "Laminator", "cycleTime": "18.0" }],
//!     "workers": [
//!         { "name": "Arben", "skills": ["Closing"], "preferred": true },
//!         { "name": "Jamil", "skills": ["Closing"] },
//!         { "name": "Fazli", "skills": ["Closing"] }
//!     ]
//! }"#;
//!
//! let line = LineConfig::from_json(json).unwrap().into_problem().unwrap();
//! let report = LineAllocator::new().allocate(&line).unwrap();
//! assert_eq!(report.total_workers_used, 2);
//! assert!(report.worker("Arben").unwrap().used);
//! ```
//!
//! # References
//!
//! - Boysen, Fliedner & Scholl (2008), "Assembly line balancing: Which model
//!   to use when?"
//! - Becker & Scholl (2006), "A survey on problems and methods in generalized
//!   assembly line balancing"

pub mod allocator;
pub mod config;
pub mod cp;
pub mod error;
pub mod models;
pub mod time;
pub mod validation;

pub use error::{AllocationError, ConfigError};
