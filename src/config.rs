//! Line configuration and solve options.
//!
//! A line is described by a JSON document:
//!
//! ```json
//! {
//!   "sequentialTasks": [{ "name": "Wash Glass", "baseTime": "0.5", "multiplier": 2 }],
//!   "nonSequentialTasks": [{ "name": "Stringing", "fixedWorkerCount": 1 }],
//!   "automatedTasks": [{ "name": "Laminator", "cycleTime": "18" }],
//!   "workers": [{ "name": "Arben", "skills": ["Wash Glass"], "preferred": true }],
//!   "taskPairs": [],
//!   "couplings": [],
//!   "occupationThreshold": 50
//! }
//! ```
//!
//! Times are decimal strings so they reach the model without passing through
//! a binary float.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::ObjectiveStrategy;
use crate::error::{AllocationError, ConfigError};
use crate::models::{
    AutomatedTask, Coupling, FixedTask, ProductionLine, SequentialTask, TaskPair, Worker,
    DEFAULT_OCCUPATION_THRESHOLD,
};
use crate::time::parse_minutes;

/// Environment variable holding the solve deadline in seconds.
pub const TIME_LIMIT_ENV: &str = "STAFFING_TIME_LIMIT_SECS";
/// Environment variable selecting the objective strategy.
pub const OBJECTIVE_ENV: &str = "STAFFING_OBJECTIVE";

/// JSON description of a production line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    #[serde(default)]
    pub sequential_tasks: Vec<SequentialTaskConfig>,
    #[serde(default)]
    pub non_sequential_tasks: Vec<FixedTaskConfig>,
    #[serde(default)]
    pub automated_tasks: Vec<AutomatedTaskConfig>,
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,
    #[serde(default)]
    pub task_pairs: Vec<TaskRefConfig>,
    #[serde(default)]
    pub couplings: Vec<TaskRefConfig>,
    #[serde(default = "default_threshold")]
    pub occupation_threshold: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialTaskConfig {
    pub name: String,
    pub base_time: String,
    #[serde(default = "one")]
    pub minimum_workers: i32,
    #[serde(default = "one")]
    pub multiplier: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedTaskConfig {
    pub name: String,
    #[serde(default = "one")]
    pub fixed_worker_count: i32,
    #[serde(default)]
    pub exempt_from_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedTaskConfig {
    pub name: String,
    pub cycle_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferred: bool,
}

/// Two task names (pair or coupling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRefConfig {
    pub task_a: String,
    pub task_b: String,
}

fn one() -> i32 {
    1
}

fn default_threshold() -> i32 {
    DEFAULT_OCCUPATION_THRESHOLD
}

impl LineConfig {
    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Converts the configuration into a production line.
    ///
    /// # Errors
    /// `InvalidTimeFormat` if a base or cycle time is not a finite decimal.
    /// Structural problems are left to model validation.
    pub fn into_problem(self) -> Result<ProductionLine, AllocationError> {
        let mut line = ProductionLine::new().with_occupation_threshold(self.occupation_threshold);

        for task in self.sequential_tasks {
            line = line.with_sequential(
                SequentialTask::new(task.name, parse_minutes(&task.base_time)?)
                    .with_min_workers(task.minimum_workers)
                    .with_multiplier(task.multiplier),
            );
        }
        for task in self.non_sequential_tasks {
            let mut fixed = FixedTask::new(task.name).with_workers(task.fixed_worker_count);
            if task.exempt_from_cap {
                fixed = fixed.exempt_from_cap();
            }
            line = line.with_fixed(fixed);
        }
        for station in self.automated_tasks {
            line = line.with_automated(AutomatedTask::new(
                station.name,
                parse_minutes(&station.cycle_time)?,
            ));
        }
        for worker in self.workers {
            let mut w = Worker::new(worker.name).with_skills(worker.skills);
            if worker.preferred {
                w = w.preferred();
            }
            line = line.with_worker(w);
        }
        for pair in self.task_pairs {
            line = line.with_pair(TaskPair::new(pair.task_a, pair.task_b));
        }
        for coupling in self.couplings {
            line = line.with_coupling(Coupling::new(coupling.task_a, coupling.task_b));
        }

        Ok(line)
    }
}

/// Options for one allocation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Wall-clock limit for the whole run (all stages). `None` waits forever.
    pub time_limit: Option<Duration>,
    /// How objective levels are combined.
    pub strategy: ObjectiveStrategy,
}

impl SolveOptions {
    /// Default options: no deadline, weighted objective.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deadline.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the objective strategy.
    pub fn with_strategy(mut self, strategy: ObjectiveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Reads options from `STAFFING_TIME_LIMIT_SECS` and `STAFFING_OBJECTIVE`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(raw) = lookup(TIME_LIMIT_ENV) {
            let secs: f64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(TIME_LIMIT_ENV.into(), raw.clone()))?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::InvalidValue(TIME_LIMIT_ENV.into(), raw));
            }
            options.time_limit = Some(Duration::from_secs_f64(secs));
        }

        if let Some(raw) = lookup(OBJECTIVE_ENV) {
            options.strategy = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue(OBJECTIVE_ENV.into(), raw.clone()))?;
        }

        Ok(options)
    }
}
