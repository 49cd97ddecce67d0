//! Input validation for production lines.
//!
//! Checks structural integrity of a line before any decision variable is
//! created. Detects:
//! - Duplicate task, station, or worker names
//! - A missing bottleneck (no automated station)
//! - Non-positive times, counts, or multipliers
//! - An occupation threshold outside 0..=100
//! - Pairs and couplings referencing unknown tasks
//! - Pairs over non-sequential tasks or over a single task
//! - Time values too large for exact 64-bit constraint coefficients
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;
use std::fmt;

use crate::models::{ProductionLine, TaskKind};
use crate::time::Minutes;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same name.
    DuplicateName,
    /// The line has no automated station, so no bottleneck exists.
    MissingBottleneck,
    /// A base or cycle time is zero or negative.
    NonPositiveTime,
    /// A worker count or multiplier is below 1.
    InvalidCount,
    /// The occupation threshold is outside 0..=100.
    InvalidThreshold,
    /// A pair or coupling names a task that doesn't exist.
    UnknownTaskReference,
    /// A pair is not made of two distinct sequential tasks.
    InvalidPair,
    /// A coupling names the same task twice.
    InvalidCoupling,
    /// Exact constraint coefficients would overflow 64 bits.
    ValueOutOfRange,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a production line.
///
/// Checks:
/// 1. No duplicate manual task, automated station, or worker names
/// 2. At least one automated station
/// 3. Positive base and cycle times
/// 4. Minimum workers, multipliers, and fixed counts of at least 1
/// 5. Occupation threshold within 0..=100
/// 6. Pairs name two distinct, known, sequential tasks
/// 7. Couplings name two distinct, known tasks
/// 8. Rate and occupation coefficients fit in `i64`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_line(line: &ProductionLine) -> ValidationResult {
    let mut errors = Vec::new();

    check_names(line, &mut errors);

    if line.automated.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingBottleneck,
            "Line has no automated station to define the bottleneck cycle time",
        ));
    }
    for station in &line.automated {
        if station.cycle_time <= Minutes::from_integer(0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveTime,
                format!("Automated station '{}' has non-positive cycle time", station.name),
            ));
        }
    }

    for task in &line.sequential {
        if task.base_time <= Minutes::from_integer(0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveTime,
                format!("Task '{}' has non-positive base time", task.name),
            ));
        }
        if task.min_workers < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCount,
                format!("Task '{}' has minimum workers {} (< 1)", task.name, task.min_workers),
            ));
        }
        if task.multiplier < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCount,
                format!("Task '{}' has multiplier {} (< 1)", task.name, task.multiplier),
            ));
        }
    }
    for task in &line.non_sequential {
        if task.workers < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCount,
                format!("Task '{}' has fixed worker count {} (< 1)", task.name, task.workers),
            ));
        }
    }

    if !(0..=100).contains(&line.occupation_threshold) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidThreshold,
            format!(
                "Occupation threshold {} is outside 0..=100",
                line.occupation_threshold
            ),
        ));
    }

    check_pairs(line, &mut errors);
    check_couplings(line, &mut errors);

    // Magnitudes only mean something once times and counts are sane
    if errors.is_empty() {
        check_magnitudes(line, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_names(line: &ProductionLine, errors: &mut Vec<ValidationError>) {
    let mut task_names = HashSet::new();
    for name in line.task_names() {
        if !task_names.insert(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate task name: {name}"),
            ));
        }
    }

    let mut station_names = HashSet::new();
    for station in &line.automated {
        if !station_names.insert(station.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate automated station name: {}", station.name),
            ));
        }
    }

    let mut worker_names = HashSet::new();
    for worker in &line.workers {
        if !worker_names.insert(worker.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate worker name: {}", worker.name),
            ));
        }
    }
}

fn check_pairs(line: &ProductionLine, errors: &mut Vec<ValidationError>) {
    for (i, pair) in line.pairs.iter().enumerate() {
        let mut known = true;
        for name in [&pair.task_a, &pair.task_b] {
            match line.task_index(name).and_then(|idx| line.task_kind(idx)) {
                None => {
                    known = false;
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownTaskReference,
                        format!("Task pair references unknown task '{name}'"),
                    ));
                }
                Some(TaskKind::NonSequential) => {
                    known = false;
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidPair,
                        format!("Task pair references non-sequential task '{name}'"),
                    ));
                }
                Some(TaskKind::Sequential) => {}
            }
        }

        if known && pair.task_a == pair.task_b {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPair,
                format!("Task pair pairs '{}' with itself", pair.task_a),
            ));
        }

        if line.pairs[..i].iter().any(|p| p.same_tasks(pair)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPair,
                format!(
                    "Task pair ('{}', '{}') is declared twice",
                    pair.task_a, pair.task_b
                ),
            ));
        }
    }
}

fn check_couplings(line: &ProductionLine, errors: &mut Vec<ValidationError>) {
    for coupling in &line.couplings {
        for name in [&coupling.task_a, &coupling.task_b] {
            if line.task_index(name).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTaskReference,
                    format!("Coupling references unknown task '{name}'"),
                ));
            }
        }
        if coupling.task_a == coupling.task_b {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCoupling,
                format!("Coupling couples '{}' with itself", coupling.task_a),
            ));
        }
    }
}

/// Every rate and occupation coefficient is a product of a few numerators and
/// denominators; keep them inside `i64`.
fn check_magnitudes(line: &ProductionLine, errors: &mut Vec<ValidationError>) {
    let Some(t) = line.bottleneck() else {
        return;
    };
    let workers = line.worker_count().max(1) as i128;
    let limit = i64::MAX as i128;

    for task in &line.sequential {
        let load = 100
            * i128::from(task.multiplier)
            * i128::from(*task.base_time.numer())
            * i128::from(*t.denom());
        let capacity = workers * i128::from(*t.numer()) * i128::from(*task.base_time.denom());
        if load > limit || capacity > limit {
            errors.push(ValidationError::new(
                ValidationErrorKind::ValueOutOfRange,
                format!(
                    "Task '{}' times are too finely grained for exact constraints",
                    task.name
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AutomatedTask, Coupling, FixedTask, SequentialTask, TaskPair, Worker};

    fn sample_line() -> ProductionLine {
        ProductionLine::new()
            .with_automated(AutomatedTask::new("Laminator", Minutes::from_integer(18)))
            .with_sequential(SequentialTask::new("Wash Glass", Minutes::new(1, 2)))
            .with_sequential(SequentialTask::new("Lay EVA", Minutes::from_integer(6)))
            .with_fixed(FixedTask::new("Operate Lay-up Machine").exempt_from_cap())
            .with_worker(Worker::new("Arben").with_skills(["Wash Glass", "Lay EVA"]))
            .with_pair(TaskPair::new("Wash Glass", "Lay EVA"))
            .with_coupling(Coupling::new("Lay EVA", "Operate Lay-up Machine"))
    }

    fn kinds(line: &ProductionLine) -> Vec<ValidationErrorKind> {
        validate_line(line)
            .unwrap_err()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_line() {
        assert!(validate_line(&sample_line()).is_ok());
    }

    #[test]
    fn test_duplicate_names() {
        let line = sample_line()
            .with_sequential(SequentialTask::new("Lay EVA", Minutes::from_integer(1)))
            .with_worker(Worker::new("Arben"));
        let errors = validate_line(&line).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::DuplicateName)
                .count(),
            2
        );
        assert!(errors.iter().any(|e| e.message.contains("worker")));
    }

    #[test]
    fn test_missing_bottleneck() {
        let mut line = sample_line();
        line.automated.clear();
        assert!(kinds(&line).contains(&ValidationErrorKind::MissingBottleneck));
    }

    #[test]
    fn test_non_positive_times() {
        let line = sample_line()
            .with_sequential(SequentialTask::new("Closing", Minutes::from_integer(0)))
            .with_automated(AutomatedTask::new("Bussing", Minutes::from_integer(-1)));
        let found = kinds(&line);
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::NonPositiveTime)
                .count(),
            2
        );
    }

    #[test]
    fn test_invalid_counts() {
        let line = sample_line()
            .with_sequential(
                SequentialTask::new("Closing", Minutes::from_integer(9))
                    .with_min_workers(0)
                    .with_multiplier(-2),
            )
            .with_fixed(FixedTask::new("Stringing").with_workers(0));
        let found = kinds(&line);
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::InvalidCount)
                .count(),
            3
        );
    }

    #[test]
    fn test_threshold_range() {
        assert!(validate_line(&sample_line().with_occupation_threshold(0)).is_ok());
        assert!(validate_line(&sample_line().with_occupation_threshold(100)).is_ok());
        assert!(kinds(&sample_line().with_occupation_threshold(101))
            .contains(&ValidationErrorKind::InvalidThreshold));
        assert!(kinds(&sample_line().with_occupation_threshold(-1))
            .contains(&ValidationErrorKind::InvalidThreshold));
    }

    #[test]
    fn test_pair_unknown_task() {
        let line = sample_line().with_pair(TaskPair::new("Lay EVA", "Polish"));
        assert!(kinds(&line).contains(&ValidationErrorKind::UnknownTaskReference));
    }

    #[test]
    fn test_pair_non_sequential_task() {
        let line = sample_line().with_pair(TaskPair::new("Lay EVA", "Operate Lay-up Machine"));
        assert!(kinds(&line).contains(&ValidationErrorKind::InvalidPair));
    }

    #[test]
    fn test_pair_with_itself_and_twice() {
        let line = sample_line()
            .with_pair(TaskPair::new("Lay EVA", "Lay EVA"))
            .with_pair(TaskPair::new("Lay EVA", "Wash Glass"));
        let errors = validate_line(&line).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("itself")));
        assert!(errors.iter().any(|e| e.message.contains("twice")));
    }

    #[test]
    fn test_coupling_checks() {
        let line = sample_line()
            .with_coupling(Coupling::new("Lay EVA", "Nowhere"))
            .with_coupling(Coupling::new("Lay EVA", "Lay EVA"));
        let found = kinds(&line);
        assert!(found.contains(&ValidationErrorKind::UnknownTaskReference));
        assert!(found.contains(&ValidationErrorKind::InvalidCoupling));
    }

    #[test]
    fn test_value_out_of_range() {
        let line = sample_line().with_sequential(SequentialTask::new(
            "Closing",
            Minutes::new(i64::MAX / 7, 1),
        ));
        assert!(kinds(&line).contains(&ValidationErrorKind::ValueOutOfRange));
    }

    #[test]
    fn test_multiple_errors() {
        let line = ProductionLine::new()
            .with_sequential(SequentialTask::new("A", Minutes::from_integer(1)).with_min_workers(0))
            .with_pair(TaskPair::new("A", "B"));
        let errors = validate_line(&line).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
