//! Error types for the entire engine.
//!
//! We use `thiserror` for library-style errors with one enum per
//! subsystem. Configuration errors abort the operation that received
//! them; data-quality recoveries are logged warnings, and expected
//! absence (nothing to discretize, empty group cell) is represented by
//! empty results, never by these types.

use thiserror::Error;

/// Errors raised while constructing a measurement profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("interval {index} is empty: y_low {y_low} >= y_sup {y_sup}")]
    EmptyInterval { index: usize, y_low: f64, y_sup: f64 },

    #[error("intervals {first} and {second} overlap")]
    OverlappingIntervals { first: usize, second: usize },

    #[error("duplicate depth point at {0}")]
    DuplicatePoint(f64),

    #[error("non-finite depth coordinate at sample {0}")]
    NonFiniteDepth(usize),

    #[error("rows for core {core_id} variable {variable} mix step and continuous samples")]
    MixedRepresentation { core_id: String, variable: String },
}

/// Errors raised while constructing a target grid
#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid needs at least {expected} edges, got {actual}")]
    TooFewEdges { expected: usize, actual: usize },

    #[error("grid edges are not strictly monotonic at index {0}")]
    NotMonotonic(usize),

    #[error("non-finite grid edge at index {0}")]
    NonFiniteEdge(usize),

    #[error("grid step must be positive, got {0}")]
    NonPositiveStep(f64),
}

/// Errors raised while assembling a core stack
#[derive(Error, Debug)]
pub enum StackError {
    #[error("profile for core {core_id} variable {variable} already present; remove it first")]
    DuplicateProfile { core_id: String, variable: String },
}

/// Errors raised while configuring a grouped aggregation
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("unsupported statistic: {0}")]
    UnsupportedStatistic(String),

    #[error("no statistics requested")]
    NoStatistics,

    #[error("no variables requested")]
    NoVariables,

    #[error("duplicate covariate axis: {0}")]
    DuplicateAxis(String),
}
