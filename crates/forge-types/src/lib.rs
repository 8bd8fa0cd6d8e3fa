//! # forge-types
//!
//! Core domain types shared by every other `forge` crate: the target and
//! build model, the parameter table requirements are checked against, host
//! classification, and the engine's closed error taxonomy.
//!
//! This crate has no I/O of its own — it is the shared vocabulary the
//! planner, executor, host detector, and output sink are all built from.

/// Build aggregate: target arena, parameter table, derived name-lists.
pub mod build;
/// The engine's error taxonomy.
pub mod error;
/// Host classification (local vs. a known CI provider).
pub mod host;
/// Typed, build-declared parameter values.
pub mod params;
/// The end-of-run summary row type.
pub mod summary;
/// Target, dependency, condition, requirement, and action types.
pub mod target;
/// Fixture constructors for other crates' test suites (behind `test-support`).
#[cfg(feature = "test-support")]
pub mod test_support;

pub use build::{Build, DEFAULT_NAME};
pub use error::{Error, Result};
pub use host::Host;
pub use params::{ParameterKind, ParameterSpec, ParameterTable, ParameterValue};
pub use summary::TargetSummary;
pub use target::{Action, Condition, Requirement, RunContext, Target, TargetId, TargetStatus};
