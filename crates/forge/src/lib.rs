//! # forge
//!
//! A dependency-graph target execution engine: declare named targets with
//! dependencies, conditions, requirements, and actions, then let `forge` work
//! out what needs to run and in what order.
//!
//! ## Pipeline
//!
//! The core flow is **register → plan → validate → execute**:
//!
//! 1. [`core::TargetSetBuilder`] registers every target and resolves
//!    dependency names into a [`types::Build`].
//! 2. [`plan::plan`] computes the dependency closure of the requested
//!    targets and topologically sorts it.
//! 3. [`core::validate_requirements`] checks every target about to run
//!    against the build's bound parameters.
//! 4. [`core::execute`] runs the ordered list, writing progress to a
//!    [`sink::Sink`] chosen from the detected [`host::Host`].
//!
//! ## Modules
//!
//! - [`types`] — target/build domain model and the error taxonomy
//! - [`host`] — CI provider detection and typed environment views
//! - [`sink`] — console and CI-native output
//! - [`process`] — subprocess execution with streaming output and timeouts
//! - [`plan`] — dependency-closure planning and topological ordering
//! - [`core`] — target registration, requirement validation, execution
//! - [`DemoBuild`] — a minimal build definition the `forge` CLI runs by
//!   default; a template for embedders to replace with their own
//!
//! ## Embedding
//!
//! `forge` has no project file format of its own. A build is Rust code: a
//! [`BuildDefinition`] implementation registers targets on a
//! [`core::TargetSetBuilder`], and a small binary crate (see `forge-cli`)
//! wires it into [`run`].

pub use forge_core as core;
pub use forge_host as host;
pub use forge_plan as plan;
pub use forge_process as process;
pub use forge_sink as sink;
pub use forge_types as types;

mod demo_build;
mod run;

pub use demo_build::DemoBuild;
pub use run::{run, BuildDefinition, RunRequest};
