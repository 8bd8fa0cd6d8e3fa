//! Fixture constructors used by other `forge-*` crates' test suites. Not
//! part of the crate's normal API surface; enabled only via the
//! `test-support` feature, which dependents turn on for `dev-dependencies`.

use crate::target::{Target, TargetId};

/// A target with no conditions, requirements, or actions, wired to the
/// given dependency ids.
pub fn target_with_deps(name: &str, dependencies: Vec<TargetId>) -> Target {
    Target::new(name, false, dependencies, Vec::new(), Vec::new(), Vec::new())
}
