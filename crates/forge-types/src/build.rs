use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::params::{ParameterSpec, ParameterTable};
use crate::target::{Target, TargetId};

/// The reserved name that resolves to whichever target is flagged default.
/// Never a legal real target name.
pub const DEFAULT_NAME: &str = "default";

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// An aggregate owning the target set and user-supplied parameters for one
/// invocation of the engine.
///
/// Targets are declared once (via `forge_core::TargetSetBuilder`) and are
/// immutable thereafter except for the three derived name-lists and each
/// target's own `status`/`duration`, which only the executor and planner
/// touch.
pub struct Build {
    targets: Vec<Target>,
    by_name: HashMap<String, TargetId>,
    default_target: Option<TargetId>,
    parameters: ParameterTable,
    parameter_specs: Vec<ParameterSpec>,
    invoked: Vec<String>,
    skipped: Vec<String>,
    executing: Vec<String>,
}

impl Build {
    /// Assembles a build directly from a fully-resolved target arena.
    /// `forge_core::TargetSetBuilder::build` is the sanctioned entry point;
    /// this exists for that builder (and other crates' test fixtures) to
    /// call into.
    pub fn new(
        targets: Vec<Target>,
        by_name: HashMap<String, TargetId>,
        default_target: Option<TargetId>,
        parameters: ParameterTable,
    ) -> Self {
        Self {
            targets,
            by_name,
            default_target,
            parameters,
            parameter_specs: Vec::new(),
            invoked: Vec::new(),
            skipped: Vec::new(),
            executing: Vec::new(),
        }
    }

    /// Declares the parameters this build understands (name, kind, help
    /// text). Published by `forge_core::TargetSetBuilder::build` after
    /// `Build::new`, separately from the constructor so existing call
    /// sites that have no specs to declare don't need to pass an empty
    /// `Vec` through.
    pub fn set_parameter_specs(&mut self, specs: Vec<ParameterSpec>) {
        self.parameter_specs = specs;
    }

    pub fn parameter_specs(&self) -> &[ParameterSpec] {
        &self.parameter_specs
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    pub fn target_mut(&mut self, id: TargetId) -> &mut Target {
        &mut self.targets[id.0]
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterTable {
        &mut self.parameters
    }

    pub fn default_target(&self) -> Option<TargetId> {
        self.default_target
    }

    /// Resolves a user-supplied name (case-insensitive) to a `TargetId`.
    /// `"default"` resolves to the declared default target.
    pub fn resolve(&self, name: &str) -> Result<TargetId> {
        if normalize(name) == DEFAULT_NAME {
            return self.default_target.ok_or_else(|| {
                Error::planning("no default target is declared for this build")
            });
        }
        self.by_name.get(&normalize(name)).copied().ok_or_else(|| {
            let available = self.available_names().join(", ");
            Error::planning(format!(
                "unknown target '{name}'; available targets: {available}"
            ))
        })
    }

    pub fn available_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn invoked_names(&self) -> &[String] {
        &self.invoked
    }

    pub fn skipped_names(&self) -> &[String] {
        &self.skipped
    }

    pub fn executing_names(&self) -> &[String] {
        &self.executing
    }

    /// Published by the planner after it computes the execution list.
    pub fn set_name_lists(&mut self, invoked: Vec<String>, skipped: Vec<String>, executing: Vec<String>) {
        self.invoked = invoked;
        self.skipped = skipped;
        self.executing = executing;
    }
}
