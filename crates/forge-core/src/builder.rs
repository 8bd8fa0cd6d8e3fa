use std::collections::HashMap;

use forge_types::{
    Build, Condition, Error, ParameterKind, ParameterSpec, ParameterTable, Requirement, Result, RunContext, Target,
    TargetId, DEFAULT_NAME,
};

struct TargetSpec {
    name: String,
    is_default: bool,
    dependency_names: Vec<String>,
    conditions: Vec<Condition>,
    requirements: Vec<Requirement>,
    actions: Vec<forge_types::Action>,
}

/// Explicit target registration. One `TargetSetBuilder` describes an entire
/// build; call `.target(name)` once per target, then `.build(parameters)`
/// once every target and its dependency edges are declared.
#[derive(Default)]
pub struct TargetSetBuilder {
    specs: Vec<TargetSpec>,
    by_name: HashMap<String, usize>,
    parameter_specs: Vec<ParameterSpec>,
}

impl TargetSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a parameter the build understands, independent of any
    /// target requiring it: `name`, the kind raw text should parse as, and
    /// help text `forge-cli --help` prints alongside the target list.
    pub fn parameter(&mut self, name: &str, kind: ParameterKind, help: &str) -> &mut Self {
        self.parameter_specs.push(ParameterSpec {
            name: name.to_string(),
            kind,
            help: help.to_string(),
        });
        self
    }

    /// Declares a new target. Errors if `name` collides (case-insensitively)
    /// with an existing target or with the reserved name `"default"`.
    pub fn target(&mut self, name: &str) -> Result<TargetBuilder<'_>> {
        let normalized = name.to_ascii_lowercase();
        if normalized == DEFAULT_NAME {
            return Err(Error::configuration(format!(
                "'{name}' is reserved and cannot be used as a target name"
            )));
        }
        if self.by_name.contains_key(&normalized) {
            return Err(Error::configuration(format!("duplicate target name '{name}'")));
        }

        let idx = self.specs.len();
        self.specs.push(TargetSpec {
            name: name.to_string(),
            is_default: false,
            dependency_names: Vec::new(),
            conditions: Vec::new(),
            requirements: Vec::new(),
            actions: Vec::new(),
        });
        self.by_name.insert(normalized, idx);
        Ok(TargetBuilder { parent: self, idx })
    }

    /// Resolves every declared dependency name and assembles the `Build`.
    /// Errors on an unknown dependency name or more than one target marked
    /// default.
    pub fn build(self, parameters: ParameterTable) -> Result<Build> {
        let mut default_target: Option<TargetId> = None;

        for spec in &self.specs {
            if spec.is_default {
                if default_target.is_some() {
                    return Err(Error::configuration(
                        "more than one target is marked as the default",
                    ));
                }
                default_target = Some(TargetId(self.by_name[&spec.name.to_ascii_lowercase()]));
            }
        }

        let mut targets = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            let mut dependencies = Vec::with_capacity(spec.dependency_names.len());
            for dep_name in &spec.dependency_names {
                let normalized = dep_name.to_ascii_lowercase();
                let id = self.by_name.get(&normalized).copied().ok_or_else(|| {
                    Error::configuration(format!(
                        "target '{}' depends on unknown target '{dep_name}'",
                        spec.name
                    ))
                })?;
                dependencies.push(TargetId(id));
            }

            targets.push(Target::new(
                spec.name,
                spec.is_default,
                dependencies,
                spec.conditions,
                spec.requirements,
                spec.actions,
            ));
        }

        let by_name = self
            .by_name
            .into_iter()
            .map(|(name, idx)| (name, TargetId(idx)))
            .collect();

        let mut build = Build::new(targets, by_name, default_target, parameters);
        build.set_parameter_specs(self.parameter_specs);
        Ok(build)
    }
}

/// Fluent editor for the target just declared with `TargetSetBuilder::target`.
pub struct TargetBuilder<'a> {
    parent: &'a mut TargetSetBuilder,
    idx: usize,
}

impl<'a> TargetBuilder<'a> {
    fn spec(&mut self) -> &mut TargetSpec {
        &mut self.parent.specs[self.idx]
    }

    pub fn depends_on(mut self, names: &[&str]) -> Self {
        self.spec().dependency_names.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn requires(mut self, parameter: &str) -> Self {
        self.spec().requirements.push(Requirement {
            parameter: parameter.to_string(),
        });
        self
    }

    pub fn only_when(mut self, condition: impl Fn() -> Result<bool> + Send + 'static) -> Self {
        self.spec().conditions.push(Box::new(condition));
        self
    }

    pub fn executes(mut self, action: impl FnMut(&RunContext<'_>) -> Result<()> + Send + 'static) -> Self {
        self.spec().actions.push(Box::new(action));
        self
    }

    pub fn default_target(mut self) -> Self {
        self.spec().is_default = true;
        self
    }
}
