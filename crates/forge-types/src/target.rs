use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::params::ParameterTable;

/// An index into the owning `Build`'s target arena.
///
/// This is how a target "depends on" another without owning it: the
/// dependency is just an index, so dropping or mutating a `Target` can
/// never dangle or duplicate another target's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub usize);

/// A nullary predicate evaluated lazily at execution time. Returning `Err`
/// is treated as a target failure rather than a panic.
pub type Condition = Box<dyn Fn() -> Result<bool> + Send>;

/// What an action body sees at run time: the bound parameter table, read
/// only. Replaces a process-wide "current build" singleton (the engine
/// never exposes one) with a value threaded explicitly into each call.
pub struct RunContext<'a> {
    parameters: &'a ParameterTable,
}

impl<'a> RunContext<'a> {
    pub fn new(parameters: &'a ParameterTable) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &ParameterTable {
        self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&crate::params::ParameterValue> {
        self.parameters.get(name)
    }
}

/// A side-effecting step in a target's action body, given a read-only view
/// of the run's bound parameters.
pub type Action = Box<dyn FnMut(&RunContext<'_>) -> Result<()> + Send>;

/// A declared pre-condition: `parameter` must resolve to a non-empty,
/// non-zero, non-false value in the build's `ParameterTable` by the time
/// this target is about to run.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub parameter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetStatus {
    /// Never reached by the executor in this run (also the initial value).
    #[default]
    NotRun,
    /// Had no action body.
    Absent,
    /// A condition evaluated false.
    Skipped,
    /// Ran its action list to completion.
    Executed,
    /// An action (or condition) raised an error.
    Failed,
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetStatus::NotRun => "NotRun",
            TargetStatus::Absent => "Absent",
            TargetStatus::Skipped => "Skipped",
            TargetStatus::Executed => "Executed",
            TargetStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// A named, addressable unit of build work.
pub struct Target {
    pub(crate) name: String,
    pub(crate) is_default: bool,
    pub(crate) dependencies: Vec<TargetId>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) requirements: Vec<Requirement>,
    pub(crate) actions: Vec<Action>,
    pub(crate) status: TargetStatus,
    pub(crate) duration: Duration,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("is_default", &self.is_default)
            .field("dependencies", &self.dependencies)
            .field("conditions", &self.conditions.len())
            .field("requirements", &self.requirements)
            .field("actions", &self.actions.len())
            .field("status", &self.status)
            .field("duration", &self.duration)
            .finish()
    }
}

impl Target {
    /// Assembles a target directly. `forge_core::TargetSetBuilder` is the
    /// sanctioned way to build a whole target set; this exists for that
    /// builder (and other crates' fixtures) to call into.
    pub fn new(
        name: impl Into<String>,
        is_default: bool,
        dependencies: Vec<TargetId>,
        conditions: Vec<Condition>,
        requirements: Vec<Requirement>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            name: name.into(),
            is_default,
            dependencies,
            conditions,
            requirements,
            actions,
            status: TargetStatus::default(),
            duration: Duration::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn dependencies(&self) -> &[TargetId] {
        &self.dependencies
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Evaluates every condition in order. Returns `Ok(false)` on the first
    /// false predicate (short-circuit), `Ok(true)` if all pass, or the
    /// condition's `Err` if one raised.
    pub fn evaluate_conditions(&self) -> Result<bool> {
        for cond in &self.conditions {
            if !cond()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs the action list in declaration order, stopping at the first
    /// error.
    pub fn run_actions(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        for action in &mut self.actions {
            action(ctx)?;
        }
        Ok(())
    }

    /// Forces every future condition evaluation to fail, without disturbing
    /// already-recorded conditions. Used by the planner to implement skip
    /// application (`spec.md` §4.E step 4): the target stays in the
    /// execution list, but its conditions now always resolve to `false`.
    pub fn force_skip(&mut self) {
        self.conditions.push(Box::new(|| Ok(false)));
    }

    pub fn set_status(&mut self, status: TargetStatus) {
        self.status = status;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_target(name: &str) -> Target {
        Target {
            name: name.to_string(),
            is_default: false,
            dependencies: Vec::new(),
            conditions: Vec::new(),
            requirements: Vec::new(),
            actions: Vec::new(),
            status: TargetStatus::default(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn default_status_is_not_run() {
        assert_eq!(TargetStatus::default(), TargetStatus::NotRun);
    }

    #[test]
    fn no_conditions_means_runnable() {
        let t = empty_target("Build");
        assert!(t.evaluate_conditions().unwrap());
    }

    #[test]
    fn force_skip_short_circuits_conditions() {
        let mut t = empty_target("Build");
        t.conditions.push(Box::new(|| Ok(true)));
        t.force_skip();
        assert!(!t.evaluate_conditions().unwrap());
    }

    #[test]
    fn condition_error_propagates() {
        let mut t = empty_target("Build");
        t.conditions
            .push(Box::new(|| Err(crate::Error::configuration("bad condition"))));
        assert!(t.evaluate_conditions().is_err());
    }

    #[test]
    fn actions_run_in_order_and_stop_on_error() {
        use std::sync::{Arc, Mutex};

        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut t = empty_target("Build");

        let t1 = Arc::clone(&trace);
        t.actions.push(Box::new(move |_ctx| {
            t1.lock().unwrap().push(1);
            Ok(())
        }));
        let t2 = Arc::clone(&trace);
        t.actions.push(Box::new(move |_ctx| {
            t2.lock().unwrap().push(2);
            Err(crate::Error::configuration("boom"))
        }));
        let t3 = Arc::clone(&trace);
        t.actions.push(Box::new(move |_ctx| {
            t3.lock().unwrap().push(3);
            Ok(())
        }));

        let params = ParameterTable::new();
        let ctx = RunContext::new(&params);
        assert!(t.run_actions(&ctx).is_err());
        assert_eq!(*trace.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn action_can_read_a_bound_parameter_through_run_context() {
        let mut params = ParameterTable::new();
        params.set("greeting", crate::params::ParameterValue::Str("hi".to_string()));
        let ctx = RunContext::new(&params);
        assert_eq!(ctx.parameter("greeting").and_then(|v| v.as_str()), Some("hi"));
        assert!(ctx.parameter("missing").is_none());
    }
}
