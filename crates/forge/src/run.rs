use forge_core::{execute, validate_requirements, TargetSetBuilder};
use forge_types::{ParameterTable, Result, TargetSummary};

/// A build's target registration. Implement this once per project and hand
/// it to [`run`]; everything else (planning, validation, execution,
/// output) is the same for every build.
pub trait BuildDefinition {
    fn register(&self, builder: &mut TargetSetBuilder) -> Result<()>;
}

/// One invocation's request: which target to run (or the declared default),
/// which targets to skip, whether unresolvable `--skip` names are an error,
/// and the parameter bindings gathered from the CLI and environment.
pub struct RunRequest {
    pub target: Option<String>,
    pub skip: Vec<String>,
    pub strict: bool,
    pub parameters: ParameterTable,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            target: None,
            skip: Vec::new(),
            strict: false,
            parameters: ParameterTable::new(),
        }
    }
}

/// Runs the full register → plan → validate → execute pipeline for one
/// build definition and request, writing progress to a sink chosen from the
/// detected host.
pub fn run(definition: &dyn BuildDefinition, request: RunRequest) -> Result<Vec<TargetSummary>> {
    let mut builder = TargetSetBuilder::new();
    definition.register(&mut builder)?;
    let mut build = builder.build(request.parameters)?;

    let requested_name = request.target.unwrap_or_else(|| forge_types::DEFAULT_NAME.to_string());
    let computed = forge_plan::plan(&mut build, &[requested_name], &request.skip, request.strict)?;

    validate_requirements(&build, &computed.executing_order)?;

    let host = forge_host::detect();
    let sink = forge_sink::for_host(host);
    sink.info(&format!(
        "starting build at {} on {host}",
        chrono::Utc::now().to_rfc3339()
    ));
    execute(&mut build, &computed.order, sink.as_ref())
}
