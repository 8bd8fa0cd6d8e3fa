mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use forge::core::TargetSetBuilder;
use forge::types::{Build, ParameterTable, ParameterValue, TargetSummary};
use forge::{run, BuildDefinition, DemoBuild, RunRequest};

const BANNER: &str = "forge execution engine";

#[derive(Parser, Debug)]
#[command(name = "forge", version, about = "forge execution engine", disable_help_flag = true)]
struct Cli {
    /// Target to run (defaults to the build's declared default target).
    #[arg(long)]
    target: Option<String>,

    /// Name of a target to skip, repeatable. Its actions never run, but it
    /// still appears in the summary as `Skipped`.
    #[arg(long = "skip")]
    skip: Vec<String>,

    /// Treat a `--skip` name outside the requested target's dependency
    /// closure as an error instead of a silent no-op.
    #[arg(long)]
    strict: bool,

    /// Print the planned execution order and exit without running anything.
    #[arg(long)]
    graph: bool,

    /// Path to the project config file.
    #[arg(long, default_value = ".forge.toml")]
    config: PathBuf,

    /// Binds a build parameter: `--param NAME=VALUE`, repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Print the build's targets and parameters instead of clap's own
    /// flag-usage summary, and exit before planning runs.
    #[arg(short = 'h', long = "help")]
    help: bool,
}

/// Registers the compiled-in build definition into a fresh `Build`, without
/// binding any parameters — used by `--help` and `--graph`, which only need
/// the shape of the target set, not a real run.
fn registered_build() -> Result<Build> {
    let mut builder = TargetSetBuilder::new();
    DemoBuild.register(&mut builder).map_err(anyhow::Error::from)?;
    builder.build(ParameterTable::new()).map_err(anyhow::Error::from)
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.help {
        print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{BANNER}");

    let file_config = config::load(&cli.config)?;

    let strict = cli.strict || file_config.strict.unwrap_or(false);

    let mut skip = file_config.skip;
    skip.extend(cli.skip);

    let specs = registered_build()?.parameter_specs().to_vec();
    let parameters = bind_parameters(&specs, &file_config.parameters, &cli.params);

    let request = RunRequest {
        target: cli.target.or(file_config.target),
        skip,
        strict,
        parameters,
    };

    if cli.graph {
        print_graph(&request)?;
        return Ok(ExitCode::SUCCESS);
    }

    let rows = run(&DemoBuild, request).context("build run failed")?;
    print_summary(&rows);

    if TargetSummary::overall_success(&rows) {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(failure) = forge::core::first_failure(&rows) {
            eprintln!("{failure}");
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Looks up an environment variable case-insensitively: `name` matches a
/// live variable whose own name differs only in case (e.g. `publish_token`
/// finds a variable set as `PUBLISH_TOKEN`). `std::env::var` itself only
/// does exact-case lookups, so this walks the whole environment once.
fn env_var_ignore_case(name: &str) -> Option<String> {
    std::env::vars().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v)
}

/// Builds the parameter table: config-file values first, each overridden by
/// an identically-named environment variable (matched case-insensitively)
/// if one is set, then overridden again by an explicit `--param`. A
/// parameter bound only through the environment, with no `.forge.toml`
/// entry, is still picked up as long as the build declared it. A name the
/// build declared via `TargetSetBuilder::parameter` parses as that declared
/// kind; an undeclared name is always bound as a plain string.
fn bind_parameters(
    specs: &[forge::types::ParameterSpec],
    file_params: &BTreeMap<String, String>,
    cli_params: &[(String, String)],
) -> ParameterTable {
    let mut table = ParameterTable::new();
    let bind = |table: &mut ParameterTable, name: &str, raw: &str| {
        let value = specs
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.kind.parse(raw))
            .unwrap_or_else(|| ParameterValue::Str(raw.to_string()));
        table.set(name.to_string(), value);
    };

    let mut names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    names.extend(file_params.keys().map(String::as_str));
    names.sort_unstable();
    names.dedup();

    for name in names {
        if let Some(from_env) = env_var_ignore_case(name) {
            bind(&mut table, name, &from_env);
        } else if let Some(from_file) = file_params.get(name) {
            bind(&mut table, name, from_file);
        }
    }
    for (name, value) in cli_params {
        bind(&mut table, name, value);
    }

    table
}

/// Prints the full dependency DAG as an indented ASCII tree, one subtree per
/// target with no dependents, children sorted the way the planner's ready
/// set breaks ties: by name. `--target`/`--skip`/`--strict` are still
/// validated against the plan first so a bad name is caught here instead of
/// surfacing only once the build actually runs.
fn print_graph(request: &RunRequest) -> Result<()> {
    use forge::types::DEFAULT_NAME;

    let mut build = registered_build()?;

    let requested = request.target.clone().unwrap_or_else(|| DEFAULT_NAME.to_string());
    let computed = forge::plan::plan(&mut build, &[requested], &request.skip, request.strict)
        .map_err(anyhow::Error::from)?;
    let skipped: std::collections::HashSet<&str> = computed.skipped.iter().map(String::as_str).collect();

    let targets = build.targets();
    let mut dependents = vec![0usize; targets.len()];
    for target in targets {
        for dep in target.dependencies() {
            dependents[dep.0] += 1;
        }
    }
    let mut roots: Vec<usize> = (0..targets.len()).filter(|&i| dependents[i] == 0).collect();
    roots.sort_by_key(|&i| targets[i].name().to_ascii_lowercase());

    let mut visiting = std::collections::HashSet::new();
    for root in roots {
        print_node(&build, forge::types::TargetId(root), 0, &skipped, &mut visiting);
    }
    Ok(())
}

fn print_node(
    build: &forge::types::Build,
    id: forge::types::TargetId,
    depth: usize,
    skipped: &std::collections::HashSet<&str>,
    visiting: &mut std::collections::HashSet<forge::types::TargetId>,
) {
    let target = build.target(id);
    let marker = if skipped.contains(target.name()) { " (skipped)" } else { "" };
    println!("{}{}{marker}", "  ".repeat(depth), target.name());

    if !visiting.insert(id) {
        return;
    }
    let mut deps = target.dependencies().to_vec();
    deps.sort_by_key(|d| build.target(*d).name().to_ascii_lowercase());
    for dep in deps {
        print_node(build, dep, depth + 1, skipped, visiting);
    }
    visiting.remove(&id);
}

/// Custom `--help`: the build's target list (with dependencies and
/// requirements) and the set of parameters its requirements name, instead
/// of clap's flag-usage summary. Runs before any config loading or
/// planning.
fn print_help() -> Result<()> {
    println!("{BANNER}");
    println!();
    println!("USAGE: forge [--target NAME] [--skip NAME]... [--strict] [--graph] [--param NAME=VALUE]...");
    println!();

    let build = registered_build()?;

    println!("TARGETS:");
    for target in build.targets() {
        let deps: Vec<&str> = target
            .dependencies()
            .iter()
            .map(|id| build.target(*id).name())
            .collect();
        let default_marker = if target.is_default() { " (default)" } else { "" };
        if deps.is_empty() {
            println!("  {}{default_marker}", target.name());
        } else {
            println!("  {}{default_marker} -> depends on: {}", target.name(), deps.join(", "));
        }
    }

    let mut required: Vec<&str> = build
        .targets()
        .iter()
        .flat_map(|t| t.requirements())
        .map(|r| r.parameter.as_str())
        .collect();
    required.sort_unstable();
    required.dedup();

    if !build.parameter_specs().is_empty() || !required.is_empty() {
        println!();
        println!("PARAMETERS:");
        for spec in build.parameter_specs() {
            println!("  {} ({:?}) - {}", spec.name, spec.kind, spec.help);
        }
        // Requirement names with no matching spec still need to be visible,
        // even though the build never declared what kind they bind as.
        for name in required {
            if !build.parameter_specs().iter().any(|s| s.name == name) {
                println!("  {name}");
            }
        }
    }

    Ok(())
}

fn print_summary(rows: &[TargetSummary]) {
    for row in rows {
        println!("{}: {:?} ({:?})", row.name, row.status, row.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn param_flag_parses_key_value() {
        assert_eq!(
            parse_param("PUBLISH_TOKEN=abc").unwrap(),
            ("PUBLISH_TOKEN".to_string(), "abc".to_string())
        );
    }

    #[test]
    fn param_flag_without_equals_is_rejected() {
        assert!(parse_param("PUBLISH_TOKEN").is_err());
    }

    #[test]
    fn cli_param_overrides_config_file_value() {
        let mut file_params = BTreeMap::new();
        file_params.insert("PUBLISH_TOKEN".to_string(), "from-file".to_string());
        let cli_params = vec![("PUBLISH_TOKEN".to_string(), "from-cli".to_string())];
        let table = bind_parameters(&[], &file_params, &cli_params);
        assert_eq!(
            table.get("PUBLISH_TOKEN").unwrap().as_str(),
            Some("from-cli")
        );
    }

    #[test]
    #[serial]
    fn env_var_overrides_config_file_value() {
        temp_env::with_var("PUBLISH_TOKEN", Some("from-env"), || {
            let mut file_params = BTreeMap::new();
            file_params.insert("PUBLISH_TOKEN".to_string(), "from-file".to_string());
            let table = bind_parameters(&[], &file_params, &[]);
            assert_eq!(table.get("PUBLISH_TOKEN").unwrap().as_str(), Some("from-env"));
        });
    }

    #[test]
    #[serial]
    fn cli_param_overrides_env_var() {
        temp_env::with_var("PUBLISH_TOKEN", Some("from-env"), || {
            let cli_params = vec![("PUBLISH_TOKEN".to_string(), "from-cli".to_string())];
            let table = bind_parameters(&[], &BTreeMap::new(), &cli_params);
            assert_eq!(table.get("PUBLISH_TOKEN").unwrap().as_str(), Some("from-cli"));
        });
    }

    #[test]
    #[serial]
    fn env_var_with_no_config_entry_is_still_bound_when_declared() {
        use forge::types::{ParameterKind, ParameterSpec};

        temp_env::with_var("PUBLISH_TOKEN", Some("ci-secret"), || {
            let specs = vec![ParameterSpec {
                name: "PUBLISH_TOKEN".to_string(),
                kind: ParameterKind::Str,
                help: "token".to_string(),
            }];
            let table = bind_parameters(&specs, &BTreeMap::new(), &[]);
            assert_eq!(table.get("PUBLISH_TOKEN").unwrap().as_str(), Some("ci-secret"));
        });
    }

    #[test]
    #[serial]
    fn env_var_lookup_is_case_insensitive() {
        temp_env::with_var("publish_token", Some("lower-case-env"), || {
            let mut file_params = BTreeMap::new();
            file_params.insert("PUBLISH_TOKEN".to_string(), "from-file".to_string());
            let table = bind_parameters(&[], &file_params, &[]);
            assert_eq!(table.get("PUBLISH_TOKEN").unwrap().as_str(), Some("lower-case-env"));
        });
    }

    #[test]
    fn declared_int_kind_parses_raw_text_as_an_integer() {
        use forge::types::{ParameterKind, ParameterSpec};

        let specs = vec![ParameterSpec {
            name: "RETRIES".to_string(),
            kind: ParameterKind::Int,
            help: "retry count".to_string(),
        }];
        let cli_params = vec![("RETRIES".to_string(), "3".to_string())];
        let table = bind_parameters(&specs, &BTreeMap::new(), &cli_params);
        assert_eq!(table.get("RETRIES").unwrap().as_int(), Some(3));
    }

    #[test]
    fn registered_build_contains_the_demo_targets() {
        let build = registered_build().unwrap();
        let names: Vec<&str> = build.targets().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Clean", "Restore", "Compile", "Test", "Publish"]);
    }

    #[test]
    fn registered_build_declares_the_publish_token_spec() {
        let build = registered_build().unwrap();
        assert_eq!(build.parameter_specs().len(), 1);
        assert_eq!(build.parameter_specs()[0].name, "PUBLISH_TOKEN");
    }

    #[test]
    fn registered_build_has_one_root_with_no_dependents() {
        let build = registered_build().unwrap();
        let targets = build.targets();
        let mut dependents = vec![0usize; targets.len()];
        for target in targets {
            for dep in target.dependencies() {
                dependents[dep.0] += 1;
            }
        }
        let roots: Vec<&str> = (0..targets.len())
            .filter(|&i| dependents[i] == 0)
            .map(|i| targets[i].name())
            .collect();
        assert_eq!(roots, vec!["Publish"]);
    }
}
