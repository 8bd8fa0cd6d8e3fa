use forge_core::TargetSetBuilder;
use forge_types::{ParameterKind, Result};

use crate::run::BuildDefinition;

/// The build the `forge` CLI runs when no project-specific definition is
/// embedded: `Restore` → `Compile` → `Test` → `Publish`, with `Publish`
/// gated on a `PUBLISH_TOKEN` parameter and skipped entirely unless
/// explicitly requested.
///
/// Embedders replace this with their own [`BuildDefinition`]; it exists so
/// `forge-cli` has something runnable out of the box and so this pipeline
/// can be exercised in integration tests.
pub struct DemoBuild;

impl BuildDefinition for DemoBuild {
    fn register(&self, builder: &mut TargetSetBuilder) -> Result<()> {
        builder.parameter(
            "PUBLISH_TOKEN",
            ParameterKind::Str,
            "credential used to authenticate the publish step",
        );

        builder.target("Clean")?.executes(|_ctx| Ok(()));

        builder
            .target("Restore")?
            .depends_on(&["Clean"])
            .executes(|_ctx| Ok(()));

        builder
            .target("Compile")?
            .depends_on(&["Restore"])
            .default_target()
            .executes(|_ctx| Ok(()));

        builder
            .target("Test")?
            .depends_on(&["Compile"])
            .executes(|_ctx| Ok(()));

        builder
            .target("Publish")?
            .depends_on(&["Test"])
            .requires("PUBLISH_TOKEN")
            .only_when(|| Ok(false))
            .executes(|ctx| {
                let _token = ctx.parameter("PUBLISH_TOKEN").and_then(|v| v.as_str());
                Ok(())
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{run, RunRequest};
    use forge_types::{ParameterTable, ParameterValue, TargetSummary};

    #[test]
    fn default_target_runs_clean_through_compile() {
        let rows = run(&DemoBuild, RunRequest::default()).unwrap();
        assert_eq!(
            rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["Clean", "Restore", "Compile"]
        );
        assert!(TargetSummary::overall_success(&rows));
    }

    #[test]
    fn publish_without_token_is_an_unmet_requirement() {
        let mut parameters = ParameterTable::new();
        parameters.set("PUBLISH_TOKEN", ParameterValue::Str(String::new()));
        let result = run(
            &DemoBuild,
            RunRequest {
                target: Some("Publish".to_string()),
                parameters,
                ..RunRequest::default()
            },
        );
        assert!(result.is_err());
    }
}
