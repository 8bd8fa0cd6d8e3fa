use forge_types::{Build, Error, Result, TargetId};

/// Checks every requirement of every target about to execute against the
/// build's parameter table, collecting all unmet requirements into a single
/// error instead of failing on the first one.
///
/// Runs once, after planning and before execution, over the full executing
/// list — a requirement on a target near the end of the run should not wait
/// for everything before it to finish before being reported.
pub fn validate_requirements(build: &Build, executing: &[TargetId]) -> Result<()> {
    let mut unmet = Vec::new();

    for &id in executing {
        let target = build.target(id);
        for requirement in target.requirements() {
            if !build.parameters().is_satisfied(&requirement.parameter) {
                unmet.push(format!(
                    "target '{}' requires parameter '{}'",
                    target.name(),
                    requirement.parameter
                ));
            }
        }
    }

    if unmet.is_empty() {
        Ok(())
    } else {
        Err(Error::requirements(unmet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::{ParameterTable, ParameterValue, Requirement, Target};
    use std::collections::HashMap;

    fn build_with_requirement(parameter: &str, satisfied: bool) -> Build {
        let target = Target::new(
            "Publish",
            true,
            Vec::new(),
            Vec::new(),
            vec![Requirement {
                parameter: parameter.to_string(),
            }],
            Vec::new(),
        );
        let mut by_name = HashMap::new();
        by_name.insert("publish".to_string(), TargetId(0));
        let mut parameters = ParameterTable::new();
        if satisfied {
            parameters.set(parameter, ParameterValue::Bool(true));
        }
        Build::new(vec![target], by_name, Some(TargetId(0)), parameters)
    }

    #[test]
    fn satisfied_requirement_passes() {
        let build = build_with_requirement("API_KEY", true);
        assert!(validate_requirements(&build, &[TargetId(0)]).is_ok());
    }

    #[test]
    fn unmet_requirement_names_target_and_parameter() {
        let build = build_with_requirement("API_KEY", false);
        let err = validate_requirements(&build, &[TargetId(0)]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Publish"));
        assert!(msg.contains("API_KEY"));
    }

    #[test]
    fn target_not_in_executing_list_is_not_checked() {
        let build = build_with_requirement("API_KEY", false);
        assert!(validate_requirements(&build, &[]).is_ok());
    }
}
