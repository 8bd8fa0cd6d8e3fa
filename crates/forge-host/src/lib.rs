//! # forge-host
//!
//! Detects which CI provider (if any) the engine is running under, and gives
//! targets a typed window onto that provider's environment variables.
//!
//! Detection is sentinel-based: each provider is recognized by the presence
//! of one environment variable that provider's own runners always set. This
//! mirrors how most "is this CI?" crates in the ecosystem work, rather than
//! trying to fingerprint a shell or process tree.

use std::env;

use forge_types::{Error, Host, Result};

/// One sentinel-to-provider mapping, checked in order.
const SENTINELS: &[(&str, Host)] = &[
    ("GITHUB_ACTIONS", Host::GitHubActions),
    ("GITLAB_CI", Host::GitLab),
    ("TRAVIS", Host::Travis),
    ("APPVEYOR", Host::AppVeyor),
    ("JENKINS_URL", Host::Jenkins),
    ("bamboo_planKey", Host::Bamboo),
    ("TEAMCITY_VERSION", Host::TeamCity),
    ("BITRISE_IO", Host::Bitrise),
];

/// Generic fallbacks recognized when none of the provider-specific sentinels
/// above are present, in order.
const GENERIC_CI_VARS: &[&str] = &["CI", "CONTINUOUS_INTEGRATION", "BUILD_NUMBER"];

/// Classifies the current process's environment as a known CI provider,
/// an unidentified CI, or local.
pub fn detect() -> Host {
    for (var, host) in SENTINELS {
        if env_is_present(var) {
            return *host;
        }
    }
    for var in GENERIC_CI_VARS {
        if env_is_present(var) {
            return Host::UnknownCi;
        }
    }
    Host::Local
}

fn env_is_present(var: &str) -> bool {
    env::var_os(var).is_some_and(|v| !v.is_empty())
}

/// A typed window onto a host's environment variables.
///
/// Reads are lazy: nothing is cached, so tests that mutate the process
/// environment (`temp_env`, `serial_test`) observe the change immediately.
pub trait HostVariables {
    fn get_string(&self, name: &str) -> Result<String>;
    fn get_bool(&self, name: &str) -> Result<bool>;
    fn get_int(&self, name: &str) -> Result<i64>;
}

/// The `HostVariables` view used everywhere outside of tests: real
/// `std::env` reads.
pub struct ProcessEnvironment;

impl HostVariables for ProcessEnvironment {
    fn get_string(&self, name: &str) -> Result<String> {
        env::var(name).map_err(|_| Error::Host(format!("environment variable '{name}' is not set")))
    }

    fn get_bool(&self, name: &str) -> Result<bool> {
        let raw = self.get_string(name)?;
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Host(format!(
                "environment variable '{name}' has a non-boolean value '{raw}'"
            ))),
        }
    }

    fn get_int(&self, name: &str) -> Result<i64> {
        let raw = self.get_string(name)?;
        raw.parse::<i64>().map_err(|_| {
            Error::Host(format!(
                "environment variable '{name}' has a non-integer value '{raw}'"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn detects_github_actions_over_generic_ci() {
        temp_env::with_vars(
            [("GITHUB_ACTIONS", Some("true")), ("CI", Some("true"))],
            || {
                assert_eq!(detect(), Host::GitHubActions);
            },
        );
    }

    #[test]
    #[serial]
    fn detects_generic_ci_without_provider_sentinel() {
        temp_env::with_vars_unset(
            SENTINELS.iter().map(|(v, _)| *v).collect::<Vec<_>>(),
            || {
                temp_env::with_var("CI", Some("true"), || {
                    assert_eq!(detect(), Host::UnknownCi);
                });
            },
        );
    }

    #[test]
    #[serial]
    fn falls_back_to_local() {
        let all_vars: Vec<&str> = SENTINELS
            .iter()
            .map(|(v, _)| *v)
            .chain(GENERIC_CI_VARS.iter().copied())
            .collect();
        temp_env::with_vars_unset(all_vars, || {
            assert_eq!(detect(), Host::Local);
        });
    }

    #[test]
    #[serial]
    fn get_bool_rejects_non_boolean() {
        temp_env::with_var("FORGE_TEST_BOOL", Some("maybe"), || {
            let err = ProcessEnvironment.get_bool("FORGE_TEST_BOOL").unwrap_err();
            assert!(err.to_string().contains("non-boolean"));
        });
    }

    #[test]
    #[serial]
    fn get_int_parses_value() {
        temp_env::with_var("FORGE_TEST_INT", Some("42"), || {
            assert_eq!(ProcessEnvironment.get_int("FORGE_TEST_INT").unwrap(), 42);
        });
    }

    #[test]
    #[serial]
    fn get_string_missing_is_host_error() {
        temp_env::with_var_unset("FORGE_TEST_MISSING", || {
            let err = ProcessEnvironment.get_string("FORGE_TEST_MISSING").unwrap_err();
            assert!(matches!(err, Error::Host(_)));
        });
    }
}
