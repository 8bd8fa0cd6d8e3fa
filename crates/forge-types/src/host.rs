use std::fmt;

/// The closed set of environments the engine can classify itself as running
/// under. Exactly one provider (or `Local`) applies to a given process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host {
    Local,
    GitHubActions,
    GitLab,
    Travis,
    AppVeyor,
    Jenkins,
    Bamboo,
    TeamCity,
    Bitrise,
    /// A CI system signaled only by the generic `CI=true` convention, with
    /// none of the provider-specific sentinels present.
    UnknownCi,
}

impl Host {
    pub fn is_ci(self) -> bool {
        !matches!(self, Host::Local)
    }

    pub fn label(self) -> &'static str {
        match self {
            Host::Local => "local",
            Host::GitHubActions => "GitHub Actions",
            Host::GitLab => "GitLab CI",
            Host::Travis => "Travis CI",
            Host::AppVeyor => "AppVeyor",
            Host::Jenkins => "Jenkins",
            Host::Bamboo => "Bamboo",
            Host::TeamCity => "TeamCity",
            Host::Bitrise => "Bitrise",
            Host::UnknownCi => "unknown CI",
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
