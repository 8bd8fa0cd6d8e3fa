use thiserror::Error;

/// The engine's closed error taxonomy.
///
/// `Configuration`, `Planning`, `Requirements`, `TargetFailure` and
/// `HostInterrupt` are the five kinds from the build pipeline. `Host` and
/// `Process` cover the host-detector and subprocess primitives, which sit
/// alongside the pipeline rather than inside it.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate target name, reserved name used as a real target, or no
    /// default target where one was required. Fatal before planning begins.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown invoked target, circular dependency, or strict-mode
    /// ambiguity. Fatal; the message enumerates the offending items.
    #[error("planning error: {0}")]
    Planning(String),

    /// One or more unmet requirements, collected and reported together.
    #[error("{} unmet requirement(s): {}", .0.len(), .0.join(", "))]
    Requirements(Vec<String>),

    /// An action threw while running `target`.
    #[error("target '{target}' failed: {message}")]
    TargetFailure { target: String, message: String },

    /// The host delivered an interrupt signal mid-action.
    #[error("interrupted during target '{target}'")]
    HostInterrupt { target: String },

    /// A host-classification variable was absent or failed to parse as the
    /// requested type.
    #[error("host variable error: {0}")]
    Host(String),

    /// Subprocess spawn/wait failure, including timeout.
    #[error("process error: {0}")]
    Process(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn planning(msg: impl Into<String>) -> Self {
        Error::Planning(msg.into())
    }

    /// Flattens a list of unmet-requirement messages into one error. Empty
    /// input is a programmer error (callers should not call this when
    /// nothing is unmet).
    pub fn requirements(unmet: Vec<String>) -> Self {
        Error::Requirements(unmet)
    }
}
