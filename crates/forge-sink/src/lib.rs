//! # forge-sink
//!
//! Where target output goes. A `Sink` turns engine events (trace/info/warn/
//! error lines, block boundaries, the final summary table) into either a
//! TTY-friendly console stream or CI-native annotations.

mod block;
mod console;
mod ci;

pub use block::BlockGuard;
pub use console::ConsoleSink;
pub use ci::CiSink;

use forge_types::TargetSummary;

/// Appends `details` to `msg` on its own line when present, for sinks whose
/// underlying format has no separate slot for it.
pub(crate) fn with_details(msg: &str, details: Option<&str>) -> String {
    match details {
        Some(details) if !details.is_empty() => format!("{msg}\n{details}"),
        _ => msg.to_string(),
    }
}

/// The output surface the executor writes to while running a build.
///
/// Implementations must be safe to share across the single execution thread
/// the engine currently runs on; they are not required to be `Sync` beyond
/// that.
pub trait Sink: Send + Sync {
    /// Raw passthrough text with no level prefix — a subprocess's own
    /// stdout/stderr lines, for instance, which already carry whatever
    /// meaning they're going to carry.
    fn write(&self, text: &str);
    fn trace(&self, msg: &str);
    fn info(&self, msg: &str);
    /// `details` is additional context appended after `msg` (a captured
    /// stderr tail, a backtrace) — `None` when there is none to show.
    fn warn(&self, msg: &str, details: Option<&str>);
    fn error(&self, msg: &str, details: Option<&str>);
    fn success(&self, msg: &str);

    /// Opens a named block (one target's output). The returned guard closes
    /// it on drop, so a target that fails partway through still leaves the
    /// sink's block nesting balanced.
    fn begin_block(&self, name: &str) -> BlockGuard<'_>;

    /// Writes the end-of-run summary table.
    fn write_summary(&self, rows: &[TargetSummary]);
}

/// Picks the sink matching the detected host: CI-native annotations under a
/// recognized CI provider, a TTY-aware console otherwise.
pub fn for_host(host: forge_types::Host) -> Box<dyn Sink> {
    if host.is_ci() {
        Box::new(CiSink::new(host))
    } else {
        Box::new(ConsoleSink::new())
    }
}
