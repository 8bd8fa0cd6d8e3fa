use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use atty::Stream;
use console::{Color, Style};
use indicatif::{ProgressBar, ProgressStyle};

use forge_types::{TargetStatus, TargetSummary};

use crate::block::BlockGuard;
use crate::{with_details, Sink};

/// Detects whether stdout is connected to a TTY.
pub fn is_tty() -> bool {
    atty::is(Stream::Stdout)
}

/// `NO_COLOR` (https://no-color.org) disables styling regardless of TTY
/// state, the same convention `console` itself understands for its own
/// auto-detection — checked explicitly here since styling is driven by our
/// own `is_tty`, not `console`'s.
fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

/// A human-facing sink. Indents nested block output, and in TTY mode routes
/// block headers through an `indicatif` spinner instead of a bare `eprintln`.
pub struct ConsoleSink {
    is_tty: bool,
    colorize: bool,
    depth: AtomicUsize,
    write_lock: Mutex<()>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let is_tty = is_tty();
        Self {
            is_tty,
            colorize: is_tty && !no_color_requested(),
            depth: AtomicUsize::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// Forces non-TTY (plain line) output regardless of the real stdout.
    pub fn plain() -> Self {
        Self {
            is_tty: false,
            colorize: false,
            depth: AtomicUsize::new(0),
            write_lock: Mutex::new(()),
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth.load(Ordering::Relaxed))
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.colorize {
            Style::new().fg(color).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn emit(&self, prefix: &str, msg: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        eprintln!("{}{prefix}{msg}", self.indent());
    }

    fn emit_colored(&self, color: Color, prefix: &str, msg: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        eprintln!("{}{}", self.indent(), self.paint(color, &format!("{prefix}{msg}")));
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, text: &str) {
        self.emit("", text);
    }

    fn trace(&self, msg: &str) {
        self.emit("trace: ", msg);
    }

    fn info(&self, msg: &str) {
        self.emit("", msg);
    }

    fn warn(&self, msg: &str, details: Option<&str>) {
        self.emit_colored(Color::Yellow, "warning: ", &with_details(msg, details));
    }

    fn error(&self, msg: &str, details: Option<&str>) {
        self.emit_colored(Color::Red, "error: ", &with_details(msg, details));
    }

    fn success(&self, msg: &str) {
        self.emit_colored(Color::Green, "", msg);
    }

    fn begin_block(&self, name: &str) -> BlockGuard<'_> {
        let start = Instant::now();
        if self.is_tty {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("{}{name}", self.indent()));
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            self.depth.fetch_add(1, Ordering::Relaxed);
            BlockGuard::new(move || {
                pb.finish_and_clear();
            })
        } else {
            self.emit("> ", name);
            self.depth.fetch_add(1, Ordering::Relaxed);
            BlockGuard::new(move || {
                let _ = start.elapsed();
            })
        }
    }

    fn write_summary(&self, rows: &[TargetSummary]) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        eprintln!();
        eprintln!("{:<28} {:<10} {:>10}", "target", "status", "duration");
        for row in rows {
            eprintln!(
                "{:<28} {:<10} {:>10}",
                row.name,
                status_label(row.status),
                humantime::format_duration(row.duration)
            );
        }
        let total = TargetSummary::total_duration(rows);
        let verdict = if TargetSummary::overall_success(rows) {
            "succeeded"
        } else {
            "failed"
        };
        eprintln!(
            "build {verdict} in {}",
            humantime::format_duration(total)
        );
    }
}

fn status_label(status: TargetStatus) -> &'static str {
    match status {
        TargetStatus::NotRun => "not run",
        TargetStatus::Absent => "absent",
        TargetStatus::Skipped => "skipped",
        TargetStatus::Executed => "ok",
        TargetStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn plain_sink_reports_not_tty() {
        let sink = ConsoleSink::plain();
        assert!(!sink.is_tty);
    }

    #[test]
    fn block_guard_restores_depth_bookkeeping() {
        let sink = ConsoleSink::plain();
        assert_eq!(sink.depth.load(Ordering::Relaxed), 0);
        {
            let _guard = sink.begin_block("compile");
            assert_eq!(sink.depth.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn write_summary_does_not_panic_on_empty_rows() {
        let sink = ConsoleSink::plain();
        sink.write_summary(&[]);
        let _ = Duration::ZERO;
    }

    #[test]
    fn plain_sink_never_colorizes() {
        let sink = ConsoleSink::plain();
        assert!(!sink.colorize);
        assert_eq!(sink.paint(Color::Red, "boom"), "boom");
    }
}
