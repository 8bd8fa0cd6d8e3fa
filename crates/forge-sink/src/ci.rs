use std::sync::Mutex;

use forge_types::{Host, TargetStatus, TargetSummary};

use crate::block::BlockGuard;
use crate::{with_details, Sink};

/// CI-native annotations. GitHub Actions' `::group::`/`::error::` workflow
/// commands are used for every provider except TeamCity, which has its own
/// `##teamcity[...]` service message syntax; everything else (GitLab,
/// Travis, AppVeyor, Jenkins, Bamboo, Bitrise, or an unrecognized CI) gets
/// the GitHub Actions commands since none of those runners choke on lines
/// they don't understand, and most either run an `actions/runner`-compatible
/// log viewer already or simply pass the lines through.
pub struct CiSink {
    host: Host,
    write_lock: Mutex<()>,
}

impl CiSink {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            write_lock: Mutex::new(()),
        }
    }

    fn emit(&self, line: String) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        println!("{line}");
    }
}

impl Sink for CiSink {
    fn write(&self, text: &str) {
        self.emit(text.to_string());
    }

    fn trace(&self, msg: &str) {
        self.emit(format!("trace: {msg}"));
    }

    fn info(&self, msg: &str) {
        self.emit(msg.to_string());
    }

    fn warn(&self, msg: &str, details: Option<&str>) {
        let msg = with_details(msg, details);
        match self.host {
            Host::TeamCity => self.emit(teamcity_message("message", &[("text", &msg), ("status", "WARNING")])),
            _ => self.emit(format!("::warning::{msg}")),
        }
    }

    fn error(&self, msg: &str, details: Option<&str>) {
        let msg = with_details(msg, details);
        match self.host {
            Host::TeamCity => self.emit(teamcity_message("message", &[("text", &msg), ("status", "ERROR")])),
            _ => self.emit(format!("::error::{msg}")),
        }
    }

    fn success(&self, msg: &str) {
        self.emit(msg.to_string());
    }

    fn begin_block(&self, name: &str) -> BlockGuard<'_> {
        match self.host {
            Host::TeamCity => {
                self.emit(teamcity_message("blockOpened", &[("name", name)]));
                let name = name.to_string();
                BlockGuard::new(move || {
                    let _ = &name;
                })
            }
            _ => {
                self.emit(format!("::group::{name}"));
                BlockGuard::new(|| {
                    println!("::endgroup::");
                })
            }
        }
    }

    fn write_summary(&self, rows: &[TargetSummary]) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        for row in rows {
            println!("{}: {}", row.name, status_label(row.status));
        }
        let verdict = if TargetSummary::overall_success(rows) {
            "succeeded"
        } else {
            "failed"
        };
        println!(
            "build {verdict} in {}",
            humantime::format_duration(TargetSummary::total_duration(rows))
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

fn teamcity_message(name: &str, attrs: &[(&str, &str)]) -> String {
    let mut out = format!("##teamcity[{name}");
    for (key, value) in attrs {
        out.push_str(&format!(" {key}='{}'", escape_teamcity(value)));
    }
    out.push(']');
    out
}

fn escape_teamcity(value: &str) -> String {
    value
        .replace('|', "||")
        .replace('\'', "|'")
        .replace('\n', "|n")
        .replace('\r', "|r")
        .replace('[', "|[")
        .replace(']', "|]")
}
