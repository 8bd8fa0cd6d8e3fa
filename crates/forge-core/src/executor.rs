use std::time::{Duration, Instant};

use forge_sink::Sink;
use forge_types::{Build, Error, Result, RunContext, TargetId, TargetStatus, TargetSummary};

/// Runs a planned, validated execution list in order, writing progress to
/// `sink`. Stops at the first failing target: everything after it is
/// recorded `NotRun` rather than attempted.
///
/// Returns `Ok` with the full summary even when a target failed — callers
/// decide what "failed" means for their exit code by checking
/// `TargetSummary::overall_success`. Only a condition/action that itself
/// returns `Err` (rather than evaluating to `false`/non-zero exit) is
/// treated as a hard stop.
pub fn execute(build: &mut Build, order: &[TargetId], sink: &dyn Sink) -> Result<Vec<TargetSummary>> {
    let mut rows = Vec::with_capacity(order.len());
    let mut halted = false;

    for &id in order {
        if halted {
            rows.push(summary_for(build, id, TargetStatus::NotRun));
            continue;
        }

        let name = build.target(id).name().to_string();

        // Conditions are checked, and absence of actions is noticed, before
        // the sink block or the wall-clock timer open: a target that never
        // runs an action has nothing to time and nothing worth a block for.
        let pre_status = match build.target(id).evaluate_conditions() {
            Ok(true) => None,
            Ok(false) => {
                sink.info(&format!("{name}: skipped"));
                Some(TargetStatus::Skipped)
            }
            Err(e) => {
                sink.error(&format!("{name}: condition raised"), Some(&e.to_string()));
                Some(TargetStatus::Failed)
            }
        };
        let pre_status = pre_status.or_else(|| (!build.target(id).has_actions()).then_some(TargetStatus::Absent));

        let (status, elapsed) = if let Some(status) = pre_status {
            (status, Duration::ZERO)
        } else {
            let _block = sink.begin_block(&name);
            let start = Instant::now();
            let status = execute_actions(build, id, sink, &name);
            (status, start.elapsed())
        };

        let target = build.target_mut(id);
        target.set_duration(elapsed);
        target.set_status(status);

        if status == TargetStatus::Failed {
            halted = true;
        }

        rows.push(TargetSummary {
            name,
            status,
            duration: elapsed,
        });
    }

    sink.write_summary(&rows);
    Ok(rows)
}

fn execute_actions(build: &mut Build, id: TargetId, sink: &dyn Sink, name: &str) -> TargetStatus {
    // Cloned so the context's borrow is independent of the `&mut Build`
    // borrow `run_actions` needs below.
    let parameters = build.parameters().clone();
    let ctx = RunContext::new(&parameters);

    let target = build.target_mut(id);
    match target.run_actions(&ctx) {
        Ok(()) => {
            sink.success(&format!("{name}: ok"));
            TargetStatus::Executed
        }
        Err(e) => {
            sink.error(&format!("{name} failed"), Some(&e.to_string()));
            TargetStatus::Failed
        }
    }
}

fn summary_for(build: &Build, id: TargetId, status: TargetStatus) -> TargetSummary {
    TargetSummary {
        name: build.target(id).name().to_string(),
        status,
        duration: std::time::Duration::ZERO,
    }
}

/// Translates a target failure discovered by the executor into the error
/// taxonomy's `TargetFailure` variant, for callers that want to propagate
/// instead of inspecting the summary table.
pub fn first_failure(rows: &[TargetSummary]) -> Option<Error> {
    rows.iter().find(|r| r.status == TargetStatus::Failed).map(|r| Error::TargetFailure {
        target: r.name.clone(),
        message: format!("target '{}' did not complete successfully", r.name),
    })
}
