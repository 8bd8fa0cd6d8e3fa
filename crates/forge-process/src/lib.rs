//! # forge-process
//!
//! Runs an external program as part of a target's action body: streams its
//! stdout/stderr to a sink as they arrive, and optionally enforces a
//! wall-clock timeout by polling the child rather than blocking on it.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use forge_sink::Sink;
use forge_types::{Error, Result};

/// The outcome of a completed (or timed-out) child process.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// A running (or exited) child process whose output is already being
/// streamed to the sink in the background.
pub struct ProcessHandle {
    child: Child,
    started: Instant,
    stdout_reader: Option<JoinHandle<()>>,
    stderr_reader: Option<JoinHandle<()>>,
    timeout: Option<Duration>,
    sink: Arc<dyn Sink>,
}

/// Spawns `executable` with `args` in `cwd`, with `env` applied on top of the
/// inherited environment, streaming both stdout and stderr as sink `write`
/// lines — raw passthrough, since the child's own output already carries
/// whatever level of severity it means to.
pub fn spawn(
    executable: &str,
    args: &[String],
    cwd: &Path,
    env: &HashMap<String, String>,
    sink: Arc<dyn Sink>,
    timeout: Option<Duration>,
) -> Result<ProcessHandle> {
    let mut command = Command::new(executable);
    command
        .args(args)
        .current_dir(cwd_or_current(cwd))
        .envs(env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        Error::Process(format!("failed to spawn '{executable}': {e}"))
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_reader = stdout.map(|out| {
        let sink = Arc::clone(&sink);
        thread::spawn(move || stream_lines(out, |line| sink.write(&line)))
    });
    let stderr_reader = stderr.map(|err| {
        let sink = Arc::clone(&sink);
        thread::spawn(move || stream_lines(err, |line| sink.write(&line)))
    });

    Ok(ProcessHandle {
        child,
        started: Instant::now(),
        stdout_reader,
        stderr_reader,
        timeout,
        sink,
    })
}

fn cwd_or_current(cwd: &Path) -> PathBuf {
    if cwd.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cwd.to_path_buf()
    }
}

fn stream_lines<R: std::io::Read>(reader: R, mut emit: impl FnMut(String)) {
    let buffered = BufReader::new(reader);
    for line in buffered.lines() {
        match line {
            Ok(line) => emit(line),
            Err(_) => break,
        }
    }
}

impl ProcessHandle {
    /// Blocks until the process exits or its configured timeout elapses,
    /// polling rather than calling the blocking `wait()` so a timeout can
    /// still fire a `kill()`.
    pub fn wait_for_exit(mut self) -> Result<ProcessOutcome> {
        let outcome = match self.timeout {
            Some(timeout) => self.poll_until(timeout),
            None => {
                let status = self
                    .child
                    .wait()
                    .map_err(|e| Error::Process(format!("failed to wait on child: {e}")))?;
                ProcessOutcome {
                    exit_code: status.code().unwrap_or(-1),
                    timed_out: false,
                    duration: self.started.elapsed(),
                }
            }
        };

        if let Some(handle) = self.stdout_reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_reader.take() {
            let _ = handle.join();
        }

        Ok(outcome)
    }

    fn poll_until(&mut self, timeout: Duration) -> ProcessOutcome {
        let deadline = self.started + timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    return ProcessOutcome {
                        exit_code: status.code().unwrap_or(-1),
                        timed_out: false,
                        duration: self.started.elapsed(),
                    };
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        self.sink.warn(
                            &format!("process exceeded its {} timeout, killing it", humantime::format_duration(timeout)),
                            None,
                        );
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        return ProcessOutcome {
                            exit_code: -1,
                            timed_out: true,
                            duration: self.started.elapsed(),
                        };
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                Err(_) => {
                    return ProcessOutcome {
                        exit_code: -1,
                        timed_out: false,
                        duration: self.started.elapsed(),
                    };
                }
            }
        }
    }
}
