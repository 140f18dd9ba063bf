//! Isolated execution of synthesized programs
//!
//! Each run writes the program into a fresh [`Sandbox`], starts the
//! interpreter as a child process in its own process group, and races the
//! child's exit against the time budget and an optional cancellation token.
//! Whatever wins, the process group is killed, the child is reaped, the
//! sandbox is removed, and an [`ExecutionOutcome`] is returned.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::limits::apply_unix_limits;
use super::{EvalConfig, ExecutionOutcome, ResourceLimits, Sandbox};

/// File name of the synthesized program inside the sandbox
pub const PROGRAM_FILE_NAME: &str = "harness.py";

/// How long to wait for both pipe readers once the process group is gone
const READER_GRACE: Duration = Duration::from_millis(500);

/// Runs program text and reports what happened
#[async_trait]
pub trait ProgramExecutor: Send + Sync {
    /// Run `program_text` within `timeout`, stopping early if `cancel` fires
    async fn run(
        &self,
        program_text: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome;
}

/// How the wait on the child ended
enum Finish {
    Exited(ExitStatus),
    WaitFailed(std::io::Error),
    TimedOut,
    Cancelled,
}

/// Child-process executor with wall-clock timeout
#[derive(Debug, Clone)]
pub struct IsolatedExecutor {
    interpreter: PathBuf,
    interpreter_args: Vec<String>,
    max_output_bytes: u64,
    limits: ResourceLimits,
}

impl IsolatedExecutor {
    /// Create an executor from the evaluation config
    pub fn new(config: &EvalConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            interpreter_args: config.interpreter_args.clone(),
            max_output_bytes: config.max_output_bytes,
            limits: config.limits,
        }
    }

    /// Interpreter this executor starts
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Run `program_text` with a wall-clock `timeout`
    pub async fn execute(&self, program_text: &str, timeout: Duration) -> ExecutionOutcome {
        self.execute_with_cancel(program_text, timeout, &CancellationToken::new())
            .await
    }

    /// Run `program_text`, stopping at `timeout` or when `cancel` fires
    pub async fn execute_with_cancel(
        &self,
        program_text: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome {
        let start = Instant::now();

        let sandbox = match Sandbox::new() {
            Ok(sandbox) => sandbox,
            Err(e) => {
                return ExecutionOutcome::spawn_failed(format!(
                    "failed to prepare sandbox: {:#}",
                    e
                ));
            }
        };

        let mut outcome = match sandbox.write_file(PROGRAM_FILE_NAME, program_text).await {
            Ok(program_path) => {
                self.run_in_sandbox(&sandbox, &program_path, timeout, cancel)
                    .await
            }
            Err(e) => ExecutionOutcome::spawn_failed(format!("failed to prepare sandbox: {:#}", e)),
        };

        if let Err(e) = sandbox.cleanup() {
            tracing::warn!("{:#}", e);
        }

        outcome.duration = start.elapsed();
        outcome
    }

    async fn run_in_sandbox(
        &self,
        sandbox: &Sandbox,
        program_path: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome {
        let mut cmd = Command::new(&self.interpreter);
        cmd.args(&self.interpreter_args)
            .arg(program_path)
            .current_dir(sandbox.root())
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        apply_unix_limits(&mut cmd, &self.limits);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(interpreter = ?self.interpreter, error = %e, "Spawn failed");
                return ExecutionOutcome::spawn_failed(format!(
                    "failed to spawn interpreter {:?}: {}",
                    self.interpreter, e
                ));
            }
        };

        let pid = child.id();
        tracing::debug!(
            pid = ?pid,
            timeout_ms = timeout.as_millis() as u64,
            "Spawned {:?}",
            self.interpreter
        );

        let stdout_reader = OutputReader::spawn(child.stdout.take(), self.max_output_bytes);
        let stderr_reader = OutputReader::spawn(child.stderr.take(), self.max_output_bytes);

        let finish = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => Finish::Exited(status),
                Err(e) => Finish::WaitFailed(e),
            },
            _ = tokio::time::sleep(timeout) => Finish::TimedOut,
            _ = cancel.cancelled() => Finish::Cancelled,
        };

        // Reclaim everything the program started, not just the interpreter
        kill_process_group(pid);
        if !matches!(finish, Finish::Exited(_)) {
            // Kills if still alive, then reaps
            let _ = child.kill().await;
        }

        let (stdout, stderr) = collect_output(stdout_reader, stderr_reader).await;

        let mut outcome = ExecutionOutcome {
            output_truncated: stdout.truncated || stderr.truncated,
            stdout: stdout.into_text(),
            stderr: stderr.into_text(),
            ..Default::default()
        };

        if outcome.output_truncated {
            tracing::warn!(
                limit = self.max_output_bytes,
                "Program output exceeded the capture limit and was truncated"
            );
        }

        match finish {
            Finish::Exited(status) => {
                outcome.exit_code = status.code();
                outcome.signal = exit_signal(&status);
                tracing::debug!(
                    exit_code = ?outcome.exit_code,
                    signal = ?outcome.signal,
                    "Program finished"
                );
            }
            Finish::WaitFailed(e) => {
                outcome.spawn_error = Some(format!("failed to wait for interpreter: {}", e));
            }
            Finish::TimedOut => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Program timed out and was killed"
                );
                outcome.timed_out = true;
            }
            Finish::Cancelled => {
                tracing::debug!("Program cancelled and was killed");
                outcome.cancelled = true;
            }
        }

        outcome
    }
}

#[async_trait]
impl ProgramExecutor for IsolatedExecutor {
    async fn run(
        &self,
        program_text: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome {
        self.execute_with_cancel(program_text, timeout, cancel).await
    }
}

/// Bytes kept from one output stream
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    fn into_text(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Background task copying one pipe into a shared buffer
///
/// The buffer outlives the task, so whatever was read before the task is
/// stopped is still there.
struct OutputReader {
    captured: Arc<Mutex<Captured>>,
    task: JoinHandle<()>,
}

impl OutputReader {
    fn spawn<R>(stream: Option<R>, max_bytes: u64) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let captured = Arc::new(Mutex::new(Captured::default()));
        let buffer = Arc::clone(&captured);
        let task = tokio::spawn(async move {
            if let Some(stream) = stream {
                read_output_limited(stream, max_bytes, &buffer).await;
            }
        });
        Self { captured, task }
    }

    async fn take(self) -> Captured {
        std::mem::take(&mut *self.captured.lock().await)
    }
}

/// Read a stream to its end, keeping at most `max_bytes` and discarding the
/// rest so the child never blocks on a full pipe.
async fn read_output_limited<R: AsyncRead + Unpin>(
    mut reader: R,
    max_bytes: u64,
    captured: &Mutex<Captured>,
) {
    let limit = usize::try_from(max_bytes).unwrap_or(usize::MAX);
    let mut chunk = [0u8; 8192];
    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) => {
                tracing::debug!(error = %e, "Output stream read failed");
                break;
            }
        };

        let mut captured = captured.lock().await;
        let keep = read.min(limit.saturating_sub(captured.bytes.len()));
        captured.bytes.extend_from_slice(&chunk[..keep]);
        if keep < read {
            captured.truncated = true;
        }
    }
}

/// Wait for both readers under one shared grace period, then take what they
/// captured.
async fn collect_output(mut stdout: OutputReader, mut stderr: OutputReader) -> (Captured, Captured) {
    let drained = tokio::time::timeout(READER_GRACE, async {
        let (out, err) = tokio::join!(&mut stdout.task, &mut stderr.task);
        for result in [out, err] {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Output reader failed");
            }
        }
    })
    .await;

    if drained.is_err() {
        // Something outside the process group still holds a pipe open
        tracing::warn!("Output readers did not finish; keeping what was captured");
        stdout.task.abort();
        stderr.task.abort();
    }

    (stdout.take().await, stderr.take().await)
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
        // ESRCH only means the group is already gone
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
