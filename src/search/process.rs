//! Blocking subprocess execution with optional timeout.
//!
//! Every external-tool invocation in this crate goes through [`run`]. Output
//! pipes are drained on background threads so a chatty tool cannot deadlock
//! against a full pipe buffer while the parent polls for exit.

use super::error::Error;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured output of a finished subprocess.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs `command` to completion, enforcing `timeout` if given.
///
/// On expiry the child is killed and reaped before [`Error::Timeout`] is
/// returned. A non-zero exit is not an error at this level; callers decide
/// whether it degrades or escalates.
pub(crate) fn run(
    mut command: Command,
    program: &str,
    timeout: Option<Duration>,
) -> Result<ToolOutput, Error> {
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    tracing::debug!(program, ?command, "spawning external tool");

    let mut child = command.spawn().map_err(|e| {
        Error::Configuration(format!(
            "could not launch '{program}': {e}; is it installed and on $PATH?"
        ))
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => wait_with_deadline(&mut child, program, limit)?,
    };

    Ok(ToolOutput {
        status: status.code().unwrap_or(-1),
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    limit: Duration,
) -> Result<std::process::ExitStatus, Error> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // Kill failures mean the child already exited; reap either way.
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(program, limit_secs = limit.as_secs(), "external tool timed out");
            return Err(Error::Timeout {
                program: program.to_string(),
                limit_secs: limit.as_secs(),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_output_of_a_successful_command() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2"]);
        let out = run(cmd, "sh", None).unwrap();
        assert!(out.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "out");
        assert_eq!(out.stderr_lossy().trim(), "err");
    }

    #[test]
    fn reports_non_zero_exit_without_erroring() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        let out = run(cmd, "sh", None).unwrap();
        assert!(!out.success());
        assert_eq!(out.status, 3);
        assert_eq!(out.stderr_lossy().trim(), "broken");
    }

    #[test]
    fn kills_a_process_that_exceeds_its_deadline() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let started = Instant::now();
        let err = run(cmd, "sleep", Some(Duration::from_millis(100))).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn missing_executable_is_a_configuration_error() {
        let cmd = Command::new("definitely-not-a-real-binary-9f2c");
        let err = run(cmd, "definitely-not-a-real-binary-9f2c", None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
