use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// How long to keep draining pipes after the child exited. A grandchild that
/// inherited stdout can hold it open indefinitely.
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration_ms: u128,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} timed out after {}ms", .limit.as_millis())]
    TimedOut { program: String, limit: Duration },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed reading output of {program}: {source}")]
    Output {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Run `program` with `args` (no shell) and wait at most `limit` for it.
///
/// On timeout the child is killed before returning.
pub async fn execute(program: &str, args: &[String], limit: Duration) -> Result<CommandResult, CommandError> {
    let start = Instant::now();

    tracing::debug!("Executing: {} {:?}", program, args);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let pid = child.id();

    // Drain both pipes while waiting so a chatty tool cannot stall on a full buffer
    let stdout = child.stdout.take().map(|pipe| tokio::spawn(drain(pipe)));
    let stderr = child.stderr.take().map(|pipe| tokio::spawn(drain(pipe)));

    let status = match timeout(limit, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(source)) => {
            abort(stdout);
            abort(stderr);
            return Err(CommandError::Wait {
                program: program.to_string(),
                source,
            });
        }
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill {} (pid {:?}): {}", program, pid, e);
            }
            abort(stdout);
            abort(stderr);
            return Err(CommandError::TimedOut {
                program: program.to_string(),
                limit,
            });
        }
    };

    let stdout = collect(program, stdout).await?;
    let stderr = collect(program, stderr).await?;

    Ok(CommandResult {
        stdout,
        stderr,
        exit_code: status.code(),
        duration_ms: start.elapsed().as_millis(),
    })
}

async fn drain<R>(mut pipe: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn collect(program: &str, handle: Option<JoinHandle<io::Result<String>>>) -> Result<String, CommandError> {
    let Some(mut handle) = handle else {
        return Ok(String::new());
    };

    match timeout(PIPE_DRAIN_GRACE, &mut handle).await {
        Ok(Ok(Ok(text))) => Ok(text),
        Ok(Ok(Err(source))) => Err(CommandError::Output {
            program: program.to_string(),
            source,
        }),
        Ok(Err(join_error)) => Err(CommandError::Output {
            program: program.to_string(),
            source: io::Error::other(join_error),
        }),
        Err(_) => {
            handle.abort();
            tracing::warn!("{} exited but its output pipe stayed open; output dropped", program);
            Ok(String::new())
        }
    }
}

fn abort(handle: Option<JoinHandle<io::Result<String>>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let result = execute("sh", &args(&["-c", "echo hello; echo oops >&2; exit 3"]), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.stderr.trim(), "oops");
        assert_eq!(result.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let result = execute("echo", &args(&["example.com; echo injected"]), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), "example.com; echo injected");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = execute("reconguard-no-such-binary", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_within_bound() {
        let started = Instant::now();
        let err = execute("sleep", &args(&["30"]), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
