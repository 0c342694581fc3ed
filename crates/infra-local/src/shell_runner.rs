// Local process execution on tokio subprocesses

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use capstan_core::port::CommandRunner;
use capstan_core::{ConnectorError, Context, Result};

/// Production command-execution provider: spawns the program on this
/// machine and captures combined stdout/stderr.
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, ctx: &Context, program: &str, args: &[String]) -> Result<Vec<u8>> {
        ctx.check()?;

        debug!(program = %program, args = ?args, "spawning local command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConnectorError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let pid = child.id();
        let wait = tokio::spawn(async move { child.wait_with_output().await });

        // Race the process against the context. On cancellation the child
        // is killed immediately; the detached wait task reaps it.
        let output = tokio::select! {
            biased;
            err = ctx.done() => {
                warn!(program = %program, pid = ?pid, "command cancelled, killing process");
                if let Some(pid) = pid {
                    kill_process(pid);
                }
                return Err(err);
            }
            joined = wait => match joined {
                Ok(Ok(output)) => output,
                Ok(Err(source)) => {
                    return Err(ConnectorError::CommandIo {
                        program: program.to_string(),
                        source,
                    })
                }
                Err(join_err) => {
                    return Err(ConnectorError::CommandIo {
                        program: program.to_string(),
                        source: std::io::Error::new(std::io::ErrorKind::Other, join_err),
                    })
                }
            },
        };

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if !output.status.success() {
            warn!(program = %program, status = %output.status, "command failed");
            return Err(ConnectorError::CommandFailed {
                status: output.status,
                output: combined,
            });
        }

        Ok(combined)
    }
}

/// Best-effort SIGKILL once the context has fired; the wait task reaps the
/// child afterwards, and `kill_on_drop` covers the spawn-failed-to-kill
/// case.
#[cfg(unix)]
fn kill_process(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        warn!(pid = %pid, error = %err, "failed to kill cancelled command");
    }
}

#[cfg(not(unix))]
fn kill_process(_pid: u32) {}
