//! Process Launcher
//!
//! Spawns child processes and collects their diagnostic stream. The runner
//! only talks to the [`Launcher`] trait so tests can script process results.

use std::future::Future;
use std::io;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::command::Invocation;

const CHUNK_SIZE: usize = 64 * 1024;

/// What a finished child process left behind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Everything written to stderr, `None` if the stream was never captured
    pub stderr: Option<Vec<u8>>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stderr decoded as text
    pub fn stderr_text(&self) -> Option<String> {
        self.stderr
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Failure while collecting a child's output
#[derive(Debug)]
pub enum LaunchError {
    /// The process could not be started or its stream could not be read
    Io(io::Error),
    /// Stderr grew past the allowed size
    OutputLimit(usize),
}

impl From<io::Error> for LaunchError {
    fn from(e: io::Error) -> Self {
        LaunchError::Io(e)
    }
}

/// Runs an invocation to completion.
pub trait Launcher {
    fn execute(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<ProcessOutput, LaunchError>> + Send;
}

/// Launcher backed by real child processes
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    max_output_bytes: usize,
}

impl SystemLauncher {
    pub fn new(max_output_bytes: usize) -> Self {
        Self { max_output_bytes }
    }
}

impl Launcher for SystemLauncher {
    async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput, LaunchError> {
        log::debug!("Spawning: {}", invocation);

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = match child.stderr.take() {
            Some(mut stream) => {
                let mut collected = Vec::new();
                let mut chunk = vec![0u8; CHUNK_SIZE];
                loop {
                    let n = stream.read(&mut chunk).await?;
                    if n == 0 {
                        break;
                    }
                    log::trace!("Received {} bytes from {}", n, invocation.program);
                    if collected.len() + n > self.max_output_bytes {
                        if let Err(e) = child.start_kill() {
                            log::warn!("Failed to kill {}: {}", invocation.program, e);
                        }
                        return Err(LaunchError::OutputLimit(self.max_output_bytes));
                    }
                    collected.extend_from_slice(&chunk[..n]);
                }
                Some(collected)
            }
            None => None,
        };

        let status = child.wait().await?;
        log::debug!("{} exited with {}", invocation.program, status);

        Ok(ProcessOutput {
            code: status.code(),
            stderr,
        })
    }
}
