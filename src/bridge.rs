//! Synchronous bridge to the asynchronous worker process.
//!
//! The calling context is a single-threaded lint visitor that cannot
//! suspend, so every asynchronous framework operation runs in a separate
//! long-lived process and is exposed back as a blocking call. One bridge
//! per operation kind; exactly one outstanding request per bridge.

use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::errors::{ResolverError, Result};
use crate::protocol::{self, FactPayload, Operation, Request, Response, Warning};

/// Default time to wait for a worker reply before surfacing a bridge
/// timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a worker process is launched.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl BridgeConfig {
    /// The launch configuration for a dedicated worker serving `operation`
    /// under the resolved major version.
    pub fn for_operation(program: PathBuf, operation: Operation, major: u64, no_cache: bool) -> Self {
        let mut args = vec![
            "serve".to_string(),
            "--operation".to_string(),
            operation.as_str().to_string(),
            "--major".to_string(),
            major.to_string(),
        ];
        if no_cache {
            args.push("--no-cache".to_string());
        }
        Self {
            program,
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A long-lived worker process plus the blocking request channel to it.
#[derive(Debug)]
pub struct WorkerBridge {
    operation: Operation,
    child: Child,
    stdin: ChildStdin,
    frames: Receiver<std::io::Result<Vec<u8>>>,
    timeout: Duration,
}

impl WorkerBridge {
    /// Start the worker process. Spawn failure is fatal and not retried.
    pub fn spawn(operation: Operation, config: &BridgeConfig) -> Result<Self> {
        debug!(%operation, program = %config.program.display(), "spawning worker");

        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ResolverError::WorkerSpawn {
                program: config.program.display().to_string(),
                message: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| ResolverError::WorkerSpawn {
            program: config.program.display().to_string(),
            message: "worker stdin was not captured".to_string(),
        })?;
        let mut stdout = child.stdout.take().ok_or_else(|| ResolverError::WorkerSpawn {
            program: config.program.display().to_string(),
            message: "worker stdout was not captured".to_string(),
        })?;

        // A dedicated reader thread owns the worker's stdout; the caller
        // blocks on the channel with a timeout instead of on the pipe.
        let (sender, frames) = mpsc::channel();
        thread::spawn(move || loop {
            match protocol::read_frame(&mut stdout) {
                Ok(Some(frame)) => {
                    if sender.send(Ok(frame)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = sender.send(Err(std::io::Error::other(e.to_string())));
                    break;
                }
            }
        });

        Ok(Self {
            operation,
            child,
            stdin,
            frames,
            timeout: config.timeout,
        })
    }

    /// Send one request and block until its response or the timeout.
    ///
    /// Taking `&mut self` keeps requests strictly serialized: a second
    /// request cannot be issued until the first returns or times out.
    pub fn request(&mut self, request: &Request) -> Result<(FactPayload, Vec<Warning>)> {
        let payload = serde_json::to_vec(request)?;
        protocol::write_frame(&mut self.stdin, &payload)?;

        let frame = match self.frames.recv_timeout(self.timeout) {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                return Err(ResolverError::Worker {
                    message: e.to_string(),
                })
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!(operation = %self.operation, "bridge timeout");
                return Err(ResolverError::BridgeTimeout {
                    operation: self.operation.as_str().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ResolverError::WorkerClosed {
                    operation: self.operation.as_str().to_string(),
                })
            }
        };

        let response: Response = serde_json::from_slice(&frame)?;
        if !response.ok {
            // Re-raise the worker-side failure with its original message.
            return Err(ResolverError::Worker {
                message: response
                    .error
                    .unwrap_or_else(|| "worker reported an unspecified failure".to_string()),
            });
        }

        let payload = response.result.ok_or_else(|| ResolverError::Protocol {
            message: "successful response carried no result payload".to_string(),
        })?;
        Ok((payload, response.warnings))
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for WorkerBridge {
    fn drop(&mut self) {
        // Closing stdin lets a well-behaved worker exit on EOF; kill covers
        // the rest. The wait reaps the process either way.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

