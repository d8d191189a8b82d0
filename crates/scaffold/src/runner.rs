//! Runner - executes one plugin subprocess per call.
//!
//! Flow:
//! 1. Encode the request
//! 2. Spawn the plugin inside its dir context (stdin/stdout piped, stderr inherited)
//! 3. Feed stdin and drain stdout on separate tasks so neither pipe can fill up
//! 4. Wait for exit, optionally bounded by a timeout
//! 5. Classify: non-zero exit, undecodable output, or a decoded response

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tracing::Instrument;

use crate::bridge::codec::{CodecError, decode_response, encode_request};
use crate::bridge::protocol::{PluginReportedError, PluginRequest, PluginResponse};
use crate::descriptor::ExternalPlugin;

/// Identifier attached to every invocation's tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(uuid::Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extension point for how a plugin process is launched.
///
/// Implementations only build the base command. The runner always applies
/// the working directory and stdio wiring on top, so the protocol contract
/// holds for every spawner.
pub trait PluginSpawner: Send + Sync {
    fn command(&self, plugin: &ExternalPlugin) -> Command;
}

/// Runs the plugin's executable directly, with no arguments.
pub struct ProcessSpawner;

impl PluginSpawner for ProcessSpawner {
    fn command(&self, plugin: &ExternalPlugin) -> Command {
        Command::new(&plugin.path)
    }
}

#[derive(Clone)]
pub struct RunnerConfig {
    /// `None` waits for the plugin indefinitely.
    pub timeout: Option<Duration>,
    pub spawner: Arc<dyn PluginSpawner>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self {
            timeout: None,
            spawner: Arc::new(ProcessSpawner),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn PluginSpawner>) -> Self {
        self.spawner = spawner;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to spawn plugin {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("plugin i/o failed: {0}")]
    Io(#[from] io::Error),

    /// Plugin exited non-zero. Its stdout is kept as diagnostic text only.
    #[error("plugin failed ({status}){}", stdout_suffix(.stdout))]
    Execution { status: ExitStatus, stdout: String },

    #[error("plugin timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Reported(#[from] PluginReportedError),
}

impl RunError {
    /// Captured stdout of a plugin that exited non-zero.
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Execution { stdout, .. } => Some(stdout),
            _ => None,
        }
    }
}

fn stdout_suffix(stdout: &str) -> String {
    let trimmed = stdout.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("; stdout: {trimmed}")
    }
}

/// Executes plugins according to a [`RunnerConfig`].
///
/// Each call spawns at most one subprocess and never retries.
pub struct PluginRunner {
    config: RunnerConfig,
}

impl Default for PluginRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl PluginRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Send `request` to the plugin and decode its response.
    ///
    /// Requires `plugin.dir_context` to exist. A response with `error = true`
    /// is returned as-is; use [`PluginRunner::run`] or
    /// [`PluginResponse::into_result`] to turn it into an error.
    pub async fn invoke(
        &self,
        plugin: &ExternalPlugin,
        request: &PluginRequest,
    ) -> Result<PluginResponse, RunError> {
        let id = InvocationId::new();
        let span = tracing::info_span!(
            "plugin_invocation",
            %id,
            plugin = %plugin,
            command = %request.command
        );

        async {
            let input = encode_request(request)?;
            let output = self.execute(plugin, input).await?;
            let response = decode_response(&output)?;
            if response.command != request.command {
                tracing::debug!(
                    echoed = %response.command,
                    "Plugin echoed a different command"
                );
            }
            tracing::debug!(
                files = response.universe.len(),
                error = response.error,
                "Decoded response"
            );
            Ok::<_, RunError>(response)
        }
        .instrument(span)
        .await
    }

    /// [`PluginRunner::invoke`], failing with [`RunError::Reported`] when the
    /// plugin sets its error flag.
    pub async fn run(
        &self,
        plugin: &ExternalPlugin,
        request: &PluginRequest,
    ) -> Result<PluginResponse, RunError> {
        let response = self.invoke(plugin, request).await?;
        Ok(response.into_result()?)
    }

    /// Raw transport: feed `input` to the plugin and return its stdout.
    pub async fn execute(
        &self,
        plugin: &ExternalPlugin,
        input: Vec<u8>,
    ) -> Result<Vec<u8>, RunError> {
        let mut cmd = self.config.spawner.command(plugin);
        cmd.current_dir(&plugin.dir_context)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        // Own process group, so a timeout also reaches wrapper-spawned children.
        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(
            path = %plugin.path.display(),
            dir = %plugin.dir_context.display(),
            input_bytes = input.len(),
            "Spawning plugin"
        );
        let started = Instant::now();

        let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
            path: plugin.path.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("plugin stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("plugin stdout not captured"))?;

        let writer = tokio::spawn(write_input(stdin, input));
        let reader = tokio::spawn(read_output(stdout));
        let writer_abort = writer.abort_handle();
        let reader_abort = reader.abort_handle();

        let finished = async {
            let status = child.wait().await?;
            let output = reader.await.map_err(io::Error::other)??;
            let write_result = writer.await.map_err(io::Error::other)?;
            Ok::<_, io::Error>((status, output, write_result))
        };

        let outcome = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, finished).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "Plugin timed out, killing it");
                    #[cfg(unix)]
                    kill_process_group(child.id());
                    if let Err(e) = child.kill().await {
                        tracing::warn!(error = %e, "Failed to kill timed-out plugin");
                    }
                    writer_abort.abort();
                    reader_abort.abort();
                    return Err(RunError::Timeout(limit));
                }
            },
            None => finished.await,
        };
        let (status, output, write_result) = outcome?;

        tracing::debug!(
            %status,
            output_bytes = output.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Plugin exited"
        );

        if !status.success() {
            if let Err(e) = &write_result {
                tracing::debug!(error = %e, "Input write failed before plugin exited");
            }
            return Err(RunError::Execution {
                status,
                stdout: String::from_utf8_lossy(&output).into_owned(),
            });
        }

        match write_result {
            Ok(()) => {}
            // Plugin is allowed to exit without consuming all of its input.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Plugin closed stdin before reading the full request");
            }
            Err(e) => return Err(RunError::Io(e)),
        }

        Ok(output)
    }
}

/// SIGKILL every process in the plugin's group. The group id equals the
/// child's pid because it was spawned with `process_group(0)`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::debug!(error = %e, pid, "Failed to signal plugin process group");
    }
}

async fn write_input(mut stdin: ChildStdin, input: Vec<u8>) -> io::Result<()> {
    stdin.write_all(&input).await?;
    stdin.flush().await?;
    // Dropping closes the pipe so the plugin sees EOF.
    drop(stdin);
    Ok(())
}

async fn read_output(mut stdout: ChildStdout) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf).await?;
    Ok(buf)
}
