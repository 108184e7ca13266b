//! Process launcher.
//!
//! Runs one [`InvocationPlan`] to completion and returns its stdout.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use process_utils::quote;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, error, info, warn};

use super::plan::{Invocation, InvocationPlan};
use super::staging::StagingArea;
use crate::{Error, Result};

/// Executes invocation plans.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run the plan and return stdout with trailing whitespace removed.
    ///
    /// A non-zero exit fails with [`Error::ExternalTool`].
    async fn run(&self, plan: &InvocationPlan) -> Result<String>;
}

/// Launcher backed by real child processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    staging: StagingArea,
    /// `None` waits forever.
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new(staging: StagingArea) -> Self {
        Self {
            staging,
            timeout: None,
        }
    }

    /// Kill invocations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    async fn execute(&self, tool: &str, argv: &[String], stdin: Stdio) -> Result<String> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Other(format!("Empty command line for {tool}")))?;

        let start = Instant::now();
        debug!(tool, program = %program, args = args.len(), "Spawning tool");

        let mut cmd = process_utils::tokio_command(program);
        cmd.args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            program: tool.to_string(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let waited = {
            let wait = async {
                let (status, stdout, stderr) =
                    tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))?;
                Ok::<_, std::io::Error>(Output {
                    status,
                    stdout,
                    stderr,
                })
            };
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, wait).await.ok(),
                None => Some(wait.await),
            }
        };

        let output = match waited {
            Some(output) => output?,
            None => {
                let timeout_secs = self.timeout.map_or(0, |t| t.as_secs());
                kill_child(tool, &mut child).await;
                error!(tool, timeout_secs, "Tool timed out, killed");
                return Err(Error::Timeout {
                    program: tool.to_string(),
                    timeout_secs,
                });
            }
        };

        let elapsed = start.elapsed().as_secs_f64();

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(tool, exit_code, elapsed_secs = elapsed, "Tool failed: {}", stderr);
            return Err(Error::external_tool(tool, exit_code, stderr));
        }

        if !output.stderr.is_empty() {
            debug!(tool, "stderr: {}", String::from_utf8_lossy(&output.stderr).trim_end());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        info!(tool, elapsed_secs = elapsed, bytes = stdout.len(), "Tool finished");
        Ok(stdout)
    }

    /// Stage `input`, run `f` with the staged path, then remove the file.
    ///
    /// A tool error wins over a cleanup error.
    async fn with_staged<F, Fut>(&self, tool: &str, input: &str, f: F) -> Result<String>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let staged = self.staging.stage(input)?;
        let result = f(staged.path().to_path_buf()).await;

        match (staged.remove(), result) {
            (Ok(()), result) => result,
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(tool_err)) => {
                warn!(tool, "Failed to remove staging file: {}", e);
                Err(tool_err)
            }
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill a timed-out child while it is still ours to kill.
///
/// On Windows the child may be `powershell.exe` with the tool below it, so
/// the whole tree goes first.
async fn kill_child(tool: &str, child: &mut Child) {
    #[cfg(windows)]
    if let Some(pid) = child.id()
        && let Err(e) = process_utils::kill_tree(pid).await
    {
        warn!(tool, pid, "Failed to kill process tree: {}", e);
    }

    if let Err(e) = child.kill().await {
        debug!(tool, "Kill after timeout failed: {}", e);
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn run(&self, plan: &InvocationPlan) -> Result<String> {
        let tool = plan.tool.as_str();
        match &plan.invocation {
            Invocation::Direct { argv } => self.execute(tool, argv, Stdio::null()).await,
            Invocation::Wrapped { wrapper, argv } => {
                let full: Vec<String> = wrapper.iter().chain(argv.iter()).cloned().collect();
                self.execute(tool, &full, Stdio::null()).await
            }
            Invocation::StagedStdin { argv, input } => {
                self.with_staged(tool, input, |path| async move {
                    let file = std::fs::File::open(&path)
                        .map_err(|e| Error::staging("opening", &path, e))?;
                    self.execute(tool, argv, Stdio::from(file)).await
                })
                .await
            }
            Invocation::ShellPiped {
                shell,
                consumer,
                input,
            } => {
                self.with_staged(tool, input, |path| async move {
                    let mut full = shell.clone();
                    full.push(quote::pipe_file_into(&path.to_string_lossy(), consumer));
                    self.execute(tool, &full, Stdio::null()).await
                })
                .await
            }
        }
    }
}
