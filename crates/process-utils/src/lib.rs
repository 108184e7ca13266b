//! Small process-related helpers shared across the workspace.
//!
//! - Children spawned without a console window on Windows
//! - Whole-tree termination for children that run behind a shell on Windows
//! - [`quote`]: the only place in the workspace that turns argument lists into
//!   shell command strings

use std::ffi::OsStr;

pub mod quote;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Apply the Windows `CREATE_NO_WINDOW` flag to child processes.
///
/// On non-Windows targets this is a no-op.
pub trait NoWindowExt {
    fn no_window(&mut self) -> &mut Self;
}

#[cfg(feature = "tokio")]
impl NoWindowExt for tokio::process::Command {
    fn no_window(&mut self) -> &mut Self {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            self.as_std_mut().creation_flags(CREATE_NO_WINDOW);
        }
        self
    }
}

/// Create a `tokio::process::Command` for a tool invocation.
///
/// The child never opens a console window and is killed if the owning future
/// is dropped, so an abandoned request cannot leak a running tool.
#[cfg(feature = "tokio")]
pub fn tokio_command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.no_window().kill_on_drop(true);
    cmd
}

/// Forcefully terminate `pid` and every process it started.
///
/// `kill_on_drop` only reaches the direct child. A tool launched through
/// `powershell -Command` keeps running unless the whole tree goes.
#[cfg(all(feature = "tokio", windows))]
pub async fn kill_tree(pid: u32) -> std::io::Result<()> {
    let status = tokio_command("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!(
            "taskkill exited with {status} for pid {pid}"
        )))
    }
}
