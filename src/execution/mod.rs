//! Host shell execution for `#smux shell`
//!
//! The command runs on the machine smux runs on, not inside the pane, through
//! `sh -c` with `$window`, `$pane` and `$session_name` exported. Its standard
//! streams are detached so it can never steal the terminal from tmux.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::PaneTarget;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Runs `#smux shell` commands for one session
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    /// Shell binary, invoked as `<shell> -c <command>`
    shell: PathBuf,
    /// Exported as `$session_name` when known
    session_name: Option<String>,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<PathBuf>, session_name: Option<String>) -> Self {
        Self {
            shell: shell.into(),
            session_name,
        }
    }

    pub fn from_settings(settings: &Settings, session_name: Option<String>) -> Self {
        Self::new(settings.shell.clone(), session_name)
    }

    /// Run `command` on behalf of `target` and wait for it to exit
    pub async fn run(&self, command: &str, target: PaneTarget) -> Result<ExitStatus> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .env("window", target.window.to_string())
            .env("pane", target.pane.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(session_name) = &self.session_name {
            cmd.env("session_name", session_name);
        }

        debug!("Pane {} running shell command: {}", target, command);
        cmd.status().await.map_err(|e| {
            Error::Other(format!(
                "Failed to start {} for shell directive: {}",
                self.shell.display(),
                e
            ))
        })
    }
}
