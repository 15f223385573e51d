//! tmux backend
//!
//! Shells out to the `tmux` binary for every operation. Pane-level commands
//! always carry an exact `-t =session:window.pane` target, so concurrent pane
//! tasks never depend on which pane tmux considers active.

use super::{Multiplexer, NewSession};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{Layout, PaneTarget};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::RwLock;
use tokio::process::Command;

/// Multiplexer backed by the tmux command line client
pub struct TmuxMultiplexer {
    binary: String,
    session: RwLock<Option<String>>,
}

impl TmuxMultiplexer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            session: RwLock::new(None),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.tmux_binary.clone())
    }

    /// Session every window and pane target is resolved against
    fn session(&self, command: &str) -> Result<String> {
        self.session
            .read()
            .ok()
            .and_then(|session| session.clone())
            .ok_or_else(|| Error::Multiplexer {
                command: command.to_string(),
                reason: "no tmux session bound".to_string(),
            })
    }

    fn window_target(&self, command: &str, window: usize) -> Result<String> {
        Ok(format!("={}:{}", self.session(command)?, window))
    }

    fn pane_target(&self, command: &str, target: PaneTarget) -> Result<String> {
        Ok(target.tmux_target(&self.session(command)?))
    }

    /// Run a tmux command and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = render_command(&self.binary, args);
        trace!("Running {}", command);

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::MultiplexerUnavailable {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Multiplexer {
                command,
                reason: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `display-message -p` relative to the pane smux was started from
    async fn display(&self, format: &str) -> Result<String> {
        let caller = std::env::var("TMUX_PANE").ok().filter(|pane| !pane.is_empty());
        let mut args = vec!["display-message", "-p"];
        if let Some(pane) = caller.as_deref() {
            args.extend(["-t", pane]);
        }
        args.push(format);
        Ok(self.run(&args).await?.trim().to_string())
    }

    async fn display_index(&self, format: &str) -> Result<usize> {
        let raw = self.display(format).await?;
        raw.parse().map_err(|_| Error::Multiplexer {
            command: format!("display-message -p {}", format),
            reason: format!("expected an index, got '{}'", raw),
        })
    }
}

#[async_trait]
impl Multiplexer for TmuxMultiplexer {
    fn bind_session(&self, name: &str) {
        if let Ok(mut session) = self.session.write() {
            *session = Some(name.to_string());
        }
    }

    async fn new_session(&self) -> Result<NewSession> {
        let size = terminal_size().await;
        let (cols, rows) = size.map(|(rows, cols)| (cols.to_string(), rows.to_string())).unzip();

        let mut args = vec!["new-session", "-d"];
        if let (Some(cols), Some(rows)) = (cols.as_deref(), rows.as_deref()) {
            args.extend(["-x", cols, "-y", rows]);
        }
        args.extend(["-P", "-F", "#{session_name}:#{window_index}"]);

        let output = self.run(&args).await?;
        let session = parse_new_session(&output).ok_or_else(|| Error::Multiplexer {
            command: "new-session".to_string(),
            reason: format!("unexpected output '{}'", output.trim()),
        })?;

        info!("Created tmux session '{}'", session.name);
        self.bind_session(&session.name);
        Ok(session)
    }

    async fn new_window(&self) -> Result<usize> {
        let target = format!("={}:", self.session("new-window")?);
        let output = self
            .run(&["new-window", "-t", target.as_str(), "-P", "-F", "#{window_index}"])
            .await?;
        output.trim().parse().map_err(|_| Error::Multiplexer {
            command: "new-window".to_string(),
            reason: format!("unexpected output '{}'", output.trim()),
        })
    }

    async fn split_window(&self, window: usize) -> Result<()> {
        let target = self.window_target("split-window", window)?;
        self.run(&["split-window", "-d", "-h", "-t", target.as_str()]).await?;
        Ok(())
    }

    async fn select_layout(&self, window: usize, layout: Layout) -> Result<()> {
        let target = self.window_target("select-layout", window)?;
        self.run(&["select-layout", "-t", target.as_str(), layout.as_str()])
            .await?;
        Ok(())
    }

    async fn list_panes(&self, window: usize) -> Result<Vec<usize>> {
        let target = self.window_target("list-panes", window)?;
        let output = self
            .run(&["list-panes", "-t", target.as_str(), "-F", "#{pane_index}"])
            .await?;
        parse_pane_list(&output).ok_or_else(|| Error::Multiplexer {
            command: "list-panes".to_string(),
            reason: format!("unexpected output '{}'", output.trim()),
        })
    }

    async fn send_literal(&self, target: PaneTarget, text: &str) -> Result<()> {
        let target = self.pane_target("send-keys", target)?;
        self.run(&["send-keys", "-t", target.as_str(), "-l", "--", text])
            .await?;
        self.run(&["send-keys", "-t", target.as_str(), "Enter"]).await?;
        Ok(())
    }

    async fn send_keys(&self, target: PaneTarget, args: &[String]) -> Result<()> {
        let target = self.pane_target("send-keys", target)?;
        let mut argv = vec!["send-keys", "-t", target.as_str()];
        argv.extend(args.iter().map(String::as_str));
        self.run(&argv).await?;
        Ok(())
    }

    async fn paste_buffer(&self, target: PaneTarget, args: &[String]) -> Result<()> {
        let target = self.pane_target("paste-buffer", target)?;
        let mut argv = vec!["paste-buffer", "-t", target.as_str()];
        argv.extend(args.iter().map(String::as_str));
        self.run(&argv).await?;
        Ok(())
    }

    async fn capture_pane(&self, target: PaneTarget) -> Result<String> {
        let target = self.pane_target("capture-pane", target)?;
        self.run(&["capture-pane", "-p", "-N", "-t", target.as_str()]).await
    }

    async fn current_window(&self) -> Result<usize> {
        self.display_index("#{window_index}").await
    }

    async fn current_pane(&self) -> Result<usize> {
        self.display_index("#{pane_index}").await
    }

    async fn session_name(&self) -> Result<String> {
        self.display("#{session_name}").await
    }

    async fn attach_session(&self) -> Result<()> {
        let target = format!("={}", self.session("attach-session")?);
        let status = Command::new(&self.binary)
            .args(["attach-session", "-t", target.as_str()])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::MultiplexerUnavailable {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::Multiplexer {
                command: render_command(&self.binary, &["attach-session", "-t", target.as_str()]),
                reason: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

/// Rows and columns of the controlling terminal, via `stty size`
async fn terminal_size() -> Option<(u16, u16)> {
    let output = Command::new("stty")
        .arg("size")
        .stdin(Stdio::inherit())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        debug!("stty size failed, letting tmux pick the session size");
        return None;
    }
    parse_terminal_size(&String::from_utf8_lossy(&output.stdout))
}

fn parse_terminal_size(output: &str) -> Option<(u16, u16)> {
    let mut fields = output.split_whitespace();
    let rows = fields.next()?.parse().ok()?;
    let cols = fields.next()?.parse().ok()?;
    (rows > 0 && cols > 0).then_some((rows, cols))
}

fn parse_new_session(output: &str) -> Option<NewSession> {
    let (name, window) = output.trim().rsplit_once(':')?;
    Some(NewSession {
        name: name.to_string(),
        window: window.parse().ok()?,
    })
}

fn parse_pane_list(output: &str) -> Option<Vec<usize>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.parse().ok())
        .collect()
}

fn render_command(binary: &str, args: &[&str]) -> String {
    std::iter::once(binary)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
