//! Line Dispatch
//!
//! Feeds one pane's digested lines to tmux, interpreting `#smux` directives
//! along the way. Everything here runs on the pane's own task; a `sleep` or a
//! wait only holds up the pane that asked for it.

use crate::config::Settings;
use crate::directive::{parse_line, Directive, Line};
use crate::error::Result;
use crate::execution::ShellExecutor;
use crate::models::{CommandGroup, PaneTarget};
use crate::multiplexer::Multiplexer;
use crate::wait::{wait_for, WaitDefaults};
use std::sync::Arc;
use std::time::Duration;

/// Executes command lines against panes of one session
pub struct Dispatcher {
    mux: Arc<dyn Multiplexer>,
    executor: ShellExecutor,
    wait_defaults: WaitDefaults,
    command_delay: Duration,
    pane_settle: Duration,
}

impl Dispatcher {
    pub fn new(mux: Arc<dyn Multiplexer>, settings: &Settings, session_name: Option<String>) -> Self {
        Self {
            mux,
            executor: ShellExecutor::from_settings(settings, session_name),
            wait_defaults: settings.wait_defaults(),
            command_delay: settings.command_delay(),
            pane_settle: settings.pane_settle(),
        }
    }

    /// Send a whole group to `target`, stopping at the first failing line
    pub async fn run_group(&self, group: &CommandGroup, target: PaneTarget) -> Result<()> {
        // Let the tty pick up its final size before anything draws in it
        if !self.pane_settle.is_zero() {
            tokio::time::sleep(self.pane_settle).await;
        }

        let lines = group.digested();
        debug!("Pane {}: dispatching {} line(s)", target, lines.len());
        for line in &lines {
            self.dispatch(line, target).await?;
        }
        debug!("Pane {}: done", target);
        Ok(())
    }

    /// Interpret and execute a single digested line
    pub async fn dispatch(&self, line: &str, target: PaneTarget) -> Result<()> {
        if !self.command_delay.is_zero() {
            tokio::time::sleep(self.command_delay).await;
        }
        let parsed = parse_line(line, &self.wait_defaults)?;
        self.execute(parsed, target).await
    }

    /// Execute an already classified line
    pub async fn execute(&self, line: Line, target: PaneTarget) -> Result<()> {
        match line {
            Line::Literal(text) => {
                trace!("Pane {} <- {:?}", target, text);
                self.mux.send_literal(target, &text).await
            }
            Line::Directive(directive) => self.execute_directive(directive, target).await,
        }
    }

    async fn execute_directive(&self, directive: Directive, target: PaneTarget) -> Result<()> {
        trace!("Pane {} directive {}", target, directive.name());
        match directive {
            Directive::PasteBuffer(args) => self.mux.paste_buffer(target, &args).await,
            Directive::SendKeys(args) => self.mux.send_keys(target, &args).await,
            Directive::WaitForString(request) | Directive::WaitForRegex(request) => {
                wait_for(self.mux.as_ref(), target, &request).await?;
                Ok(())
            }
            Directive::Shell(command) => {
                match self.executor.run(&command, target).await {
                    Ok(status) if !status.success() => {
                        warn!("Pane {}: shell directive '{}' exited with {}", target, command, status)
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Pane {}: {}", target, e),
                }
                Ok(())
            }
            Directive::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }
}
