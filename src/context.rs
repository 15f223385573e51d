//! Caller context detection
//!
//! Where smux was started from decides what it creates: outside tmux it makes
//! its own detached session, inside tmux it adds windows to the caller's
//! session. With `NO_CREATE` the caller's pane itself is the target, and the
//! background relaunch passes that pane down through the environment.

use crate::error::{Error, Result};
use crate::models::PaneTarget;
use crate::multiplexer::Multiplexer;

/// Set by tmux inside every pane
pub const TMUX_ENV_VAR: &str = "TMUX";
/// Marks the backgrounded `NO_CREATE` child process
pub const SUBSHELL_ENV_VAR: &str = "SMUX_SUBSHELL";
/// Window index of the pane that invoked smux
pub const CALLER_WINDOW_ENV_VAR: &str = "CALLER_WINDOW";
/// Pane index of the pane that invoked smux
pub const CALLER_PANE_ENV_VAR: &str = "CALLER_PANE";

/// Where smux is running, passed explicitly into the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    /// Running inside a tmux client
    pub in_session: bool,
    /// Session of the caller, when inside tmux
    pub session_name: Option<String>,
    /// Pane that invoked smux, when inside tmux
    pub caller: Option<PaneTarget>,
    /// This process is the backgrounded `NO_CREATE` child
    pub subshell: bool,
}

impl SessionContext {
    /// Context of a caller outside tmux
    pub fn outside() -> Self {
        Self::default()
    }

    /// Context of a caller inside tmux
    pub fn inside(session_name: impl Into<String>, caller: PaneTarget) -> Self {
        Self {
            in_session: true,
            session_name: Some(session_name.into()),
            caller: Some(caller),
            subshell: false,
        }
    }

    /// Detect the context from the process environment
    pub async fn detect(mux: &dyn Multiplexer) -> Result<Self> {
        Self::detect_with(mux, |key| std::env::var(key).ok()).await
    }

    /// Detect the context using `env` for variable lookups
    pub async fn detect_with<F>(mux: &dyn Multiplexer, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| env(key).is_some_and(|value| !value.is_empty());

        if !set(TMUX_ENV_VAR) {
            debug!("Not running inside tmux");
            return Ok(Self::outside());
        }

        let session_name = mux.session_name().await?;
        let subshell = set(SUBSHELL_ENV_VAR);
        let caller = if subshell {
            PaneTarget::new(
                index_from_env(&env, CALLER_WINDOW_ENV_VAR)?,
                index_from_env(&env, CALLER_PANE_ENV_VAR)?,
            )
        } else {
            PaneTarget::new(mux.current_window().await?, mux.current_pane().await?)
        };

        debug!(
            "Running inside tmux session '{}' from pane {}{}",
            session_name,
            caller,
            if subshell { " (subshell)" } else { "" }
        );

        Ok(Self {
            in_session: true,
            session_name: Some(session_name),
            caller: Some(caller),
            subshell,
        })
    }

    /// Environment handed to the backgrounded `NO_CREATE` child
    pub fn relaunch_env(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![(SUBSHELL_ENV_VAR, "1".to_string())];
        if let Some(caller) = self.caller {
            vars.push((CALLER_WINDOW_ENV_VAR, caller.window.to_string()));
            vars.push((CALLER_PANE_ENV_VAR, caller.pane.to_string()));
        }
        vars
    }
}

fn index_from_env<F>(env: &F, key: &str) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let value = env(key).unwrap_or_default();
    value.trim().parse().map_err(|_| Error::InvalidConfigValue {
        key: key.to_string(),
        value,
        reason: "expected a tmux index".to_string(),
    })
}
