//! Tool Settings
//!
//! Knobs that are about how smux drives tmux rather than about a particular
//! session file: which tmux binary to run, pacing delays, wait defaults and
//! pane limits. Loaded from an optional TOML file, see [`loader`].

pub mod loader;

use crate::wait::WaitDefaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use loader::SettingsLoader;

/// Runtime settings for smux
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// tmux executable, looked up in PATH when not absolute
    pub tmux_binary: String,

    /// Shell used for `#smux shell` directives
    pub shell: PathBuf,

    /// Pause before each line is sent or executed
    pub command_delay_ms: u64,

    /// Pause before a pane's first line, giving the tty time to notice its
    /// final dimensions after the layout settles
    pub pane_settle_ms: u64,

    /// Default polling interval for `waitForString` / `waitForRegex`
    pub default_poll_interval_secs: f64,

    /// Default number of trailing display lines examined by waits
    pub default_capture_lines: usize,

    /// Upper bound for `PANES_PER_WINDOW`
    pub max_panes_per_window: usize,

    /// Upper bound for panes across the whole session
    pub max_total_panes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmux_binary: "tmux".to_string(),
            shell: PathBuf::from("/bin/sh"),
            command_delay_ms: 100,
            pane_settle_ms: 500,
            default_poll_interval_secs: 1.0,
            default_capture_lines: 1,
            max_panes_per_window: 30,
            max_total_panes: 500,
        }
    }
}

impl Settings {
    /// Settings with every delay removed, for driving a mock multiplexer
    pub fn immediate() -> Self {
        Self {
            command_delay_ms: 0,
            pane_settle_ms: 0,
            ..Self::default()
        }
    }

    pub fn command_delay(&self) -> Duration {
        Duration::from_millis(self.command_delay_ms)
    }

    pub fn pane_settle(&self) -> Duration {
        Duration::from_millis(self.pane_settle_ms)
    }

    /// Defaults applied to wait directives that omit the optional arguments.
    /// An interval that does not fit a `Duration` falls back to the built-in one.
    pub fn wait_defaults(&self) -> WaitDefaults {
        let poll_interval = Duration::try_from_secs_f64(self.default_poll_interval_secs)
            .unwrap_or_else(|_| WaitDefaults::default().poll_interval);
        WaitDefaults {
            poll_interval,
            lines: self.default_capture_lines,
        }
    }

    /// Check the settings for values smux cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tmux_binary.trim().is_empty() {
            return Err(SettingsError::EmptyTmuxBinary);
        }
        if self.shell.as_os_str().is_empty() {
            return Err(SettingsError::EmptyShell);
        }
        let interval = self.default_poll_interval_secs;
        if interval <= 0.0 || Duration::try_from_secs_f64(interval).is_err() {
            return Err(SettingsError::InvalidPollInterval(self.default_poll_interval_secs));
        }
        if self.default_capture_lines == 0 {
            return Err(SettingsError::InvalidCaptureLines);
        }
        if self.max_panes_per_window == 0 || self.max_panes_per_window > self.max_total_panes {
            return Err(SettingsError::InvalidPaneLimits {
                per_window: self.max_panes_per_window,
                total: self.max_total_panes,
            });
        }
        Ok(())
    }
}

/// Settings validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("tmux_binary cannot be empty")]
    EmptyTmuxBinary,

    #[error("shell cannot be empty")]
    EmptyShell,

    #[error("Invalid default poll interval: {0} (must be a positive number of seconds)")]
    InvalidPollInterval(f64),

    #[error("default_capture_lines must be at least 1")]
    InvalidCaptureLines,

    #[error("Invalid pane limits: {per_window} per window, {total} total")]
    InvalidPaneLimits { per_window: usize, total: usize },
}

impl SettingsError {
    /// Name of the offending settings field
    pub fn field(&self) -> &'static str {
        match self {
            SettingsError::EmptyTmuxBinary => "tmux_binary",
            SettingsError::EmptyShell => "shell",
            SettingsError::InvalidPollInterval(_) => "default_poll_interval_secs",
            SettingsError::InvalidCaptureLines => "default_capture_lines",
            SettingsError::InvalidPaneLimits { .. } => "max_panes_per_window",
        }
    }
}

impl From<SettingsError> for crate::error::Error {
    fn from(err: SettingsError) -> Self {
        crate::error::Error::ConfigValidationFailed {
            field: err.field().to_string(),
            reason: err.to_string(),
        }
    }
}
