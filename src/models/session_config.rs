//! Session Options
//!
//! The handful of options a session file can set in its header block,
//! before the first `---` delimiter.

use super::Layout;
use crate::error::{Error, Result};

/// Header key for the number of panes carved into each window
pub const PANES_PER_WINDOW: &str = "PANES_PER_WINDOW";
/// Header key for the layout preset
pub const LAYOUT: &str = "LAYOUT";
/// Bare header flag: reuse the caller's pane instead of creating one
pub const NO_CREATE: &str = "NO_CREATE";
/// Bare header flag: feed every pane from its own task
pub const USE_THREADS: &str = "USE_THREADS";

/// Options recognized in a session file header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Panes per window; `None` means "all groups in a single window"
    pub panes_per_window: Option<usize>,

    /// Layout applied to every carved window
    pub layout: Layout,

    /// Send the single group to the caller's pane when already inside tmux
    pub no_create: bool,

    /// Run each pane's command sequence concurrently
    pub use_threads: bool,
}

impl SessionConfig {
    /// Apply a single `KEY = value` header entry.
    ///
    /// Returns `Ok(false)` for keys we do not know so the caller can warn;
    /// known keys with bad values are errors.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            PANES_PER_WINDOW => {
                let panes = value
                    .parse::<usize>()
                    .map_err(|e| Error::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: e.to_string(),
                    })?;
                self.panes_per_window = Some(panes);
            }
            LAYOUT => {
                self.layout = value.parse().map_err(|reason| Error::InvalidConfigValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                })?;
            }
            NO_CREATE | USE_THREADS => {
                let enabled = parse_flag(value).ok_or_else(|| Error::InvalidConfigValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "expected a boolean (true/false, yes/no, 1/0)".to_string(),
                })?;
                if key == NO_CREATE {
                    self.no_create = enabled;
                } else {
                    self.use_threads = enabled;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Apply a bare header line such as `NO_CREATE`.
    ///
    /// Returns `false` if the word is not one of the bare flags.
    pub fn apply_flag(&mut self, flag: &str) -> bool {
        match flag {
            NO_CREATE => self.no_create = true,
            USE_THREADS => self.use_threads = true,
            _ => return false,
        }
        true
    }

    /// Effective panes per window for `group_count` groups
    pub fn effective_panes_per_window(&self, group_count: usize) -> usize {
        self.panes_per_window.unwrap_or(group_count)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
