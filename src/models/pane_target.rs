//! Pane Addressing

use std::fmt;

/// A `(window, pane)` coordinate inside the smux session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneTarget {
    pub window: usize,
    pub pane: usize,
}

impl PaneTarget {
    pub fn new(window: usize, pane: usize) -> Self {
        Self { window, pane }
    }

    /// tmux target string, exact-matching the session name
    pub fn tmux_target(&self, session: &str) -> String {
        format!("={}:{}.{}", session, self.window, self.pane)
    }
}

impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.window, self.pane)
    }
}
