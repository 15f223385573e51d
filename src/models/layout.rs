//! Window Layout Presets
//!
//! The five pane arrangements tmux ships with. Anything else in a session
//! file is rejected when the header is parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the tmux preset layouts applied to a carved window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Panes spread left to right, equal width
    EvenHorizontal,
    /// Panes spread top to bottom, equal height
    EvenVertical,
    /// One large pane on top, the rest below
    MainHorizontal,
    /// One large pane on the left, the rest to the right
    MainVertical,
    /// Panes spread as evenly as possible in rows and columns
    #[default]
    Tiled,
}

impl Layout {
    /// All layouts, in the order tmux documents them
    pub const ALL: [Layout; 5] = [
        Layout::EvenHorizontal,
        Layout::EvenVertical,
        Layout::MainHorizontal,
        Layout::MainVertical,
        Layout::Tiled,
    ];

    /// The name `select-layout` expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::EvenHorizontal => "even-horizontal",
            Layout::EvenVertical => "even-vertical",
            Layout::MainHorizontal => "main-horizontal",
            Layout::MainVertical => "main-vertical",
            Layout::Tiled => "tiled",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .iter()
            .copied()
            .find(|layout| layout.as_str() == s.trim())
            .ok_or_else(|| {
                let names: Vec<&str> = Layout::ALL.iter().map(Layout::as_str).collect();
                format!("expected one of {}", names.join(", "))
            })
    }
}
