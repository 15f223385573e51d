//! Command Group Model
//!
//! One group of lines from a session file, destined for a single pane.

use crate::preprocess::digest_commands;

/// Ordered raw lines for one pane, as they appeared between two delimiters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandGroup {
    lines: Vec<String>,
}

impl CommandGroup {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Raw lines, comments and continuations untouched
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines ready for dispatch: comments gone, directive continuations joined
    pub fn digested(&self) -> Vec<String> {
        digest_commands(&self.lines)
    }
}

impl<S: Into<String>> FromIterator<S> for CommandGroup {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
