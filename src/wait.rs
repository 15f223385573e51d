//! Pane Output Waits
//!
//! Expect-style blocking for `waitForString` and `waitForRegex`. The pane is
//! polled with `capture-pane`, so a wait only works reliably for text that
//! stays on screen until input arrives (shell or password prompts), not for a
//! line scrolling by in a streaming log.
//!
//! There is no timeout. A wait blocks its pane's task until the text shows up
//! or the process is killed; bounded waits are composed outside smux.

use crate::error::Result;
use crate::models::PaneTarget;
use crate::multiplexer::Multiplexer;
use regex::Regex;
use std::time::Duration;

/// What a wait is looking for
#[derive(Debug, Clone)]
pub enum Needle {
    /// Plain substring
    Literal(String),
    /// Regular expression, searched anywhere in the haystack
    Pattern(Regex),
}

impl Needle {
    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Needle::Literal(needle) => haystack.contains(needle.as_str()),
            Needle::Pattern(regex) => regex.is_match(haystack),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Needle::Literal(needle) => needle,
            Needle::Pattern(regex) => regex.as_str(),
        }
    }
}

/// Values used when a wait directive omits its optional arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitDefaults {
    pub poll_interval: Duration,
    pub lines: usize,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            lines: 1,
        }
    }
}

/// A single wait, built per directive and dropped once it resolves
#[derive(Debug, Clone)]
pub struct WaitRequest {
    pub needle: Needle,
    /// Delay before every capture, including the first
    pub poll_interval: Duration,
    /// Trailing display lines of the pane that are examined
    pub lines: usize,
}

/// Block until `request` matches the bottom of `target`.
///
/// Returns the number of captures taken. Empty captures count as "not yet".
pub async fn wait_for(
    mux: &dyn Multiplexer,
    target: PaneTarget,
    request: &WaitRequest,
) -> Result<usize> {
    debug!(
        "Pane {} waiting for {:?} (every {:?}, last {} line(s))",
        target,
        request.needle.as_str(),
        request.poll_interval,
        request.lines
    );

    let mut polls = 0;
    loop {
        tokio::time::sleep(request.poll_interval).await;
        polls += 1;

        let captured = mux.capture_pane(target).await?;
        let text = haystack(&captured, request.lines);
        if request.needle.is_match(&text) {
            debug!("Pane {} matched after {} poll(s)", target, polls);
            return Ok(polls);
        }
        trace!("Pane {} poll {}: no match in {:?}", target, polls, text);
    }
}

/// The last `lines` display lines of a capture, joined without separators so
/// a needle wrapped across physical lines still matches. Blank rows below the
/// cursor are skipped; trailing spaces on a prompt row are kept.
pub fn haystack(captured: &str, lines: usize) -> String {
    let mut rows: Vec<&str> = captured.lines().collect();
    while rows.last().is_some_and(|row| row.trim().is_empty()) {
        rows.pop();
    }
    let start = rows.len().saturating_sub(lines);
    rows[start..].concat()
}
