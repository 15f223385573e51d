//! Multiplexer Abstraction
//!
//! Everything smux asks of tmux goes through [`Multiplexer`]. The interpreter,
//! waits and orchestration only see this trait, which keeps them testable with
//! a recording mock and keeps tmux argument plumbing in one place.

pub mod tmux;


use crate::error::Result;
use crate::models::{Layout, PaneTarget};
use async_trait::async_trait;

pub use tmux::TmuxMultiplexer;

/// A detached session created by smux
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Session name tmux picked
    pub name: String,
    /// Index of the session's initial window
    pub window: usize,
}

/// Operations smux performs against the terminal multiplexer
///
/// Implementations must tolerate concurrent calls from several pane tasks.
/// Every pane-level call carries an explicit [`PaneTarget`], so calls aimed at
/// different panes never race on shared "current pane" state.
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Bind subsequent calls to an existing session
    fn bind_session(&self, name: &str);

    /// Create a detached session sized to the caller's terminal
    async fn new_session(&self) -> Result<NewSession>;

    /// Create a window in the bound session, returning its index
    async fn new_window(&self) -> Result<usize>;

    /// Split the active pane of `window`, leaving the active pane unchanged
    async fn split_window(&self, window: usize) -> Result<()>;

    /// Apply a preset layout to `window`
    async fn select_layout(&self, window: usize, layout: Layout) -> Result<()>;

    /// Pane indices of `window`, in tmux order
    async fn list_panes(&self, window: usize) -> Result<Vec<usize>>;

    /// Type `text` into the pane literally, followed by Enter
    async fn send_literal(&self, target: PaneTarget, text: &str) -> Result<()>;

    /// `send-keys` with the pane pre-bound; keys are interpreted by tmux
    async fn send_keys(&self, target: PaneTarget, args: &[String]) -> Result<()>;

    /// `paste-buffer` with the pane pre-bound
    async fn paste_buffer(&self, target: PaneTarget, args: &[String]) -> Result<()>;

    /// Visible contents of the pane
    async fn capture_pane(&self, target: PaneTarget) -> Result<String>;

    /// Window index of the calling pane
    async fn current_window(&self) -> Result<usize>;

    /// Pane index of the calling pane
    async fn current_pane(&self) -> Result<usize>;

    /// Name of the session the caller is attached to
    async fn session_name(&self) -> Result<String>;

    /// Attach the terminal to the bound session, returning when it detaches
    async fn attach_session(&self) -> Result<()>;
}
