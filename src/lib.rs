//! smux - feed groups of shell commands into their own tmux panes
//!
//! A session file lists options and groups of commands. smux carves tmux
//! windows into panes, one per group, and types each group's commands into
//! its pane as if a user had entered them by hand. In-band `#smux` directives
//! add waits, sleeps, raw key sequences and host shell commands.
//!
//! ## Module Organization
//!
//! - [`session_file`] - Session file parsing (header options, command groups)
//! - [`preprocess`] - Comment stripping and directive line joining
//! - [`directive`] - `#smux` directive parsing
//! - [`dispatch`] - Per-pane line execution
//! - [`wait`] - `waitForString` / `waitForRegex` polling
//! - [`execution`] - Host shell commands for `#smux shell`
//! - [`orchestrator`] - Window and pane creation, sequential or per-pane tasks
//! - [`multiplexer`] - The tmux abstraction and its tmux backend
//! - [`context`] - Where smux was started from
//! - [`config`] - Tool settings file
//! - [`models`] - Session options, layouts, groups and pane coordinates
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use smux::{Multiplexer, RunSummary, SessionContext, SessionFile, Settings, TmuxMultiplexer};
//! use std::sync::Arc;
//!
//! # async fn demo() -> smux::Result<()> {
//! let settings = Settings::default();
//! let session = SessionFile::parse("PANES_PER_WINDOW = 2\n---\ntop\n---\nhtop\n")?;
//! let mux: Arc<dyn Multiplexer> = Arc::new(TmuxMultiplexer::from_settings(&settings));
//! let context = SessionContext::detect(mux.as_ref()).await?;
//! smux::create(mux, settings, context, session, None::<fn(&RunSummary)>).await?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod config;
pub mod context;
pub mod directive;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod models;
pub mod multiplexer;
pub mod orchestrator;
pub mod preprocess;
pub mod session_file;
pub mod wait;

// Re-exports for core functionality
pub use config::{Settings, SettingsLoader};
pub use context::SessionContext;
pub use error::{Error, Result};
pub use models::{CommandGroup, Layout, PaneTarget, SessionConfig};
pub use multiplexer::{Multiplexer, TmuxMultiplexer};
pub use orchestrator::{Orchestrator, RunSummary};
pub use preprocess::digest_commands;
pub use session_file::SessionFile;

use std::sync::Arc;

/// The current version of smux from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Create panes for `session` and run every group in its pane.
///
/// `after_create` runs once every pane exists, before any command is sent,
/// for example to turn on `synchronize-panes`.
pub async fn create<F>(
    mux: Arc<dyn Multiplexer>,
    settings: Settings,
    context: SessionContext,
    session: SessionFile,
    after_create: Option<F>,
) -> Result<RunSummary>
where
    F: FnOnce(&RunSummary),
{
    let SessionFile { config, groups } = session;
    Orchestrator::new(mux, settings, context)
        .run(&config, groups, after_create)
        .await
}

/// Turn a fatal error into the message printed before exiting
pub fn describe_error(error: &Error) -> String {
    match error {
        Error::MultiplexerUnavailable { binary, reason } => {
            format!(
                "Could not run '{}': {}\n\nIs tmux installed? Set `tmux_binary` in the smux settings file to point at it.",
                binary, reason
            )
        }
        Error::ConfigLoadFailed { path, reason } => {
            format!("Failed to load settings from '{}': {}", path.display(), reason)
        }
        e if e.is_parse_error() => format!("Invalid session file: {}", e),
        e if e.is_directive_error() => format!("Invalid #smux directive: {}", e),
        e => e.to_string(),
    }
}
