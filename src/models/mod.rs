//! Core data models for smux
//!
//! Session options, layouts, command groups and pane coordinates. Everything
//! here is derived once from the session file and read-only afterwards.

pub mod command_group;
pub mod layout;
pub mod pane_target;
pub mod session_config;

// Re-exports for convenience
pub use command_group::CommandGroup;
pub use layout::Layout;
pub use pane_target::PaneTarget;
pub use session_config::SessionConfig;
