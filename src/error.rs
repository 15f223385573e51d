//! Error types and Result aliases for smux

use std::fmt;
use std::path::PathBuf;

/// Result type alias for smux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for smux
#[derive(Debug)]
pub enum Error {
    // === Session file errors ===
    /// A header line is neither `KEY = value` nor a known bare flag
    MalformedConfigLine {
        line_number: usize,
        line: String,
    },

    /// A recognized header key carries a value that cannot be used
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A line starts like a group delimiter but contains other characters
    MalformedDelimiter {
        line_number: usize,
        line: String,
    },

    /// The session file defines no command groups at all
    NoCommandGroups,

    // === Directive errors ===
    /// `#smux <name>` with a name we do not implement
    UnknownDirective {
        name: String,
        line: String,
    },

    /// A known directive with missing or unusable arguments
    DirectiveParse {
        line: String,
        reason: String,
    },

    /// The pattern given to `waitForRegex` does not compile
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    // === Multiplexer errors ===
    /// A tmux invocation failed or returned unusable output
    Multiplexer {
        command: String,
        reason: String,
    },

    /// The multiplexer binary could not be started at all
    MultiplexerUnavailable {
        binary: String,
        reason: String,
    },

    /// A pane execution task panicked or was aborted
    PaneTaskFailed {
        window: usize,
        pane: usize,
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load the settings file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    // === I/O and parsing errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl Error {
    /// Whether this error stems from the session file itself, before any pane
    /// has been touched.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedConfigLine { .. }
                | Error::InvalidConfigValue { .. }
                | Error::MalformedDelimiter { .. }
                | Error::NoCommandGroups
        )
    }

    /// Whether this error is raised while interpreting a `#smux` line.
    pub fn is_directive_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownDirective { .. } | Error::DirectiveParse { .. } | Error::InvalidRegex { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Session file errors
            Error::MalformedConfigLine { line_number, line } => {
                write!(
                    f,
                    "Line {}: '{}' is not a valid option (expected KEY = value)",
                    line_number, line
                )
            }
            Error::InvalidConfigValue { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
            Error::MalformedDelimiter { line_number, line } => {
                write!(
                    f,
                    "Line {}: malformed group delimiter '{}' (use three or more '-')",
                    line_number, line
                )
            }
            Error::NoCommandGroups => {
                write!(f, "No command groups found (groups start with a '---' line)")
            }

            // Directive errors
            Error::UnknownDirective { name, line } => {
                write!(f, "Unknown #smux directive '{}' in line: {}", name, line)
            }
            Error::DirectiveParse { line, reason } => {
                write!(f, "Malformed #smux directive '{}': {}", line, reason)
            }
            Error::InvalidRegex { pattern, source } => {
                write!(f, "Invalid regex '{}': {}", pattern, source)
            }

            // Multiplexer errors
            Error::Multiplexer { command, reason } => {
                write!(f, "tmux command '{}' failed: {}", command, reason)
            }
            Error::MultiplexerUnavailable { binary, reason } => {
                write!(f, "Failed to run '{}': {}", binary, reason)
            }
            Error::PaneTaskFailed { window, pane, reason } => {
                write!(f, "Pane {}.{} task failed: {}", window, pane, reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }

            // I/O and parsing errors
            Error::Io(err) => write!(f, "I/O error: {}", err),

            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidRegex { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
