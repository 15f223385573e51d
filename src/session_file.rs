//! Session File Parsing
//!
//! A session file is an optional header of options followed by command groups,
//! each opened by a delimiter line of three or more dashes:
//!
//! ```text
//! PANES_PER_WINDOW = 2
//! LAYOUT = even-vertical
//! USE_THREADS
//! ---------
//! cd ~/src
//! make
//! ---------
//! #smux waitForString $
//! top
//! ```
//!
//! Lines are trimmed. Blank lines and `#` comments are skipped everywhere,
//! `#smux ` directives inside groups are kept for the dispatcher.

use crate::error::{Error, Result};
use crate::models::{CommandGroup, SessionConfig};
use crate::preprocess::{is_comment, is_directive};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Marker that opens a new command group
pub const DELIMITER: &str = "---";

/// Path argument meaning "read the session from standard input"
pub const STDIN_PATH: &str = "-";

/// A fully parsed session file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionFile {
    pub config: SessionConfig,
    pub groups: Vec<CommandGroup>,
}

impl SessionFile {
    /// Parse session file text
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = SessionConfig::default();
        let mut groups: Vec<CommandGroup> = Vec::new();
        let mut current: Option<Vec<String>> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }

            if line.starts_with(DELIMITER) {
                if !is_delimiter(line) {
                    return Err(Error::MalformedDelimiter {
                        line_number,
                        line: line.to_string(),
                    });
                }
                if let Some(lines) = current.replace(Vec::new()) {
                    groups.push(CommandGroup::new(lines));
                }
                continue;
            }

            match current.as_mut() {
                Some(lines) => lines.push(line.to_string()),
                None => parse_header_line(&mut config, line, line_number)?,
            }
        }

        // A trailing delimiter with nothing after it opens no pane
        if let Some(lines) = current.filter(|lines| !lines.is_empty()) {
            groups.push(CommandGroup::new(lines));
        }

        if groups.is_empty() {
            return Err(Error::NoCommandGroups);
        }

        debug!(
            "Parsed session file: {} group(s), {:?}",
            groups.len(),
            config
        );
        Ok(Self { config, groups })
    }

    /// Read and parse a session file, `-` meaning standard input
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&Self::read_text(path)?)
    }

    /// Raw text of a session file, or of stdin when `path` is `-`
    pub fn read_text(path: &Path) -> Result<String> {
        if path.as_os_str() == STDIN_PATH {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            return Ok(text);
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Number of panes this session needs
    pub fn pane_count(&self) -> usize {
        self.groups.len()
    }
}

/// A delimiter is made of dashes only
fn is_delimiter(line: &str) -> bool {
    line.len() >= DELIMITER.len() && line.chars().all(|c| c == '-')
}

fn parse_header_line(config: &mut SessionConfig, line: &str, line_number: usize) -> Result<()> {
    // Directives belong to a pane; one up here means a delimiter is missing
    if is_directive(line) {
        return Err(Error::MalformedConfigLine {
            line_number,
            line: line.to_string(),
        });
    }

    if let Some((key, value)) = line.split_once('=') {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::MalformedConfigLine {
                line_number,
                line: line.to_string(),
            });
        }
        if !config.apply(key, value.trim())? {
            warn!("Ignoring unknown session option '{}' on line {}", key, line_number);
        }
        return Ok(());
    }

    if config.apply_flag(line) {
        return Ok(());
    }

    Err(Error::MalformedConfigLine {
        line_number,
        line: line.to_string(),
    })
}
