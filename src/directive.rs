//! `#smux` Directive Parsing
//!
//! Each digested line is either literal pane input or an in-band directive.
//! This module only classifies and parses; [`crate::dispatch`] executes.
//!
//! Supported directives:
//!
//! - `paste-buffer [args]` / `send-keys [args]`: tmux commands with the pane
//!   already specified. `send-keys` is how special keys such as `Enter` reach
//!   a pane, since ordinary lines are always typed literally.
//! - `waitForString <string> [pollingInterval] [numLinesToExamine]`
//! - `waitForRegex <regex> [pollingInterval] [numLinesToExamine]`
//! - `shell <command>`: run through `/bin/sh` with `$window` and `$pane` set.
//! - `sleep <seconds>`

use crate::error::{Error, Result};
use crate::preprocess::{is_directive, DIRECTIVE_MARKER};
use crate::wait::{Needle, WaitDefaults, WaitRequest};
use regex::Regex;
use std::time::Duration;

/// A parsed `#smux` directive with its arguments
#[derive(Debug, Clone)]
pub enum Directive {
    /// `tmux paste-buffer -t <pane> <args>`
    PasteBuffer(Vec<String>),
    /// `tmux send-keys -t <pane> <args>`
    SendKeys(Vec<String>),
    /// Block until a literal string shows up in the pane
    WaitForString(WaitRequest),
    /// Block until a regex matches the pane contents
    WaitForRegex(WaitRequest),
    /// Host shell command, raw text after the word `shell`
    Shell(String),
    /// Suspend this pane's sequence
    Sleep(Duration),
}

impl Directive {
    /// Directive name as written in session files
    pub fn name(&self) -> &'static str {
        match self {
            Directive::PasteBuffer(_) => "paste-buffer",
            Directive::SendKeys(_) => "send-keys",
            Directive::WaitForString(_) => "waitForString",
            Directive::WaitForRegex(_) => "waitForRegex",
            Directive::Shell(_) => "shell",
            Directive::Sleep(_) => "sleep",
        }
    }
}

/// A classified line of a command group
#[derive(Debug, Clone)]
pub enum Line {
    /// Typed into the pane verbatim
    Literal(String),
    /// Interpreted by smux itself
    Directive(Directive),
}

/// Classify and parse a digested line.
///
/// Fails with [`Error::UnknownDirective`] for names we do not implement and
/// with [`Error::DirectiveParse`] / [`Error::InvalidRegex`] for bad arguments.
pub fn parse_line(line: &str, defaults: &WaitDefaults) -> Result<Line> {
    if !is_directive(line) {
        return Ok(Line::Literal(line.to_string()));
    }

    let body = &line[DIRECTIVE_MARKER.len()..];
    if body.split_whitespace().next() == Some("shell") {
        return Ok(Line::Directive(Directive::Shell(shell_command(line, body)?)));
    }

    let words = shell_words::split(body).map_err(|e| Error::DirectiveParse {
        line: line.to_string(),
        reason: e.to_string(),
    })?;

    let Some((name, args)) = words.split_first() else {
        return Err(Error::DirectiveParse {
            line: line.to_string(),
            reason: "missing directive name".to_string(),
        });
    };

    let directive = match name.as_str() {
        "paste-buffer" => Directive::PasteBuffer(args.to_vec()),
        "send-keys" => Directive::SendKeys(args.to_vec()),
        "waitForString" => {
            Directive::WaitForString(parse_wait(line, args, false, defaults)?)
        }
        "waitForRegex" => Directive::WaitForRegex(parse_wait(line, args, true, defaults)?),
        "sleep" => Directive::Sleep(parse_sleep(line, args)?),
        other => {
            return Err(Error::UnknownDirective {
                name: other.to_string(),
                line: line.to_string(),
            })
        }
    };

    Ok(Line::Directive(directive))
}

fn parse_wait(line: &str, args: &[String], is_regex: bool, defaults: &WaitDefaults) -> Result<WaitRequest> {
    let malformed = |reason: String| Error::DirectiveParse {
        line: line.to_string(),
        reason,
    };

    let target = args
        .first()
        .ok_or_else(|| malformed("missing the string or regex to wait for".to_string()))?;

    let needle = if is_regex {
        Needle::Pattern(Regex::new(target).map_err(|source| Error::InvalidRegex {
            pattern: target.clone(),
            source,
        })?)
    } else {
        Needle::Literal(target.clone())
    };

    let poll_interval = match args.get(1) {
        Some(raw) => parse_seconds(raw).map_err(|reason| malformed(format!("polling interval {}", reason)))?,
        None => defaults.poll_interval,
    };

    let lines = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| malformed(format!("line count '{}' must be a positive integer", raw)))?,
        None => defaults.lines,
    };

    if args.len() > 3 {
        warn!("ignoring extra arguments in directive: {}", line);
    }

    Ok(WaitRequest {
        needle,
        poll_interval,
        lines,
    })
}

fn parse_sleep(line: &str, args: &[String]) -> Result<Duration> {
    let raw = args.first().ok_or_else(|| Error::DirectiveParse {
        line: line.to_string(),
        reason: "missing number of seconds".to_string(),
    })?;
    parse_seconds(raw).map_err(|reason| Error::DirectiveParse {
        line: line.to_string(),
        reason: format!("sleep duration {}", reason),
    })
}

fn parse_seconds(raw: &str) -> std::result::Result<Duration, String> {
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| format!("'{}' is not a non-negative number of seconds", raw))
}

// The command keeps its original quoting so `"$window"` still expands in the
// spawned shell; re-joining split words would turn it into single quotes.
fn shell_command(line: &str, body: &str) -> Result<String> {
    let command = body
        .find("shell")
        .map(|idx| body[idx + "shell".len()..].trim())
        .unwrap_or_default();

    if command.is_empty() {
        return Err(Error::DirectiveParse {
            line: line.to_string(),
            reason: "shell requires a command".to_string(),
        });
    }
    Ok(command.to_string())
}
