//! Command Group Preprocessing
//!
//! Turns the raw lines of a command group into the sequence the dispatcher
//! consumes: blank lines and comments are dropped, and `#smux` directives that
//! end in a backslash are joined with the lines that follow them.
//!
//! ```text
//! # This is a comment.            (dropped)
//!
//! #smux shell echo \              #smux shell echo Hello smux
//! Hello \                    =>
//! smux                            echo Hello \
//!                                 World
//! echo Hello \
//! World
//! ```
//!
//! Continuations on ordinary lines are left for the pane's shell to resolve.

/// Prefix that turns a line into an in-band directive
pub const DIRECTIVE_MARKER: &str = "#smux ";

/// Lines starting with this (and not with [`DIRECTIVE_MARKER`]) are comments
pub const COMMENT_MARKER: char = '#';

/// Trailing character that continues a directive onto the next line
pub const CONTINUATION_MARKER: char = '\\';

/// Whether `line` is a comment that never reaches a pane
pub fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT_MARKER) && !is_directive(line)
}

/// Whether `line` is a `#smux ` directive
pub fn is_directive(line: &str) -> bool {
    line.starts_with(DIRECTIVE_MARKER)
}

/// Remove comments and empty lines and join continued `#smux` lines.
///
/// Order is preserved and the output never has more lines than the input. A
/// directive continuation on the last line is emitted with its marker removed.
pub fn digest_commands<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut digested = Vec::with_capacity(lines.len());
    let mut buffered: Option<String> = None;

    let kept = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.is_empty() && !is_comment(line));

    for line in kept {
        match buffered.take() {
            Some(mut joined) => {
                joined.push_str(line);
                match joined.strip_suffix(CONTINUATION_MARKER) {
                    Some(stripped) => buffered = Some(stripped.to_string()),
                    None => digested.push(joined),
                }
            }
            None => match line.strip_suffix(CONTINUATION_MARKER) {
                Some(stripped) if is_directive(line) => buffered = Some(stripped.to_string()),
                _ => digested.push(line.to_string()),
            },
        }
    }

    if let Some(joined) = buffered {
        trace!("directive continuation at end of group: {}", joined);
        digested.push(joined);
    }

    digested
}
