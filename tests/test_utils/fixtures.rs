//! Test fixtures

use smux::{CommandGroup, Settings};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Settings without pacing delays
pub fn fast_settings() -> Settings {
    Settings::immediate()
}

/// Command groups from literal line lists
pub fn groups(specs: &[&[&str]]) -> Vec<CommandGroup> {
    specs
        .iter()
        .map(|lines| lines.iter().copied().collect())
        .collect()
}

/// Write `contents` to a file in a fresh temp dir; keep the dir alive
pub fn write_session_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("session.smux");
    fs::write(&path, contents).expect("write session file");
    (dir, path)
}

/// The sample session from the usage text
pub const SAMPLE_SESSION: &str = "\
# This is a comment
PANES_PER_WINDOW = 4
LAYOUT = tiled
----------
echo 'This is pane 1'
cat /proc/cpuinfo | less
----------
echo 'This is pane 2'
cat /proc/meminfo
----------
echo 'This is pane 3'
uname -a
----------
echo \"This is pane 4\"
cat /etc/issue
----------
";
