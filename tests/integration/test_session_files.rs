//! Integration Tests for Session Files
//!
//! Session files parsed from disk and run end to end against the mock tmux
//! server.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use smux::{create, Layout, PaneTarget, RunSummary, SessionContext, SessionFile};
use std::fs;
use std::sync::Arc;
use test_utils::fixtures::SAMPLE_SESSION;
use test_utils::{fast_settings, write_session_file, MockCall, MockMultiplexer};

#[test]
fn test_sample_session_parses() {
    let (_dir, path) = write_session_file(SAMPLE_SESSION);
    let session = SessionFile::load(&path).unwrap();

    assert_eq!(session.config.panes_per_window, Some(4));
    assert_eq!(session.config.layout, Layout::Tiled);
    assert_eq!(session.pane_count(), 4);
    assert_eq!(
        session.groups[3].lines(),
        ["echo \"This is pane 4\"", "cat /etc/issue"]
    );
}

#[tokio::test]
async fn test_sample_session_runs_in_one_window() {
    let session = SessionFile::parse(SAMPLE_SESSION).unwrap();
    let mux = Arc::new(MockMultiplexer::new());

    let summary = create(mux.clone(), fast_settings(), SessionContext::outside(), session, None::<fn(&RunSummary)>)
        .await
        .unwrap();

    assert_eq!(summary.windows, vec![0]);
    assert_eq!(mux.pane_count(0), 4);
    assert_eq!(
        mux.literals(PaneTarget::new(0, 2)),
        vec!["echo 'This is pane 3'", "uname -a"]
    );
}

#[tokio::test]
async fn test_comments_and_continuations_end_to_end() {
    let text = "\
---
# set things up
#smux send-keys \\
  C-l
echo one \\
two
";
    let session = SessionFile::parse(text).unwrap();
    let mux = Arc::new(MockMultiplexer::new());
    create(mux.clone(), fast_settings(), SessionContext::outside(), session, None::<fn(&RunSummary)>)
        .await
        .unwrap();

    let target = PaneTarget::new(0, 0);
    let sent: Vec<MockCall> = mux
        .calls()
        .into_iter()
        .filter(|c| c.target() == Some(target))
        .collect();
    // Lines are trimmed, so the continuation joins as "send-keys C-l"
    assert_eq!(
        sent,
        vec![
            MockCall::SendKeys(target, vec!["C-l".to_string()]),
            MockCall::SendLiteral(target, "echo one \\".to_string()),
            MockCall::SendLiteral(target, "two".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_shell_directive_sees_its_pane() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("panes");
    let text = format!(
        "PANES_PER_WINDOW = 1\n---\n#smux shell echo \"$window.$pane\" >> '{out}'\n---\n#smux shell echo \"$window.$pane\" >> '{out}'\n",
        out = out.display()
    );
    let session = SessionFile::parse(&text).unwrap();
    let mux = Arc::new(MockMultiplexer::new());
    create(mux.clone(), fast_settings(), SessionContext::outside(), session, None::<fn(&RunSummary)>)
        .await
        .unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().collect::<Vec<_>>(), vec!["0.0", "1.0"]);
}

#[test]
fn test_missing_session_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = SessionFile::load(&dir.path().join("absent.smux")).unwrap_err();
    assert!(matches!(err, smux::Error::Io(_)));
}
