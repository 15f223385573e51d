//! Contract Tests for Directive Dispatch
//!
//! Every line kind maps to exactly one kind of multiplexer interaction, and
//! directive failures are reported with the offending line.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use smux::directive::{parse_line, Directive, Line};
use smux::dispatch::Dispatcher;
use smux::wait::WaitDefaults;
use smux::{CommandGroup, Error, PaneTarget, Settings};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{fast_settings, MockCall, MockMultiplexer};
use tokio::time::Instant;

fn dispatcher(mux: &Arc<MockMultiplexer>, settings: &Settings) -> Dispatcher {
    Dispatcher::new(mux.clone(), settings, Some("smux-test".to_string()))
}

#[test]
fn test_classification() {
    let defaults = WaitDefaults::default();
    assert!(matches!(parse_line("ls -la", &defaults).unwrap(), Line::Literal(_)));
    assert!(matches!(parse_line("#smuxsleep 1", &defaults).unwrap(), Line::Literal(_)));
    assert!(matches!(
        parse_line("#smux sleep 1.5", &defaults).unwrap(),
        Line::Directive(Directive::Sleep(d)) if d == Duration::from_millis(1500)
    ));
}

#[test]
fn test_configured_wait_defaults_apply() {
    let defaults = WaitDefaults {
        poll_interval: Duration::from_millis(200),
        lines: 4,
    };
    match parse_line("#smux waitForString ready", &defaults).unwrap() {
        Line::Directive(Directive::WaitForString(request)) => {
            assert_eq!(request.poll_interval, Duration::from_millis(200));
            assert_eq!(request.lines, 4);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_each_line_kind_maps_to_one_interaction() {
    let mux = Arc::new(MockMultiplexer::new());
    let target = PaneTarget::new(0, 0);
    let group: CommandGroup = [
        "echo 'literal with \"quotes\"'",
        "#smux send-keys C-c",
        "#smux paste-buffer -b 0",
        "#smux sleep 0",
        "#smux shell true",
    ]
    .into_iter()
    .collect();

    dispatcher(&mux, &fast_settings()).run_group(&group, target).await.unwrap();
    assert_eq!(
        mux.calls(),
        vec![
            MockCall::SendLiteral(target, "echo 'literal with \"quotes\"'".to_string()),
            MockCall::SendKeys(target, vec!["C-c".to_string()]),
            MockCall::PasteBuffer(target, vec!["-b".to_string(), "0".to_string()]),
        ]
    );
}

#[tokio::test]
async fn test_unknown_directive_carries_line() {
    let mux = Arc::new(MockMultiplexer::new());
    let err = dispatcher(&mux, &fast_settings())
        .dispatch("#smux waitFor x", PaneTarget::new(0, 0))
        .await
        .unwrap_err();
    match err {
        Error::UnknownDirective { name, line } => {
            assert_eq!(name, "waitFor");
            assert_eq!(line, "#smux waitFor x");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(mux.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sleep_suspends_for_the_duration() {
    let mux = Arc::new(MockMultiplexer::new());
    let started = Instant::now();
    dispatcher(&mux, &fast_settings())
        .dispatch("#smux sleep 2", PaneTarget::new(0, 0))
        .await
        .unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_wait_directive_then_literal() {
    let mux = Arc::new(MockMultiplexer::new());
    let target = PaneTarget::new(0, 1);
    mux.script_captures(target, ["", "Enter passphrase: "]);
    let group: CommandGroup = ["ssh-add", "#smux waitForRegex 'passphrase:\\s*$' 0.5", "secret"]
        .into_iter()
        .collect();

    dispatcher(&mux, &fast_settings()).run_group(&group, target).await.unwrap();

    assert_eq!(mux.capture_count(target), 2);
    let typed = mux.literal_sent_at(target, "secret").unwrap();
    assert_eq!(typed, Duration::from_secs(1));
}

#[tokio::test]
async fn test_failing_shell_command_is_not_fatal() {
    let mux = Arc::new(MockMultiplexer::new());
    let target = PaneTarget::new(0, 0);
    let group: CommandGroup = ["#smux shell exit 42", "#smux shell definitely-not-a-command-xyz", "echo still here"]
        .into_iter()
        .collect();

    dispatcher(&mux, &fast_settings()).run_group(&group, target).await.unwrap();
    assert_eq!(mux.literals(target), vec!["echo still here"]);
}
