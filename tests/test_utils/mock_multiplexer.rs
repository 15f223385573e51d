//! Mock multiplexer for testing
//!
//! Records every call with the (paused) tokio clock time it happened at, and
//! serves scripted `capture-pane` output per pane.

use async_trait::async_trait;
use smux::multiplexer::NewSession;
use smux::{Error, Layout, Multiplexer, PaneTarget, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    NewSession,
    NewWindow(usize),
    SplitWindow(usize),
    SelectLayout(usize, Layout),
    ListPanes(usize),
    SendLiteral(PaneTarget, String),
    SendKeys(PaneTarget, Vec<String>),
    PasteBuffer(PaneTarget, Vec<String>),
    CapturePane(PaneTarget),
    AttachSession,
}

impl MockCall {
    /// Whether this call creates session structure
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            MockCall::NewSession | MockCall::NewWindow(_) | MockCall::SplitWindow(_)
        )
    }

    /// Pane a call is addressed to
    pub fn target(&self) -> Option<PaneTarget> {
        match self {
            MockCall::SendLiteral(t, _)
            | MockCall::SendKeys(t, _)
            | MockCall::PasteBuffer(t, _)
            | MockCall::CapturePane(t) => Some(*t),
            _ => None,
        }
    }
}

struct MockState {
    calls: Vec<(Instant, MockCall)>,
    session: Option<String>,
    next_window: usize,
    windows: HashMap<usize, usize>,
    captures: HashMap<PaneTarget, VecDeque<String>>,
    failing_panes: HashSet<PaneTarget>,
    caller: PaneTarget,
    started: Instant,
}

/// Mock tmux server
pub struct MockMultiplexer {
    state: Mutex<MockState>,
}

impl MockMultiplexer {
    /// A tmux server with no sessions
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                session: None,
                next_window: 0,
                windows: HashMap::new(),
                captures: HashMap::new(),
                failing_panes: HashSet::new(),
                caller: PaneTarget::new(0, 0),
                started: Instant::now(),
            }),
        }
    }

    /// A server where session `name` already has windows `0..windows`
    pub fn with_session(name: &str, windows: usize, caller: PaneTarget) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state.lock().unwrap();
            state.session = Some(name.to_string());
            state.next_window = windows;
            state.caller = caller;
            for window in 0..windows {
                state.windows.insert(window, 1);
            }
        }
        mock
    }

    /// Queue capture results for a pane; the last one repeats
    pub fn script_captures<I, S>(&self, target: PaneTarget, captures: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .unwrap()
            .captures
            .entry(target)
            .or_default()
            .extend(captures.into_iter().map(Into::into));
    }

    /// Make every keystroke aimed at `target` fail
    pub fn fail_pane(&self, target: PaneTarget) {
        self.state.lock().unwrap().failing_panes.insert(target);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Calls with their offset from the mock's creation
    pub fn timed_calls(&self) -> Vec<(Duration, MockCall)> {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .map(|(at, call)| (at.duration_since(state.started), call.clone()))
            .collect()
    }

    /// Literal lines typed into `target`, in order
    pub fn literals(&self, target: PaneTarget) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::SendLiteral(t, text) if t == target => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Offset at which `text` was typed into `target`
    pub fn literal_sent_at(&self, target: PaneTarget, text: &str) -> Option<Duration> {
        self.timed_calls().into_iter().find_map(|(at, call)| match call {
            MockCall::SendLiteral(t, sent) if t == target && sent == text => Some(at),
            _ => None,
        })
    }

    pub fn capture_count(&self, target: PaneTarget) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == MockCall::CapturePane(target))
            .count()
    }

    pub fn pane_count(&self, window: usize) -> usize {
        self.state.lock().unwrap().windows.get(&window).copied().unwrap_or(0)
    }

    pub fn bound_session(&self) -> Option<String> {
        self.state.lock().unwrap().session.clone()
    }

    fn record(&self, call: MockCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(target) = call.target() {
            if state.failing_panes.contains(&target) {
                return Err(Error::Multiplexer {
                    command: format!("{:?}", call),
                    reason: format!("can't find pane: {}", target),
                });
            }
        }
        state.calls.push((Instant::now(), call));
        Ok(())
    }

    fn add_window(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let window = state.next_window;
        state.next_window += 1;
        state.windows.insert(window, 1);
        window
    }
}

impl Default for MockMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Multiplexer for MockMultiplexer {
    fn bind_session(&self, name: &str) {
        self.state.lock().unwrap().session = Some(name.to_string());
    }

    async fn new_session(&self) -> Result<NewSession> {
        self.record(MockCall::NewSession)?;
        let window = self.add_window();
        self.bind_session("smux-test");
        Ok(NewSession {
            name: "smux-test".to_string(),
            window,
        })
    }

    async fn new_window(&self) -> Result<usize> {
        let window = self.add_window();
        self.record(MockCall::NewWindow(window))?;
        Ok(window)
    }

    async fn split_window(&self, window: usize) -> Result<()> {
        self.record(MockCall::SplitWindow(window))?;
        let mut state = self.state.lock().unwrap();
        match state.windows.get_mut(&window) {
            Some(panes) => {
                *panes += 1;
                Ok(())
            }
            None => Err(Error::Multiplexer {
                command: "split-window".to_string(),
                reason: format!("can't find window: {}", window),
            }),
        }
    }

    async fn select_layout(&self, window: usize, layout: Layout) -> Result<()> {
        self.record(MockCall::SelectLayout(window, layout))
    }

    async fn list_panes(&self, window: usize) -> Result<Vec<usize>> {
        self.record(MockCall::ListPanes(window))?;
        Ok((0..self.pane_count(window)).collect())
    }

    async fn send_literal(&self, target: PaneTarget, text: &str) -> Result<()> {
        self.record(MockCall::SendLiteral(target, text.to_string()))
    }

    async fn send_keys(&self, target: PaneTarget, args: &[String]) -> Result<()> {
        self.record(MockCall::SendKeys(target, args.to_vec()))
    }

    async fn paste_buffer(&self, target: PaneTarget, args: &[String]) -> Result<()> {
        self.record(MockCall::PasteBuffer(target, args.to_vec()))
    }

    async fn capture_pane(&self, target: PaneTarget) -> Result<String> {
        self.record(MockCall::CapturePane(target))?;
        let mut state = self.state.lock().unwrap();
        let queue = state.captures.entry(target).or_default();
        Ok(if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        })
    }

    async fn current_window(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().caller.window)
    }

    async fn current_pane(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().caller.pane)
    }

    async fn session_name(&self) -> Result<String> {
        self.bound_session().ok_or_else(|| Error::Multiplexer {
            command: "display-message".to_string(),
            reason: "no current client".to_string(),
        })
    }

    async fn attach_session(&self) -> Result<()> {
        self.record(MockCall::AttachSession)
    }
}
