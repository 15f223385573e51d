//! Session Orchestration
//!
//! Turns command groups into panes: validates the pane counts, creates the
//! session or windows, carves each window into panes, then drives one
//! [`Dispatcher`] sequence per pane.
//!
//! Group `i` lands in window `i / P`, pane `i % P` of that window, where `P`
//! is the panes-per-window setting. With `USE_THREADS` every pane runs on its
//! own task so a slow pane does not hold up the others.

use crate::config::Settings;
use crate::context::SessionContext;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::models::{CommandGroup, Layout, PaneTarget, SessionConfig};
use crate::multiplexer::Multiplexer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

/// What a run created, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Session that was created, `None` when reusing the caller's
    pub created_session: Option<String>,
    /// Windows created or reused, in order
    pub windows: Vec<usize>,
    /// Pane each group was sent to, by group index
    pub targets: Vec<PaneTarget>,
}

/// How the groups of a run are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanePlan {
    pub groups: usize,
    pub panes_per_window: usize,
}

impl PanePlan {
    pub fn new(groups: usize, panes_per_window: usize) -> Self {
        Self {
            groups,
            panes_per_window,
        }
    }

    /// Windows needed, `ceil(groups / panes_per_window)`
    pub fn window_count(&self) -> usize {
        self.groups.div_ceil(self.panes_per_window)
    }

    /// Panes carved into the `window`-th window of the run
    pub fn panes_in_window(&self, window: usize) -> usize {
        let before = window * self.panes_per_window;
        self.groups.saturating_sub(before).min(self.panes_per_window)
    }

    /// `(window slot, pane slot)` of a group, both relative to the run
    pub fn slot(&self, group: usize) -> (usize, usize) {
        (group / self.panes_per_window, group % self.panes_per_window)
    }
}

/// Drives a parsed session through a multiplexer
pub struct Orchestrator {
    mux: Arc<dyn Multiplexer>,
    settings: Settings,
    context: SessionContext,
}

impl Orchestrator {
    pub fn new(mux: Arc<dyn Multiplexer>, settings: Settings, context: SessionContext) -> Self {
        Self {
            mux,
            settings,
            context,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Whether `NO_CREATE` applies: one group and a caller inside tmux
    pub fn reuses_caller_pane(&self, config: &SessionConfig, group_count: usize) -> bool {
        config.no_create && group_count == 1 && self.context.in_session && self.context.caller.is_some()
    }

    /// Check the pane counts against the configured limits
    pub fn validate(&self, config: &SessionConfig, group_count: usize) -> Result<usize> {
        let panes_per_window = config.effective_panes_per_window(group_count);
        if panes_per_window == 0 || panes_per_window > self.settings.max_panes_per_window {
            return Err(Error::ConfigValidationFailed {
                field: "PANES_PER_WINDOW".to_string(),
                reason: format!(
                    "{} is outside 1..={}",
                    panes_per_window, self.settings.max_panes_per_window
                ),
            });
        }
        if group_count > self.settings.max_total_panes {
            return Err(Error::ConfigValidationFailed {
                field: "panes".to_string(),
                reason: format!(
                    "{} command groups exceed the limit of {} panes",
                    group_count, self.settings.max_total_panes
                ),
            });
        }
        Ok(panes_per_window)
    }

    /// Create the panes and run every group in its pane.
    ///
    /// `hook` runs once, after every window and pane exists and before any
    /// command is sent. When the caller is outside tmux the new session is
    /// attached at the end.
    pub async fn run<F>(
        &self,
        config: &SessionConfig,
        groups: Vec<CommandGroup>,
        hook: Option<F>,
    ) -> Result<RunSummary>
    where
        F: FnOnce(&RunSummary),
    {
        if groups.is_empty() {
            return Err(Error::NoCommandGroups);
        }
        let panes_per_window = self.validate(config, groups.len())?;

        if self.reuses_caller_pane(config, groups.len()) {
            return self.run_in_caller_pane(groups, hook).await;
        }
        if config.no_create {
            warn!("NO_CREATE ignored: it needs a single command group and a caller inside tmux");
        }

        let plan = PanePlan::new(groups.len(), panes_per_window);
        let summary = self.build_structure(&plan, config.layout).await?;
        info!(
            "Created {} pane(s) across {} window(s)",
            summary.targets.len(),
            summary.windows.len()
        );

        if let Some(hook) = hook {
            hook(&summary);
        }

        let session_name = summary
            .created_session
            .clone()
            .or_else(|| self.context.session_name.clone());
        let dispatcher = Arc::new(Dispatcher::new(self.mux.clone(), &self.settings, session_name));
        let work: Vec<_> = summary.targets.iter().copied().zip(groups).collect();

        let outcome = if config.use_threads && work.len() > 1 {
            run_concurrently(dispatcher, work).await
        } else {
            run_sequentially(&dispatcher, work).await
        };

        if summary.created_session.is_some() {
            if let Err(e) = &outcome {
                error!("Attaching despite failure: {}", e);
            }
            self.mux.attach_session().await?;
        }

        outcome.map(|()| summary)
    }

    async fn run_in_caller_pane<F>(&self, groups: Vec<CommandGroup>, hook: Option<F>) -> Result<RunSummary>
    where
        F: FnOnce(&RunSummary),
    {
        let (Some(session_name), Some(caller)) = (self.context.session_name.clone(), self.context.caller) else {
            return Err(Error::Other("caller pane unknown".to_string()));
        };
        self.mux.bind_session(&session_name);

        let summary = RunSummary {
            created_session: None,
            windows: vec![caller.window],
            targets: vec![caller],
        };
        if let Some(hook) = hook {
            hook(&summary);
        }

        info!("Sending commands to the calling pane {}", caller);
        let dispatcher = Dispatcher::new(self.mux.clone(), &self.settings, Some(session_name));
        for group in &groups {
            dispatcher.run_group(group, caller).await?;
        }
        Ok(summary)
    }

    /// Create the session or windows and carve every window into its panes
    async fn build_structure(&self, plan: &PanePlan, layout: Layout) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let mut first_window = match (self.context.in_session, self.context.session_name.as_deref()) {
            (true, Some(name)) => {
                self.mux.bind_session(name);
                None
            }
            _ => {
                let session = self.mux.new_session().await?;
                summary.created_session = Some(session.name);
                Some(session.window)
            }
        };

        for slot in 0..plan.window_count() {
            let window = match first_window.take() {
                Some(window) => window,
                None => self.mux.new_window().await?,
            };
            let wanted = plan.panes_in_window(slot);
            let panes = self.carve_panes(window, wanted, layout).await?;
            summary.windows.push(window);
            summary
                .targets
                .extend(panes.into_iter().map(|pane| PaneTarget::new(window, pane)));
        }

        Ok(summary)
    }

    /// Split `window` into `count` panes, re-applying the layout after every
    /// split so each split has room, and return the pane indices
    async fn carve_panes(&self, window: usize, count: usize, layout: Layout) -> Result<Vec<usize>> {
        for _ in 1..count {
            self.mux.split_window(window).await?;
            self.mux.select_layout(window, layout).await?;
        }
        self.mux.select_layout(window, layout).await?;

        let mut panes = self.mux.list_panes(window).await?;
        if panes.len() < count {
            return Err(Error::Multiplexer {
                command: "list-panes".to_string(),
                reason: format!("window {} has {} pane(s), expected {}", window, panes.len(), count),
            });
        }
        panes.truncate(count);
        debug!("Window {} carved into panes {:?}", window, panes);
        Ok(panes)
    }
}

async fn run_sequentially(dispatcher: &Dispatcher, work: Vec<(PaneTarget, CommandGroup)>) -> Result<()> {
    for (target, group) in work {
        dispatcher.run_group(&group, target).await?;
    }
    Ok(())
}

/// One task per pane; every task runs to completion and the first error in
/// group order is returned
async fn run_concurrently(dispatcher: Arc<Dispatcher>, work: Vec<(PaneTarget, CommandGroup)>) -> Result<()> {
    let mut tasks = JoinSet::new();
    let mut spawned = HashMap::new();
    for (index, (target, group)) in work.into_iter().enumerate() {
        let dispatcher = dispatcher.clone();
        let handle = tasks.spawn(async move { dispatcher.run_group(&group, target).await });
        spawned.insert(handle.id(), (index, target));
    }

    let mut failures: Vec<(usize, Error)> = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => {
                let id = e.id();
                let (window, pane) = spawned
                    .get(&id)
                    .map(|(_, target)| (target.window, target.pane))
                    .unwrap_or_default();
                (
                    id,
                    Err(Error::PaneTaskFailed {
                        window,
                        pane,
                        reason: e.to_string(),
                    }),
                )
            }
        };
        if let Err(e) = outcome {
            let (index, target) = spawned.get(&id).copied().unwrap_or((usize::MAX, PaneTarget::default()));
            error!("Pane {} failed: {}", target, e);
            failures.push((index, e));
        }
    }

    failures.sort_by_key(|(index, _)| *index);
    match failures.into_iter().next() {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}
