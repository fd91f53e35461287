// ─── Launch Session ───
// Drives one launch: prepare files, resolve the identity, hand the options to
// the process launcher, and relay its events to the window.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::auth::{offline_identity, Identity};
use crate::core::config::load_user_config;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::LaunchPaths;
use crate::core::skins::write_skins_restorer_config;

use super::collaborator::ProcessLauncher;
use super::events::{self, LaunchEvent};
use super::options::LaunchOptions;
use super::ui::{restore_target, safe_send, ProgressRecord, UiMessage, UiTarget};

/// Lifecycle of a single launch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Preparing,
    Configured,
    Launching,
    Running,
    FailedToStart,
    /// The launcher finished cleanly.
    Completed,
    /// The launcher call failed after the game was handed off. Still a
    /// successful launch from the caller's point of view.
    StartedWithWarning,
    /// Like `StartedWithWarning`, but the launcher also reported errors
    /// while running.
    GameError,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::FailedToStart
                | SessionState::Completed
                | SessionState::StartedWithWarning
                | SessionState::GameError
        )
    }
}

/// Who is playing this launch.
#[derive(Debug, Clone)]
pub enum LaunchRequest {
    /// Username string or profile object from the UI; resolved offline.
    Offline(Value),
    /// Identity that already went through the auth server.
    Authenticated(Identity),
}

impl LaunchRequest {
    fn resolve(self) -> Identity {
        match self {
            LaunchRequest::Offline(seed) => offline_identity(&seed),
            LaunchRequest::Authenticated(identity) => identity,
        }
    }
}

/// What the relay saw over the life of a session.
#[derive(Debug, Clone, Default)]
struct RelaySummary {
    data_lines: u64,
    errors: u64,
    last_progress: Option<ProgressRecord>,
}

/// One in-flight launch attempt.
#[derive(Debug, Clone)]
struct LaunchSession {
    id: Uuid,
    state: SessionState,
    started_at: DateTime<Utc>,
    game_root: PathBuf,
    relay: RelaySummary,
}

impl LaunchSession {
    fn new(game_root: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Preparing,
            started_at: Utc::now(),
            game_root,
            relay: RelaySummary::default(),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(session = %self.id, "launch state {:?} -> {:?}", self.state, next);
        self.state = next;
        if next.is_terminal() {
            info!(
                session = %self.id,
                root = ?self.game_root,
                state = ?next,
                elapsed_ms = (Utc::now() - self.started_at).num_milliseconds(),
                "launch session finished"
            );
        }
    }
}

/// Terminal result of a launch that got as far as the process launcher.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOutcome {
    pub success: bool,
    pub session_id: Uuid,
    pub state: SessionState,
    pub warning: Option<String>,
    pub last_progress: Option<ProgressRecord>,
    pub output_lines: u64,
    pub error_events: u64,
}

/// Game roots with a launch in flight.
#[derive(Debug, Clone, Default)]
struct ActiveRoots(Arc<Mutex<HashSet<PathBuf>>>);

impl ActiveRoots {
    fn claim(&self, root: &Path) -> LauncherResult<RootClaim> {
        let mut roots = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !roots.insert(root.to_path_buf()) {
            return Err(LauncherError::SessionActive(root.to_path_buf()));
        }
        Ok(RootClaim {
            roots: self.clone(),
            root: root.to_path_buf(),
        })
    }
}

/// Releases the game root when the session ends, however it ends.
struct RootClaim {
    roots: ActiveRoots,
    root: PathBuf,
}

impl Drop for RootClaim {
    fn drop(&mut self) {
        self.roots
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.root);
    }
}

/// Runs launch sessions against one fixed set of paths.
#[derive(Clone)]
pub struct LaunchOrchestrator {
    paths: LaunchPaths,
    launcher: Arc<dyn ProcessLauncher>,
    active: ActiveRoots,
}

impl LaunchOrchestrator {
    pub fn new(paths: LaunchPaths, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            paths,
            launcher,
            active: ActiveRoots::default(),
        }
    }

    pub fn paths(&self) -> &LaunchPaths {
        &self.paths
    }

    /// Same launcher and in-flight bookkeeping, different paths.
    pub fn with_paths(&self, paths: LaunchPaths) -> Self {
        Self {
            paths,
            launcher: Arc::clone(&self.launcher),
            active: self.active.clone(),
        }
    }

    /// Launch the game and relay its events to `ui`.
    ///
    /// Only failures before the process launcher is called are returned as
    /// errors. Once the launcher has been invoked the result is always
    /// `success: true`; a failing launcher call shows up in `state` and
    /// `warning` instead. A second launch on the same game root while one is
    /// in flight fails with [`LauncherError::SessionActive`].
    pub async fn run(
        &self,
        request: LaunchRequest,
        ui: Option<Arc<dyn UiTarget>>,
    ) -> LauncherResult<LaunchOutcome> {
        let mut session = LaunchSession::new(self.paths.game_root.clone());
        info!(session = %session.id, "== Preparing launch and skin configuration ==");
        info!("[LAUNCH] Minecraft directory: {:?}", self.paths.game_root);

        let prepared = match self.active.claim(&self.paths.game_root) {
            Ok(claim) => self
                .prepare(&mut session, request)
                .await
                .map(|options| (claim, options)),
            Err(err) => Err(err),
        };

        let (_claim, options) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                session.transition(SessionState::FailedToStart);
                error!("Unexpected critical error while preparing the launch: {err}");
                safe_send(
                    ui.as_deref(),
                    UiMessage::Output(format!("[CRITICAL-LAUNCHER-ERROR] Unexpected error: {err}")),
                );
                restore_target(ui.as_deref());
                return Err(err);
            }
        };

        let outcome = self.drive(&mut session, options, ui.clone()).await;
        restore_target(ui.as_deref());
        Ok(outcome)
    }

    async fn prepare(
        &self,
        session: &mut LaunchSession,
        request: LaunchRequest,
    ) -> LauncherResult<LaunchOptions> {
        let config = load_user_config(&self.paths.launch_config_file).await;
        if let Err(err) = write_skins_restorer_config(&self.paths.game_root).await {
            error!("Error writing the SkinsRestorer config file: {err}");
        }
        session.transition(SessionState::Configured);

        info!("[JAVA CHECK] Final Java path: {:?}", self.paths.java_executable);
        info!("[FORGE CHECK] Final Forge path: {:?}", self.paths.forge_installer);

        let identity = request.resolve();
        let options = LaunchOptions::assemble(&identity, &self.paths, &config)?;
        session.transition(SessionState::Launching);
        Ok(options)
    }

    async fn drive(
        &self,
        session: &mut LaunchSession,
        options: LaunchOptions,
        ui: Option<Arc<dyn UiTarget>>,
    ) -> LaunchOutcome {
        let (sink, mut receiver) = events::channel();
        let mut relay = EventRelay::new(ui);
        session.transition(SessionState::Running);

        let launch = self.launcher.launch(options, sink);
        tokio::pin!(launch);
        let launched = loop {
            tokio::select! {
                biased;
                Some(event) = receiver.recv() => relay.handle(event),
                result = &mut launch => break result,
            }
        };

        // Everything sent before the launcher returned is already queued.
        while let Ok(event) = receiver.try_recv() {
            relay.handle(event);
        }
        session.relay = relay.summary.clone();

        // The launcher may still hold sinks while the game runs.
        let session_id = session.id;
        tokio::spawn(async move {
            let summary = relay.run_until_closed(receiver).await;
            debug!(
                session = %session_id,
                lines = summary.data_lines,
                errors = summary.errors,
                "event relay closed"
            );
        });

        let warning = match launched {
            Ok(()) => {
                session.transition(SessionState::Completed);
                None
            }
            Err(err) => {
                warn!("Launcher finished with an error (assuming the game started): {err}");
                let state = if session.relay.errors > 0 {
                    SessionState::GameError
                } else {
                    SessionState::StartedWithWarning
                };
                session.transition(state);
                Some(err.to_string())
            }
        };

        LaunchOutcome {
            success: true,
            session_id: session.id,
            state: session.state,
            warning,
            last_progress: session.relay.last_progress.clone(),
            output_lines: session.relay.data_lines,
            error_events: session.relay.errors,
        }
    }
}

/// Forwards launcher events to the window and counts what went by.
struct EventRelay {
    ui: Option<Arc<dyn UiTarget>>,
    summary: RelaySummary,
}

impl EventRelay {
    fn new(ui: Option<Arc<dyn UiTarget>>) -> Self {
        Self {
            ui,
            summary: RelaySummary::default(),
        }
    }

    fn handle(&mut self, event: LaunchEvent) {
        let ui = self.ui.as_deref();
        match event {
            LaunchEvent::Data(raw) => {
                self.summary.data_lines += 1;
                safe_send(ui, UiMessage::Output(format!("[GAME-LOG] {}", raw.trim())));
            }
            LaunchEvent::Error(message) => {
                self.summary.errors += 1;
                safe_send(ui, UiMessage::Output(format!("[GAME-ERROR] {message}")));
                error!("[LAUNCHER ERROR] {message}");
            }
            LaunchEvent::Progress(update) => {
                let record = ProgressRecord::from(&update);
                let line = format!(
                    "[DOWNLOADING] Type: {} | Progress: {}% | File: {}",
                    update.kind, record.progress, update.file
                );
                safe_send(ui, UiMessage::Progress(record.clone()));
                safe_send(ui, UiMessage::Output(line.clone()));
                info!("{line}");
                self.summary.last_progress = Some(record);
            }
        }
    }

    async fn run_until_closed(mut self, mut events: mpsc::Receiver<LaunchEvent>) -> RelaySummary {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        self.summary
    }
}
