use serde::Serialize;
use tracing::warn;

use crate::core::error::LauncherResult;

use super::events::ProgressUpdate;

pub const OUTPUT_CHANNEL: &str = "mc-output";
pub const PROGRESS_CHANNEL: &str = "mc-progress";

/// Structured progress payload for the `mc-progress` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub file: String,
    pub task: u64,
    pub total: u64,
    pub progress: u8,
    pub message: String,
}

impl From<&ProgressUpdate> for ProgressRecord {
    fn from(update: &ProgressUpdate) -> Self {
        Self {
            kind: "download",
            file: update.file.clone(),
            task: update.task,
            total: update.total,
            progress: update.percent(),
            message: format!("Downloading: {}", update.file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    Output(String),
    Progress(ProgressRecord),
}

impl UiMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            UiMessage::Output(_) => OUTPUT_CHANNEL,
            UiMessage::Progress(_) => PROGRESS_CHANNEL,
        }
    }
}

/// The window a launch reports to. It can be closed at any moment, so
/// liveness is checked before every interaction.
pub trait UiTarget: Send + Sync {
    fn is_alive(&self) -> bool;
    fn send(&self, message: &UiMessage) -> LauncherResult<()>;
    fn is_visible(&self) -> bool;
    fn show(&self) -> LauncherResult<()>;
    fn focus(&self) -> LauncherResult<()>;
}

/// Best-effort delivery. Returns whether the message was handed over.
pub fn safe_send(target: Option<&dyn UiTarget>, message: UiMessage) -> bool {
    let Some(target) = target.filter(|t| t.is_alive()) else {
        warn!(
            "[Launcher] UI window closed or invalid, dropping {} message",
            message.channel()
        );
        return false;
    };

    match target.send(&message) {
        Ok(()) => true,
        Err(err) => {
            warn!("[Launcher] Could not deliver {} message: {err}", message.channel());
            false
        }
    }
}

/// Bring the window back to the front if it is still around.
pub fn restore_target(target: Option<&dyn UiTarget>) {
    let Some(target) = target.filter(|t| t.is_alive()) else {
        return;
    };

    if !target.is_visible() {
        if let Err(err) = target.show() {
            warn!("[Launcher] Could not show window: {err}");
        }
    }
    if let Err(err) = target.focus() {
        warn!("[Launcher] Could not focus window: {err}");
    }
}
