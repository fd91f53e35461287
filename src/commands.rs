use std::sync::Arc;

use serde_json::Value;
use tauri::{Emitter, EventTarget, Runtime, State, WebviewWindow};
use tracing::info;

use crate::core::auth::{Identity, StoredCredentials};
use crate::core::config::{LaunchConfig, SaveOutcome};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{LaunchOutcome, LaunchRequest, UiMessage, UiTarget};
use crate::core::state::LauncherState;

fn tauri_error(err: tauri::Error) -> LauncherError {
    LauncherError::Other(err.to_string())
}

/// The window that asked for the launch receives its events.
impl<R: Runtime> UiTarget for WebviewWindow<R> {
    fn is_alive(&self) -> bool {
        // Any query against a destroyed window errors out.
        WebviewWindow::is_visible(self).is_ok()
    }

    fn send(&self, message: &UiMessage) -> LauncherResult<()> {
        let target = EventTarget::webview_window(self.label());
        let emitted = match message {
            UiMessage::Output(line) => self.emit_to(target, message.channel(), line),
            UiMessage::Progress(record) => self.emit_to(target, message.channel(), record),
        };
        emitted.map_err(tauri_error)
    }

    fn is_visible(&self) -> bool {
        WebviewWindow::is_visible(self).unwrap_or(false)
    }

    fn show(&self) -> LauncherResult<()> {
        WebviewWindow::show(self).map_err(tauri_error)
    }

    fn focus(&self) -> LauncherResult<()> {
        self.set_focus().map_err(tauri_error)
    }
}

#[tauri::command]
pub async fn launch_game<R: Runtime>(
    window: WebviewWindow<R>,
    state: State<'_, LauncherState>,
    user: Value,
    identity: Option<Identity>,
) -> Result<LaunchOutcome, LauncherError> {
    let request = match identity {
        Some(identity) => LaunchRequest::Authenticated(identity),
        None => LaunchRequest::Offline(user),
    };

    info!("Launch requested from window '{}'", window.label());
    let ui: Arc<dyn UiTarget> = Arc::new(window);
    state.orchestrator().await.run(request, Some(ui)).await
}

#[tauri::command]
pub async fn login_ely(
    state: State<'_, LauncherState>,
    email: String,
    password: String,
) -> Result<Identity, LauncherError> {
    state.resolver().online_identity(&email, &password).await
}

#[tauri::command]
pub async fn load_saved_credentials(
    state: State<'_, LauncherState>,
) -> Result<StoredCredentials, LauncherError> {
    Ok(state.resolver().saved_credentials().await)
}

#[tauri::command]
pub async fn get_launch_config(
    state: State<'_, LauncherState>,
) -> Result<LaunchConfig, LauncherError> {
    Ok(state.launch_config().await)
}

#[tauri::command]
pub async fn save_launch_config(
    state: State<'_, LauncherState>,
    config: LaunchConfig,
) -> Result<SaveOutcome, LauncherError> {
    Ok(state.save_launch_config(&config).await)
}
