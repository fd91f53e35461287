#[cfg(feature = "desktop")]
mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::launch::{LaunchOrchestrator, LaunchOutcome, LaunchRequest, SessionState};
pub use crate::core::state::LauncherState;

/// Install the structured logger. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ely_launcher_lib=debug")),
        )
        .try_init();
}

/// Tauri plugin exposing the launcher commands to the frontend.
///
/// The host app builds the [`LauncherState`] (choosing the process launcher)
/// and registers the plugin on its builder.
#[cfg(feature = "desktop")]
pub fn plugin<R: tauri::Runtime>(state: LauncherState) -> tauri::plugin::TauriPlugin<R> {
    use tauri::Manager;

    tauri::plugin::Builder::new("ely-launcher")
        .invoke_handler(tauri::generate_handler![
            commands::launch_game,
            commands::login_ely,
            commands::load_saved_credentials,
            commands::get_launch_config,
            commands::save_launch_config,
        ])
        .setup(move |app, _api| {
            tracing::info!("ElyLauncher plugin starting...");
            app.manage(state);
            Ok(())
        })
        .build()
}

#[cfg(test)]
mod tests {
    const BUILD_SCRIPT: &str = include_str!("../build.rs");
    const DEFAULT_PERMISSIONS: &str = include_str!("../permissions/default.toml");
    const LIB_SOURCE: &str = include_str!("lib.rs");

    fn declared_commands() -> Vec<&'static str> {
        let start = BUILD_SCRIPT.find("&[").unwrap();
        let end = start + BUILD_SCRIPT[start..].find("];").unwrap();
        BUILD_SCRIPT[start..end]
            .split('"')
            .skip(1)
            .step_by(2)
            .collect()
    }

    #[test]
    fn every_registered_command_is_allowed_by_default() {
        let commands = declared_commands();
        assert_eq!(commands.len(), 5);

        for command in commands {
            let permission = format!("\"allow-{}\"", command.replace('_', "-"));
            assert!(DEFAULT_PERMISSIONS.contains(&permission), "{permission} missing");
            assert!(
                LIB_SOURCE.contains(&format!("commands::{command},")),
                "{command} not in the invoke handler"
            );
        }
    }
}
