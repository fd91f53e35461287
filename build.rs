#[cfg(feature = "desktop")]
const COMMANDS: &[&str] = &[
    "launch_game",
    "login_ely",
    "load_saved_credentials",
    "get_launch_config",
    "save_launch_config",
];

fn main() {
    // Generates the allow-/deny- permissions for every command.
    #[cfg(feature = "desktop")]
    tauri_plugin::Builder::new(COMMANDS).build();
}
