// ─── ElyLauncher Core ───
// Glue between the launcher UI, Ely.by, and the external game launcher.
//
// Architecture:
//   core/
//     auth/    — Offline identities, Ely.by login, plaintext credential file
//     config   — launcher_config.json (java path + memory)
//     skins    — SkinsRestorer.json for the Ely.by skin provider
//     paths    — Data dir layout and the immutable launch paths
//     launch/  — Launch options, event channel, UI relay, session orchestrator
//     http     — Shared HTTP client
//     state    — Shared state behind the desktop commands

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod launch;
pub mod paths;
pub mod skins;
pub mod state;
