// ─── SkinsRestorer Config ───
// Fixed configuration for the SkinsRestorer mod so skins resolve through Ely.by.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

pub const SKINS_RESTORER_FILE: &str = "SkinsRestorer.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkinsRestorerConfig {
    language: &'static str,
    refresh_skin_on_join: bool,
    skin_apply_delay_on_join: u32,
    fetch_skin_on_first_join: bool,
    first_join_skin_provider: &'static str,
    proxy: &'static str,
    request_timeout: u32,
    providers: Providers,
}

#[derive(Debug, Serialize)]
struct Providers {
    mojang: Provider,
    ely_by: Provider,
    mineskin: Provider,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Provider {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'static str>,
    enabled: bool,
    name: &'static str,
    cache: ProviderCache,
}

#[derive(Debug, Serialize)]
struct ProviderCache {
    enabled: bool,
    duration: u32,
}

impl SkinsRestorerConfig {
    /// Ely.by is the only enabled provider. Field order is part of the
    /// format the mod expects.
    fn ely_only() -> Self {
        Self {
            language: "en_us",
            refresh_skin_on_join: true,
            skin_apply_delay_on_join: 15000,
            fetch_skin_on_first_join: true,
            first_join_skin_provider: "ELY.BY",
            proxy: "",
            request_timeout: 10,
            providers: Providers {
                mojang: Provider {
                    api_key: None,
                    enabled: false,
                    name: "mojang",
                    cache: ProviderCache {
                        enabled: false,
                        duration: 60,
                    },
                },
                ely_by: Provider {
                    api_key: None,
                    enabled: true,
                    name: "ely.by",
                    cache: ProviderCache {
                        enabled: true,
                        duration: 60,
                    },
                },
                mineskin: Provider {
                    api_key: Some(""),
                    enabled: false,
                    name: "web",
                    cache: ProviderCache {
                        enabled: false,
                        duration: 300,
                    },
                },
            },
        }
    }
}

/// Render the document exactly as it lands on disk.
pub fn render_skins_restorer_config() -> LauncherResult<String> {
    Ok(serde_json::to_string_pretty(&SkinsRestorerConfig::ely_only())?)
}

/// (Re)write `<game_root>/config/SkinsRestorer.json`.
///
/// The file is replaced unconditionally; whatever was there before is never
/// read. Returns the path that was written.
pub async fn write_skins_restorer_config(game_root: &Path) -> LauncherResult<PathBuf> {
    let config_dir = game_root.join("config");
    let config_file = config_dir.join(SKINS_RESTORER_FILE);

    if !config_dir.exists() {
        tokio::fs::create_dir_all(&config_dir)
            .await
            .map_err(|source| LauncherError::Io {
                path: config_dir.clone(),
                source,
            })?;
        info!("[SkinsRestorer Config] Created config directory {:?}", config_dir);
    }

    let rendered = render_skins_restorer_config()?;
    tokio::fs::write(&config_file, rendered)
        .await
        .map_err(|source| LauncherError::Io {
            path: config_file.clone(),
            source,
        })?;

    info!("SkinsRestorer config written to {:?}", config_file);
    Ok(config_file)
}
