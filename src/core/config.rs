// ─── Launch Config ───
// User-tunable JVM memory and java path, persisted as `launcher_config.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

pub const DEFAULT_JAVA_PATH: &str = "jdk-17/bin/java.exe";
pub const DEFAULT_MIN_MEMORY: &str = "2G";
pub const DEFAULT_MAX_MEMORY: &str = "4G";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    pub java_path: String,
    pub min_memory: String,
    pub max_memory: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            java_path: DEFAULT_JAVA_PATH.into(),
            min_memory: DEFAULT_MIN_MEMORY.into(),
            max_memory: DEFAULT_MAX_MEMORY.into(),
        }
    }
}

impl LaunchConfig {
    /// Shallow merge of a parsed document over the defaults.
    ///
    /// Only the three known keys are read, and only when they hold strings.
    /// Anything else in the document is ignored.
    pub fn merged_over_defaults(document: &Value) -> Self {
        let mut config = Self::default();
        let Some(object) = document.as_object() else {
            warn!("launcher config is not a JSON object, using defaults");
            return config;
        };

        for (key, slot) in [
            ("javaPath", &mut config.java_path),
            ("minMemory", &mut config.min_memory),
            ("maxMemory", &mut config.max_memory),
        ] {
            match object.get(key) {
                Some(Value::String(value)) => *slot = value.clone(),
                Some(other) => warn!("Ignoring non-string {key} in launcher config: {other}"),
                None => {}
            }
        }

        config
    }
}

/// Result of an explicit save, reported back to the UI as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

/// Load the launch config, falling back to defaults on any failure.
pub async fn load_user_config(path: &Path) -> LaunchConfig {
    match read_config_document(path).await {
        Ok(Some(document)) => LaunchConfig::merged_over_defaults(&document),
        Ok(None) => {
            debug!("No launcher config at {:?}, using defaults", path);
            LaunchConfig::default()
        }
        Err(err) => {
            error!("[CONFIG ERROR] Cannot load launcher config: {err}");
            LaunchConfig::default()
        }
    }
}

async fn read_config_document(path: &Path) -> LauncherResult<Option<Value>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(Some(serde_json::from_str(&raw)?))
}

/// Persist the three whitelisted fields. Never fails past this boundary.
pub async fn save_user_config(config: &LaunchConfig, path: &Path) -> SaveOutcome {
    match write_config(config, path).await {
        Ok(()) => {
            info!("Launcher config saved to {:?}", path);
            SaveOutcome {
                success: true,
                message: "Configuration saved successfully.".into(),
            }
        }
        Err(err) => {
            error!("[CONFIG ERROR] Cannot save launcher config: {err}");
            SaveOutcome {
                success: false,
                message: format!("Error while saving: {err}"),
            }
        }
    }
}

async fn write_config(config: &LaunchConfig, path: &Path) -> LauncherResult<()> {
    // Serializing the struct itself is what drops any extra keys a caller
    // may have merged into the UI-side object.
    let json = serde_json::to_string_pretty(config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, json)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_user_config(&dir.path().join("launcher_config.json")).await;
        assert_eq!(config, LaunchConfig::default());
        assert_eq!(config.java_path, "jdk-17/bin/java.exe");
        assert_eq!(config.min_memory, "2G");
        assert_eq!(config.max_memory, "4G");
    }

    #[tokio::test]
    async fn malformed_file_yields_defaults_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_user_config(&path).await, LaunchConfig::default());
        assert_eq!(load_user_config(&path).await, LaunchConfig::default());
    }

    #[tokio::test]
    async fn partial_file_is_merged_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher_config.json");
        std::fs::write(&path, r#"{"maxMemory":"8G","theme":"dark"}"#).unwrap();

        let config = load_user_config(&path).await;
        assert_eq!(config.max_memory, "8G");
        assert_eq!(config.min_memory, "2G");
        assert_eq!(config.java_path, "jdk-17/bin/java.exe");
    }

    #[test]
    fn wrongly_typed_keys_keep_defaults() {
        let config = LaunchConfig::merged_over_defaults(&json!({
            "minMemory": 1024,
            "javaPath": "/usr/bin/java",
        }));
        assert_eq!(config.min_memory, "2G");
        assert_eq!(config.java_path, "/usr/bin/java");

        assert_eq!(
            LaunchConfig::merged_over_defaults(&json!(["2G"])),
            LaunchConfig::default()
        );
    }

    #[tokio::test]
    async fn save_then_load_round_trips_whitelisted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("launcher_config.json");
        let config = LaunchConfig {
            java_path: "/opt/jdk-17/bin/java".into(),
            min_memory: "1G".into(),
            max_memory: "6G".into(),
        };

        let outcome = save_user_config(&config, &path).await;
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(load_user_config(&path).await, config);
    }

    #[tokio::test]
    async fn save_drops_injected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher_config.json");

        let from_ui = json!({
            "javaPath": "java",
            "minMemory": "1G",
            "maxMemory": "3G",
            "injected": true,
        });
        let config: LaunchConfig = serde_json::from_value(from_ui).unwrap();
        assert!(save_user_config(&config, &path).await.success);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<_> = written.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(written.get("injected").is_none());
    }

    #[tokio::test]
    async fn save_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the write fail.
        let path = dir.path().join("launcher_config.json");
        std::fs::create_dir(&path).unwrap();

        let outcome = save_user_config(&LaunchConfig::default(), &path).await;
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Error while saving"));
    }
}
