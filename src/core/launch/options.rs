// ─── Launch Options ───
// The option document handed to the process launcher.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::auth::{Identity, OFFLINE_ACCESS_TOKEN, OFFLINE_CLIENT_TOKEN};
use crate::core::config::LaunchConfig;
use crate::core::error::LauncherResult;
use crate::core::paths::LaunchPaths;

pub const GAME_VERSION: &str = "1.20.1";
pub const GAME_VERSION_TYPE: &str = "forge";

/// Point the authlib lookups at Ely.by's skin system.
const SKIN_REDIRECT_ARGS: [&str; 3] = [
    "-Dminecraft.api.url=http://skinsystem.ely.by/",
    "-Dsession.servers=http://skinsystem.ely.by",
    "-Dtextures.servers=http://skinsystem.ely.by",
];

/// Module access Forge 47 needs on Java 17.
const FORGE_JVM_ARGS: [&str; 8] = [
    "-XX:+ShowCodeDetailsInExceptionMessages",
    "--add-opens=java.base/java.lang.reflect=ALL-UNNAMED",
    "--add-opens=java.base/java.lang.invoke=ALL-UNNAMED",
    "--add-opens=java.base/java.util.concurrent.atomic=ALL-UNNAMED",
    "--add-opens=java.base/java.io=ALL-UNNAMED",
    "--add-opens=java.base/java.security=ALL-UNNAMED",
    "--add-exports=java.base/sun.security.util=ALL-UNNAMED",
    "--add-exports=java.base/sun.nio.fs=ALL-UNNAMED",
];

/// Account block in the shape the launcher library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorization {
    pub access_token: String,
    pub client_token: String,
    pub uuid: String,
    pub name: String,
}

impl From<&Identity> for Authorization {
    fn from(identity: &Identity) -> Self {
        Self {
            access_token: identity
                .access_token
                .clone()
                .unwrap_or_else(|| OFFLINE_ACCESS_TOKEN.into()),
            client_token: identity
                .client_token
                .clone()
                .unwrap_or_else(|| OFFLINE_CLIENT_TOKEN.into()),
            uuid: identity.uuid.clone(),
            name: identity.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameVersion {
    pub number: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryBounds {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub authorization: Authorization,
    pub root: PathBuf,
    pub forge: PathBuf,
    pub version: GameVersion,
    pub java_path: PathBuf,
    pub memory: MemoryBounds,
    pub custom_args: Vec<String>,
}

impl LaunchOptions {
    /// Build the final invocation. Fails when a path is not absolute.
    pub fn assemble(
        identity: &Identity,
        paths: &LaunchPaths,
        config: &LaunchConfig,
    ) -> LauncherResult<Self> {
        paths.ensure_absolute()?;

        Ok(Self {
            authorization: Authorization::from(identity),
            root: paths.game_root.clone(),
            forge: paths.forge_installer.clone(),
            version: GameVersion {
                number: GAME_VERSION.into(),
                kind: GAME_VERSION_TYPE.into(),
            },
            java_path: paths.java_executable.clone(),
            memory: MemoryBounds {
                min: config.min_memory.clone(),
                max: config.max_memory.clone(),
            },
            custom_args: custom_jvm_args(&paths.extra_jvm_args),
        })
    }
}

/// Built-in arguments first, then caller extras verbatim. Extras may be
/// flag/value pairs, so repeats are kept.
fn custom_jvm_args(extra: &[String]) -> Vec<String> {
    SKIN_REDIRECT_ARGS
        .iter()
        .chain(FORGE_JVM_ARGS.iter())
        .map(|arg| arg.to_string())
        .chain(extra.iter().cloned())
        .collect()
}
