use std::path::{Path, PathBuf};

use crate::core::auth::credentials::CREDENTIALS_FILE;
use crate::core::config::LaunchConfig;
use crate::core::error::{LauncherError, LauncherResult};

const APP_DIR_NAME: &str = "ElyLauncher";
const LAUNCH_CONFIG_FILE: &str = "launcher_config.json";
const GAME_DIR_NAME: &str = "minecraft";
pub const FORGE_INSTALLER_NAME: &str = "forge-1.20.1-47.4.10-installer.jar";

/// On-disk layout of the launcher data directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// `<platform data dir>/ElyLauncher`, created if missing.
    pub fn default_location() -> LauncherResult<Self> {
        Self::under_base_dir(dirs::data_dir())
    }

    fn under_base_dir(base: Option<PathBuf>) -> LauncherResult<Self> {
        let base = base.ok_or_else(|| LauncherError::Other("no platform data directory".into()))?;
        let data_dir = base.join(APP_DIR_NAME);
        std::fs::create_dir_all(&data_dir).map_err(|source| LauncherError::Io {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn launch_config_file(&self) -> PathBuf {
        self.data_dir.join(LAUNCH_CONFIG_FILE)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }

    pub fn game_root(&self) -> PathBuf {
        self.data_dir.join(GAME_DIR_NAME)
    }

    pub fn forge_installer(&self) -> PathBuf {
        self.data_dir.join(FORGE_INSTALLER_NAME)
    }

    /// Java binary from the config; relative paths point inside the data dir
    /// where the bundled JDK lives.
    pub fn java_executable(&self, config: &LaunchConfig) -> PathBuf {
        let configured = Path::new(&config.java_path);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.data_dir.join(configured)
        }
    }

    pub fn launch_paths(&self, config: &LaunchConfig) -> LaunchPaths {
        LaunchPaths {
            game_root: self.game_root(),
            java_executable: self.java_executable(config),
            forge_installer: self.forge_installer(),
            launch_config_file: self.launch_config_file(),
            extra_jvm_args: Vec::new(),
        }
    }
}

/// Everything the orchestrator needs to know about the filesystem, fixed for
/// the lifetime of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPaths {
    pub game_root: PathBuf,
    pub java_executable: PathBuf,
    pub forge_installer: PathBuf,
    pub launch_config_file: PathBuf,
    /// Appended after the built-in JVM arguments.
    pub extra_jvm_args: Vec<String>,
}

impl LaunchPaths {
    pub fn with_extra_jvm_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_jvm_args.extend(args);
        self
    }

    /// Paths handed to the process launcher must be absolute.
    pub fn ensure_absolute(&self) -> LauncherResult<()> {
        for (label, path) in [
            ("game root", &self.game_root),
            ("java executable", &self.java_executable),
            ("forge installer", &self.forge_installer),
        ] {
            if !path.is_absolute() {
                return Err(LauncherError::LaunchPreparation(format!(
                    "{label} path is not absolute: {path:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_platform_dir_is_an_error() {
        let err = AppPaths::under_base_dir(None).unwrap_err();
        assert!(matches!(err, LauncherError::Other(ref msg) if msg == "no platform data directory"));

        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::under_base_dir(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.data_dir(), dir.path().join("ElyLauncher"));
        assert!(paths.data_dir().is_dir());
    }

    #[test]
    fn layout_lives_under_data_dir() {
        let paths = AppPaths::from_data_dir("/srv/ely");
        assert_eq!(paths.launch_config_file(), Path::new("/srv/ely/launcher_config.json"));
        assert_eq!(paths.credentials_file(), Path::new("/srv/ely/user_auth.json"));
        assert_eq!(paths.game_root(), Path::new("/srv/ely/minecraft"));
        assert_eq!(
            paths.forge_installer(),
            Path::new("/srv/ely/forge-1.20.1-47.4.10-installer.jar")
        );
    }

    #[test]
    fn relative_java_path_resolves_against_data_dir() {
        let paths = AppPaths::from_data_dir("/srv/ely");
        let config = LaunchConfig::default();
        assert_eq!(
            paths.java_executable(&config),
            Path::new("/srv/ely/jdk-17/bin/java.exe")
        );

        let config = LaunchConfig {
            java_path: "/usr/lib/jvm/java-17/bin/java".into(),
            ..LaunchConfig::default()
        };
        assert_eq!(
            paths.java_executable(&config),
            Path::new("/usr/lib/jvm/java-17/bin/java")
        );
    }

    #[test]
    fn relative_paths_are_rejected() {
        let mut launch = AppPaths::from_data_dir("/srv/ely").launch_paths(&LaunchConfig::default());
        assert!(launch.ensure_absolute().is_ok());

        launch.forge_installer = PathBuf::from("forge.jar");
        let err = launch.ensure_absolute().unwrap_err();
        assert!(matches!(err, LauncherError::LaunchPreparation(_)));
        assert!(err.to_string().contains("forge installer"));
    }
}
