use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::core::auth::{Authenticator, ElyAuthClient, IdentityResolver, PlaintextCredentialStore};
use crate::core::config::{load_user_config, save_user_config, LaunchConfig, SaveOutcome};
use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::launch::{LaunchOrchestrator, ProcessLauncher};
use crate::core::paths::AppPaths;

/// Everything the desktop commands share.
pub struct LauncherState {
    app_paths: AppPaths,
    resolver: IdentityResolver,
    orchestrator: RwLock<LaunchOrchestrator>,
}

impl LauncherState {
    /// Wire up the real Ely.by client against `app_paths`.
    pub async fn initialize(
        app_paths: AppPaths,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> LauncherResult<Self> {
        let client = build_http_client()?;
        let authenticator = Arc::new(ElyAuthClient::new(client));
        Ok(Self::with_authenticator(app_paths, launcher, authenticator).await)
    }

    pub async fn with_authenticator(
        app_paths: AppPaths,
        launcher: Arc<dyn ProcessLauncher>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let config = load_user_config(&app_paths.launch_config_file()).await;
        let orchestrator = LaunchOrchestrator::new(app_paths.launch_paths(&config), launcher);
        let resolver = IdentityResolver::new(
            authenticator,
            PlaintextCredentialStore::new(app_paths.credentials_file()),
        );

        info!("Launcher data directory: {:?}", app_paths.data_dir());
        Self {
            app_paths,
            resolver,
            orchestrator: RwLock::new(orchestrator),
        }
    }

    pub fn app_paths(&self) -> &AppPaths {
        &self.app_paths
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Snapshot of the current orchestrator. Sessions already running keep
    /// the paths they started with.
    pub async fn orchestrator(&self) -> LaunchOrchestrator {
        self.orchestrator.read().await.clone()
    }

    pub async fn launch_config(&self) -> LaunchConfig {
        load_user_config(&self.app_paths.launch_config_file()).await
    }

    /// Persist the config; on success later launches pick up the new java path.
    pub async fn save_launch_config(&self, config: &LaunchConfig) -> SaveOutcome {
        let outcome = save_user_config(config, &self.app_paths.launch_config_file()).await;
        if outcome.success {
            let mut orchestrator = self.orchestrator.write().await;
            let paths = self
                .app_paths
                .launch_paths(config)
                .with_extra_jvm_args(orchestrator.paths().extra_jvm_args.clone());
            *orchestrator = orchestrator.with_paths(paths);
        }
        outcome
    }
}
