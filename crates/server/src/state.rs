use std::sync::Arc;
use convertino_core::{ArtifactStore, Authenticator, Config, JobOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    orchestrator: Arc<JobOrchestrator>,
    store: Arc<ArtifactStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        orchestrator: Arc<JobOrchestrator>,
        store: Arc<ArtifactStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            orchestrator,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Whether requests skip header authentication.
    pub fn development_mode(&self) -> bool {
        self.authenticator.is_development_mode()
    }

    pub fn orchestrator(&self) -> &JobOrchestrator {
        self.orchestrator.as_ref()
    }

    pub fn store(&self) -> &ArtifactStore {
        self.store.as_ref()
    }
}
