use remote::{HttpBackend, RemoteConfig};
use staging::{StagingConfig, StagingEngine};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub session: StagingEngine<HttpBackend>,
}

impl AppState {
    pub fn new(backend: HttpBackend, config: StagingConfig) -> Self {
        Self {
            session: StagingEngine::with_config(backend, config),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let remote = RemoteConfig::from_env();
        let staging = StagingConfig::from_env();
        let backend = HttpBackend::new(&remote)?;
        info!(
            backend = backend.base_url(),
            strict_candidates = staging.strict_candidates,
            "staging session configured"
        );
        Ok(Self::new(backend, staging))
    }
}
