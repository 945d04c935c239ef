use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "SLOTWISE__BACKEND__URL";
pub const ENV_BACKEND_TIMEOUT: &str = "SLOTWISE__BACKEND__TIMEOUT_SECS";

const DEFAULT_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_BACKEND_URL).unwrap_or_else(|_| DEFAULT_URL.into());
        let secs = std::env::var(ENV_BACKEND_TIMEOUT)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(secs),
        }
    }
}
