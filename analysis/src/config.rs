use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_DISPLAY_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ADVISORY_TIMEOUT_MS: u64 = 60_000;

/// Endpoints and timing of the analysis flow.
///
/// Durations are milliseconds so the struct maps directly onto YAML and
/// environment values. A timeout of `0` disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Empty means same origin (the browser build).
    pub api_base: String,
    pub predict_path: String,
    pub recommend_path: String,
    pub health_path: String,
    pub min_display_ms: u64,
    pub request_timeout_ms: u64,
    pub advisory_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            predict_path: "/predict".to_string(),
            recommend_path: "/recommend".to_string(),
            health_path: "/healthz".to_string(),
            min_display_ms: DEFAULT_MIN_DISPLAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            advisory_timeout_ms: DEFAULT_ADVISORY_TIMEOUT_MS,
        }
    }
}

impl OrchestratorConfig {
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn advisory_timeout(&self) -> Option<Duration> {
        (self.advisory_timeout_ms > 0).then(|| Duration::from_millis(self.advisory_timeout_ms))
    }

    pub fn predict_url(&self) -> String {
        self.join(&self.predict_path)
    }

    pub fn recommend_url(&self) -> String {
        self.join(&self.recommend_path)
    }

    pub fn health_url(&self) -> String {
        self.join(&self.health_path)
    }

    fn join(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
