use analysis::OrchestratorConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/client.yaml";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid API base URL {0:?}: expected http:// or https://")]
    InvalidApiBase(String),
}

/// Values from the environment or the command line. Each one that is set
/// replaces what the YAML file says.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub min_display_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub advisory_timeout_ms: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, config: &mut OrchestratorConfig) {
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(ms) = self.min_display_ms {
            config.min_display_ms = ms;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(ms) = self.advisory_timeout_ms {
            config.advisory_timeout_ms = ms;
        }
    }
}

pub fn from_yaml(text: &str) -> Result<OrchestratorConfig, ConfigError> {
    if text.trim().is_empty() {
        return Ok(OrchestratorConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Reads `path`, or the default location if it exists, then applies
/// `overrides`. An explicit path that cannot be read is an error.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<OrchestratorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.is_file() {
                read(default_path)?
            } else {
                log::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                OrchestratorConfig::default()
            }
        }
    };

    overrides.apply(&mut config);
    if config.api_base.trim().is_empty() {
        config.api_base = DEFAULT_API_BASE.to_string();
    }
    validate(&config)?;
    Ok(config)
}

fn read(path: &Path) -> Result<OrchestratorConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded client config from {}", path.display());
    from_yaml(&text)
}

fn validate(config: &OrchestratorConfig) -> Result<(), ConfigError> {
    let base = config.api_base.trim();
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidApiBase(config.api_base.clone()))
    }
}
