use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_IMAGE_BASE_URL, DEFAULT_TARGET_IMAGE, DETECTION_MODEL, ENV_ENDPOINT, ENV_KEY,
    PERSON_CREATE_DELAY_MS, RECOGNITION_MODEL, SAMPLE_PERSONS, TRAINING_POLL_INTERVAL_MS,
    TRAINING_TIMEOUT_SECS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a quickstart run needs besides credentials.
///
/// Missing fields fall back to the built-in sample data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub image_base_url: String,
    /// Person label → image names (or absolute URLs) to enroll for it.
    pub persons: BTreeMap<String, Vec<String>>,
    pub target_image: String,
    pub recognition_model: String,
    pub detection_model: String,
    pub person_create_delay_ms: u64,
    pub training_poll_interval_ms: u64,
    /// `None` polls until the service reports a terminal status.
    pub training_timeout_secs: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            persons: SAMPLE_PERSONS
                .iter()
                .map(|(name, images)| {
                    (
                        name.to_string(),
                        images.iter().map(|i| i.to_string()).collect(),
                    )
                })
                .collect(),
            target_image: DEFAULT_TARGET_IMAGE.to_string(),
            recognition_model: RECOGNITION_MODEL.to_string(),
            detection_model: DETECTION_MODEL.to_string(),
            person_create_delay_ms: PERSON_CREATE_DELAY_MS,
            training_poll_interval_ms: TRAINING_POLL_INTERVAL_MS,
            training_timeout_secs: Some(TRAINING_TIMEOUT_SECS),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads `explicit` if given, else the per-user config file if it
    /// exists, else the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("Using config {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/face-identify/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("face-identify").join("config.json"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recognition_model.trim().is_empty() || self.detection_model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "recognition_model and detection_model must be set".into(),
            ));
        }
        if self.target_image.trim().is_empty() {
            return Err(ConfigError::Invalid("target_image must be set".into()));
        }
        if self.persons.is_empty() {
            return Err(ConfigError::Invalid("at least one person is required".into()));
        }
        if self.training_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "training_poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Resolves an image name against `image_base_url`; absolute URLs pass
    /// through untouched.
    pub fn image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            format!("{}{}", self.image_base_url, image)
        }
    }

    pub fn person_create_delay(&self) -> Duration {
        Duration::from_millis(self.person_create_delay_ms)
    }

    pub fn training_poll_interval(&self) -> Duration {
        Duration::from_millis(self.training_poll_interval_ms)
    }

    /// `None` (or `0`) waits for training without a deadline.
    pub fn training_timeout(&self) -> Option<Duration> {
        self.training_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// Endpoint and subscription key for the remote service.
#[derive(Clone)]
pub struct Credentials {
    pub endpoint: String,
    pub key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `VISION_ENDPOINT` / `VISION_KEY` through `lookup`; blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };
        Ok(Self {
            endpoint: get(ENV_ENDPOINT)?,
            key: get(ENV_KEY)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}
