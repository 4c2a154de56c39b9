//! Application configuration file.
//!
//! ```toml
//! [camera]
//! ideal_width = 1280
//! ideal_height = 720
//! jpeg_quality = 90
//!
//! [service]
//! base_url = "https://api.plantcare.example"
//! use_mock = true
//!
//! [metrics]
//! port = 0
//! ```

use crate::capture::{CameraConfig, CameraConfigError};
use crate::prediction::DEFAULT_API_BASE_URL;
use crate::service::MockDelays;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides `service.base_url` when set.
pub const API_URL_ENV: &str = "PLANTCARE_API_URL";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Camera(#[from] CameraConfigError),
    #[error("service base URL must not be empty")]
    EmptyBaseUrl,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    #[error("failed to serialize config: {0}")]
    SerializeError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Root URL of the PlantCare API; also the base for image URLs.
    pub base_url: String,
    /// Use the in-process mock instead of HTTP.
    pub use_mock: bool,
    /// Simulate backend latency in the mock.
    pub mock_delays: bool,
    /// Bearer token sent with HTTP requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            use_mock: true,
            mock_delays: true,
            token: None,
        }
    }
}

impl ServiceConfig {
    pub fn delays(&self) -> MockDelays {
        if self.mock_delays {
            MockDelays::default()
        } else {
            MockDelays::none()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl MetricsConfig {
    pub fn enabled(&self) -> bool {
        self.port != 0
    }
}

impl AppConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Applies [`API_URL_ENV`] from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_api_url(std::env::var(API_URL_ENV).ok());
    }

    fn apply_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.service.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FacingMode;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.service.base_url, DEFAULT_API_BASE_URL);
        assert!(!config.metrics.enabled());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [camera]
            jpeg_quality = 75
            default_facing = "user"

            [service]
            use_mock = false
            token = "abc"

            [metrics]
            port = 9100
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.jpeg_quality, 75);
        assert_eq!(config.camera.default_facing, FacingMode::User);
        assert_eq!(config.camera.ideal_width, 1280);
        assert!(!config.service.use_mock);
        assert_eq!(config.service.token.as_deref(), Some("abc"));
        assert!(config.metrics.enabled());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            AppConfig::from_toml_str("[camera]\njpeg_quality = 101\n"),
            Err(ConfigError::Camera(CameraConfigError::InvalidQuality(101)))
        );
        assert_eq!(
            AppConfig::from_toml_str("[service]\nbase_url = \"\"\n"),
            Err(ConfigError::EmptyBaseUrl)
        );
        assert!(matches!(
            AppConfig::from_toml_str("[camera\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.camera.mirror_user_capture = false;
        config.service.token = Some("t".into());

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[service]"));
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_api_url_override() {
        let mut config = AppConfig::default();
        config.apply_api_url(Some("   ".into()));
        assert_eq!(config.service.base_url, DEFAULT_API_BASE_URL);

        config.apply_api_url(Some("http://localhost:8000".into()));
        assert_eq!(config.service.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_mock_delays_toggle() {
        let mut service = ServiceConfig::default();
        assert_eq!(service.delays(), MockDelays::default());
        service.mock_delays = false;
        assert_eq!(service.delays(), MockDelays::none());
    }
}
