//! Camera session configuration.

use super::{FacingMode, Resolution};
use serde::{Deserialize, Serialize};

/// Configuration for camera acquisition and still capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Requested stream width in pixels.
    pub ideal_width: u32,
    /// Requested stream height in pixels.
    pub ideal_height: u32,
    /// Still size used when a stream does not report its resolution.
    pub fallback_width: u32,
    pub fallback_height: u32,
    /// JPEG quality for captured stills (1-100).
    pub jpeg_quality: u8,
    /// Mirror stills taken with the front camera.
    pub mirror_user_capture: bool,
    /// Facing mode used when the scan screen first opens the camera.
    pub default_facing: FacingMode,
    /// Device index treated as the front ("user") camera.
    pub user_device_index: u32,
    /// Device index treated as the back ("environment") camera.
    pub environment_device_index: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            fallback_width: 640,
            fallback_height: 480,
            jpeg_quality: 90,
            mirror_user_capture: true,
            default_facing: FacingMode::Environment,
            user_device_index: 0,
            environment_device_index: 0,
        }
    }
}

impl CameraConfig {
    /// Returns the requested stream resolution.
    pub fn ideal_resolution(&self) -> Resolution {
        Resolution::new(self.ideal_width, self.ideal_height)
    }

    /// Returns the still size used when the stream reports none.
    pub fn fallback_resolution(&self) -> Resolution {
        Resolution::new(self.fallback_width, self.fallback_height)
    }

    /// Returns the device index bound to a facing mode.
    pub fn device_index(&self, facing_mode: FacingMode) -> u32 {
        match facing_mode {
            FacingMode::User => self.user_device_index,
            FacingMode::Environment => self.environment_device_index,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), CameraConfigError> {
        if self.ideal_resolution().is_empty() || self.fallback_resolution().is_empty() {
            return Err(CameraConfigError::InvalidDimensions);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CameraConfigError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

/// Camera configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid JPEG quality {0} (must be 1-100)")]
    InvalidQuality(u8),
}
