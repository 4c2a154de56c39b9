//! Camera session controller.
//!
//! Owns at most one [`MediaStream`] at a time and walks it through
//! `Idle → Requesting → Active → Idle`, with `Error` recording the last
//! failed acquisition. The stream is released on stop, before a facing-mode
//! switch reacquires, after a successful capture, and when the session is
//! dropped.

use super::{
    AcquireError, CameraBackend, CameraConfig, CameraError, CapturedImage, FacingMode,
    ImageError, MediaStream, Resolution, StreamRequest,
};
use crate::metrics::MetricsRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Message recorded when the startup probe fails.
pub const PROBE_FAILED_MESSAGE: &str = "Camera access denied or no camera found";

/// Lifecycle state of a [`CameraSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    Error,
}

/// Errors raised by [`CameraSession::capture`].
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera is not active")]
    NotActive,
    #[error("no frame available: {0}")]
    NoFrame(#[from] CameraError),
    #[error(transparent)]
    Encode(#[from] ImageError),
}

impl CaptureError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::NotActive => "Could not capture image. Please try again.",
            CaptureError::NoFrame(_) | CaptureError::Encode(_) => {
                "Failed to capture image. Please try again."
            }
        }
    }
}

/// What a preview surface needs to render the live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBinding {
    pub stream_id: String,
    pub facing_mode: FacingMode,
    /// Front-camera previews are shown mirrored.
    pub mirrored: bool,
    pub resolution: Option<Resolution>,
}

/// Controller for a single device camera stream.
pub struct CameraSession<B: CameraBackend> {
    backend: B,
    config: CameraConfig,
    state: SessionState,
    facing_mode: FacingMode,
    stream: Option<MediaStream>,
    preview: Option<PreviewBinding>,
    error: Option<String>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<B: CameraBackend> CameraSession<B> {
    pub fn new(backend: B, config: CameraConfig) -> Self {
        let facing_mode = config.default_facing;
        Self {
            backend,
            config,
            state: SessionState::Idle,
            facing_mode,
            stream: None,
            preview: None,
            error: None,
            metrics: None,
        }
    }

    /// Records stream and capture events in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Facing mode used by the next (or current) stream.
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn preview(&self) -> Option<&PreviewBinding> {
        self.preview.as_ref()
    }

    /// Last user-facing error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// One-shot acquire and release used to decide whether a camera is
    /// usable at all. Returns `true` without probing while a stream is live.
    pub fn probe_support(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }
        let request = self.request(self.facing_mode);
        match self.backend.acquire(&request) {
            Ok(mut stream) => {
                stream.stop();
                true
            }
            Err(err) => {
                warn!(error = %err, "Camera support probe failed");
                self.error = Some(PROBE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Acquires a stream for `facing_mode`, releasing any current one first.
    ///
    /// On failure the session moves to [`SessionState::Error`] with a
    /// user-facing message; the attempt is not retried.
    pub fn start(&mut self, facing_mode: FacingMode) -> Result<(), AcquireError> {
        self.stop();
        self.facing_mode = facing_mode;
        self.error = None;
        self.state = SessionState::Requesting;

        let request = self.request(facing_mode);
        info!(facing = %facing_mode, ideal = %request.ideal, "Requesting camera stream");

        match self.backend.acquire(&request) {
            Ok(stream) => {
                let binding = PreviewBinding {
                    stream_id: stream.id().to_string(),
                    facing_mode,
                    mirrored: facing_mode == FacingMode::User,
                    resolution: stream.native_resolution(),
                };
                info!(stream = %binding.stream_id, "Camera stream active");
                self.preview = Some(binding);
                self.stream = Some(stream);
                self.state = SessionState::Active;
                if let Some(metrics) = &self.metrics {
                    metrics.record_stream_acquired();
                }
                Ok(())
            }
            Err(err) => {
                warn!(facing = %facing_mode, kind = err.kind(), error = %err, "Camera acquisition failed");
                self.error = Some(err.user_message());
                self.state = SessionState::Error;
                if let Some(metrics) = &self.metrics {
                    metrics.record_acquire_failure(err.kind());
                }
                Err(err)
            }
        }
    }

    /// Releases the stream and clears the preview. Safe to call in any state.
    /// The last error message is kept for display.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            if let Some(metrics) = &self.metrics {
                metrics.record_stream_released();
            }
        }
        self.preview = None;
        self.state = SessionState::Idle;
    }

    /// Flips the facing mode, restarting the stream if one is active.
    pub fn toggle_facing(&mut self) -> Result<(), AcquireError> {
        let next = self.facing_mode.toggled();
        if self.is_active() {
            self.start(next)
        } else {
            self.facing_mode = next;
            Ok(())
        }
    }

    /// Captures the current frame as a JPEG still and releases the stream.
    ///
    /// A failed capture leaves an active stream running so the user can
    /// retry without a new permission request.
    pub fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        let result = self.capture_frame();
        match &result {
            Ok(still) => {
                info!(size = %still.resolution(), bytes = still.len(), "Image captured");
                if let Some(metrics) = &self.metrics {
                    metrics.record_capture();
                }
                self.error = None;
                self.stop();
            }
            Err(err) => {
                warn!(error = %err, "Capture failed");
                self.error = Some(err.user_message().to_string());
            }
        }
        result
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, CaptureError> {
        let stream = match (&mut self.stream, self.state) {
            (Some(stream), SessionState::Active) => stream,
            _ => return Err(CaptureError::NotActive),
        };

        let target = stream
            .native_resolution()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.config.fallback_resolution());
        let frame = stream.read_frame()?;
        let mirror = self.facing_mode == FacingMode::User && self.config.mirror_user_capture;

        Ok(CapturedImage::from_frame(
            frame,
            target,
            self.facing_mode,
            mirror,
            self.config.jpeg_quality,
        )?)
    }

    fn request(&self, facing_mode: FacingMode) -> StreamRequest {
        StreamRequest {
            facing_mode,
            ideal: self.config.ideal_resolution(),
        }
    }
}

impl<B: CameraBackend> Drop for CameraSession<B> {
    fn drop(&mut self) {
        if self.stream.is_some() {
            info!("Camera session dropped; releasing stream");
        }
        self.stop();
    }
}
