//! Scan screen: choose a source, capture or upload, analyze, show the result.

use crate::capture::{CameraBackend, CameraSession, CapturedImage, FacingMode, PreviewBinding};
use crate::metrics::MetricsRegistry;
use crate::prediction::PredictionResult;
use crate::service::PlantCareApi;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Could not read the selected image. Please choose another file.";

/// Which part of the scan screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScreen {
    /// Camera and upload choices.
    Options,
    /// Live camera preview.
    Camera,
    /// Captured or uploaded still awaiting analysis.
    Preview,
    /// Prediction for the still.
    Result,
}

/// State machine behind the scan screen.
pub struct ScanWorkflow<B: CameraBackend> {
    session: CameraSession<B>,
    api: Arc<dyn PlantCareApi>,
    metrics: Option<Arc<MetricsRegistry>>,
    camera_supported: bool,
    captured: Option<CapturedImage>,
    analyzing: bool,
    prediction: Option<PredictionResult>,
    error: Option<String>,
}

impl<B: CameraBackend> ScanWorkflow<B> {
    pub fn new(session: CameraSession<B>, api: Arc<dyn PlantCareApi>) -> Self {
        Self {
            session,
            api,
            metrics: None,
            camera_supported: true,
            captured: None,
            analyzing: false,
            prediction: None,
            error: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn screen(&self) -> ScanScreen {
        if self.prediction.is_some() {
            ScanScreen::Result
        } else if self.captured.is_some() {
            ScanScreen::Preview
        } else if self.session.is_active() {
            ScanScreen::Camera
        } else {
            ScanScreen::Options
        }
    }

    pub fn session(&self) -> &CameraSession<B> {
        &self.session
    }

    pub fn camera_supported(&self) -> bool {
        self.camera_supported
    }

    pub fn preview(&self) -> Option<&PreviewBinding> {
        self.session.preview()
    }

    pub fn captured(&self) -> Option<&CapturedImage> {
        self.captured.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    /// Error to show: a workflow error, else the camera's while the
    /// options or the live camera are on screen.
    pub fn error(&self) -> Option<&str> {
        let camera_error = match self.screen() {
            ScanScreen::Options | ScanScreen::Camera => self.session.error(),
            ScanScreen::Preview | ScanScreen::Result => None,
        };
        self.error.as_deref().or(camera_error)
    }

    /// Checks once whether a camera can be opened at all.
    pub fn probe_camera(&mut self) -> bool {
        self.camera_supported = self.session.probe_support();
        self.camera_supported
    }

    /// Opens the camera with the current facing mode.
    pub fn open_camera(&mut self) {
        let facing = self.session.facing_mode();
        self.open_camera_facing(facing);
    }

    pub fn open_camera_facing(&mut self, facing_mode: FacingMode) {
        if !self.camera_supported {
            return;
        }
        self.error = None;
        // failure is recorded on the session
        let _ = self.session.start(facing_mode);
    }

    pub fn close_camera(&mut self) {
        self.session.stop();
    }

    pub fn toggle_camera(&mut self) {
        let _ = self.session.toggle_facing();
    }

    /// Captures the live frame; the camera is released on success.
    pub fn take_photo(&mut self) -> bool {
        match self.session.capture() {
            Ok(still) => {
                self.captured = Some(still);
                true
            }
            Err(_) => false,
        }
    }

    /// Uses a file from disk as the still, closing the camera if open.
    pub fn upload_file(&mut self, path: impl AsRef<Path>) -> bool {
        match CapturedImage::from_file(path.as_ref()) {
            Ok(still) => {
                self.use_upload(still);
                true
            }
            Err(err) => {
                warn!(path = %path.as_ref().display(), error = %err, "Upload rejected");
                self.error = Some(UPLOAD_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Uses an already decoded upload as the still.
    pub fn use_upload(&mut self, still: CapturedImage) {
        if self.session.is_active() {
            self.session.stop();
        }
        self.session.clear_error();
        self.error = None;
        if let Some(metrics) = &self.metrics {
            metrics.record_upload();
        }
        info!(bytes = still.len(), size = %still.resolution(), "Image selected for analysis");
        self.captured = Some(still);
    }

    /// Submits the still for classification. No-op without a still.
    pub async fn analyze(&mut self) -> Option<&PredictionResult> {
        let still = self.captured.as_ref()?;
        self.analyzing = true;
        self.error = None;

        let result = self.api.submit_prediction(still).await;
        self.analyzing = false;
        if let Some(metrics) = &self.metrics {
            metrics.record_prediction(result.is_ok());
        }

        match result {
            Ok(prediction) => {
                info!(
                    prediction = %prediction.prediction_id,
                    label = %prediction.display_name,
                    confidence = prediction.confidence,
                    "Analysis complete"
                );
                self.prediction = Some(prediction);
                self.prediction.as_ref()
            }
            Err(err) => {
                warn!(error = %err, "Analysis failed");
                self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                None
            }
        }
    }

    /// Discards the still and releases the camera.
    pub fn retake(&mut self) {
        self.session.stop();
        self.captured = None;
        self.error = None;
    }

    /// Clears the result and the still, back to the options.
    pub fn scan_another(&mut self) {
        self.prediction = None;
        self.captured = None;
        self.error = None;
    }
}
