//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Point-in-time view of the counters, mostly for tests and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Streams successfully acquired.
    pub streams_acquired: u64,
    /// Streams released.
    pub streams_released: u64,
    /// Streams currently live.
    pub live_streams: i64,
    /// Acquisition failures of every kind.
    pub acquire_failures: u64,
    /// Stills captured from a live stream.
    pub captures: u64,
    /// Images taken from disk instead of the camera.
    pub uploads: u64,
    /// Predictions returned by the backend.
    pub predictions: u64,
    /// Prediction requests that failed.
    pub prediction_failures: u64,
}

/// Prometheus metrics registry for camera and scan activity.
pub struct MetricsRegistry {
    registry: Registry,

    // Stream lifecycle
    streams_acquired: IntCounter,
    streams_released: IntCounter,
    live_streams: IntGauge,
    acquire_failures: IntCounterVec,

    // Scan activity
    captures: IntCounter,
    uploads: IntCounter,
    predictions: IntCounterVec,
}

/// Failure kinds pre-registered so they export as zero before first use.
const FAILURE_KINDS: [&str; 5] = ["permission_denied", "not_found", "busy", "unsupported", "other"];

impl MetricsRegistry {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let streams_acquired = IntCounter::new(
            "plantcare_camera_streams_acquired_total",
            "Total camera streams acquired",
        )?;
        let streams_released = IntCounter::new(
            "plantcare_camera_streams_released_total",
            "Total camera streams released",
        )?;
        let live_streams = IntGauge::new(
            "plantcare_camera_live_streams",
            "Camera streams currently holding the device",
        )?;
        let acquire_failures = IntCounterVec::new(
            Opts::new(
                "plantcare_camera_acquire_failures_total",
                "Camera acquisition failures by kind",
            ),
            &["kind"],
        )?;

        let captures = IntCounter::new(
            "plantcare_captures_total",
            "Stills captured from the camera",
        )?;
        let uploads = IntCounter::new(
            "plantcare_uploads_total",
            "Images selected from disk for analysis",
        )?;
        let predictions = IntCounterVec::new(
            Opts::new(
                "plantcare_predictions_total",
                "Prediction requests by outcome",
            ),
            &["outcome"],
        )?;

        for kind in FAILURE_KINDS {
            acquire_failures.with_label_values(&[kind]);
        }
        predictions.with_label_values(&["ok"]);
        predictions.with_label_values(&["error"]);

        registry.register(Box::new(streams_acquired.clone()))?;
        registry.register(Box::new(streams_released.clone()))?;
        registry.register(Box::new(live_streams.clone()))?;
        registry.register(Box::new(acquire_failures.clone()))?;
        registry.register(Box::new(captures.clone()))?;
        registry.register(Box::new(uploads.clone()))?;
        registry.register(Box::new(predictions.clone()))?;

        Ok(Self {
            registry,
            streams_acquired,
            streams_released,
            live_streams,
            acquire_failures,
            captures,
            uploads,
            predictions,
        })
    }

    pub fn record_stream_acquired(&self) {
        self.streams_acquired.inc();
        self.live_streams.inc();
    }

    pub fn record_stream_released(&self) {
        self.streams_released.inc();
        self.live_streams.dec();
    }

    /// `kind` is an [`AcquireError::kind`](crate::capture::AcquireError::kind) label.
    pub fn record_acquire_failure(&self, kind: &str) {
        self.acquire_failures.with_label_values(&[kind]).inc();
    }

    pub fn record_capture(&self) {
        self.captures.inc();
    }

    pub fn record_upload(&self) {
        self.uploads.inc();
    }

    pub fn record_prediction(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.predictions.with_label_values(&[outcome]).inc();
    }

    /// Reads every counter back.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let acquire_failures = self
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == "plantcare_camera_acquire_failures_total")
            .flat_map(|family| family.get_metric())
            .map(|metric| metric.get_counter().get_value() as u64)
            .sum();

        MetricsSnapshot {
            streams_acquired: self.streams_acquired.get(),
            streams_released: self.streams_released.get(),
            live_streams: self.live_streams.get(),
            acquire_failures,
            captures: self.captures.get(),
            uploads: self.uploads.get(),
            predictions: self.predictions.with_label_values(&["ok"]).get(),
            prediction_failures: self.predictions.with_label_values(&["error"]).get(),
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
