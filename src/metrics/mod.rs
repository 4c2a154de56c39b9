//! Prometheus metrics for camera and scan activity.
//!
//! # Metrics Exposed
//!
//! ## Camera
//! - `plantcare_camera_streams_acquired_total` - Streams acquired
//! - `plantcare_camera_streams_released_total` - Streams released
//! - `plantcare_camera_live_streams` - Streams currently holding the device
//! - `plantcare_camera_acquire_failures_total{kind}` - Failed acquisitions
//!
//! ## Scans
//! - `plantcare_captures_total` - Stills captured from the camera
//! - `plantcare_uploads_total` - Images chosen from disk
//! - `plantcare_predictions_total{outcome}` - Prediction requests, `ok` or `error`
//!
//! With the `metrics` feature, [`MetricsServer`] serves the registry over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use plantcare::metrics::MetricsRegistry;
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.record_stream_acquired();
//! registry.record_capture();
//! registry.record_stream_released();
//!
//! assert_eq!(registry.snapshot().live_streams, 0);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
