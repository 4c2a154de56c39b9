//! PlantCare scan core
//!
//! Client-side core of a plant disease scanner: acquires a camera stream,
//! captures a still, hands it to the backend for classification and renders
//! the prediction that comes back.
//!
//! # Architecture
//!
//! ```text
//! capture (camera session → still) ──┐
//!                                    ├→ workflow → service (mock | http)
//! upload (file → still) ─────────────┘        ↓
//!                                        prediction (advice, confidence, dates)
//! ```
//!
//! # Design Principles
//!
//! - **One live stream**: a session never holds more than one device stream
//! - **Release on every exit**: stopping, capturing, toggling and dropping all
//!   stop every track of the stream
//! - **Classification is remote**: this crate only formats results
//!
//! # Example
//!
//! ```no_run
//! use plantcare::{
//!     capture::{CameraConfig, CameraSession, FacingMode, MockCamera},
//!     prediction::parse_advice,
//! };
//!
//! let mut session = CameraSession::new(MockCamera::new(), CameraConfig::default());
//! session.start(FacingMode::Environment).unwrap();
//!
//! let still = session.capture().unwrap();
//! println!("{} bytes, {}", still.len(), still.mime_type());
//!
//! let sections = parse_advice("TREATMENT:\nWater less.\nPREVENTION:\nMulch.");
//! assert_eq!(sections.prevention, "Mulch.");
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod forms;
pub mod metrics;
pub mod prediction;
pub mod service;
pub mod workflow;

// Re-export commonly used types at crate root
pub use capture::{CameraConfig, CameraSession, CapturedImage, FacingMode, MockCamera};
pub use config::AppConfig;
pub use metrics::MetricsRegistry;
pub use prediction::{parse_advice, AdviceSections, ConfidenceLevel, PredictionResult};
pub use service::{MockPlantCareApi, PlantCareApi, ServiceError};
pub use workflow::{ProfileWorkflow, ScanScreen, ScanWorkflow};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
