//! Camera input, session control and still capture.
//!
//! A [`CameraSession`] drives a [`CameraBackend`] and owns the single live
//! [`MediaStream`]. Captured and uploaded pictures both end up as a
//! [`CapturedImage`].

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod session;
mod still;

pub use camera::{
    AcquireError, CameraBackend, CameraError, FacingMode, MediaStream, MockCamera,
    MockCameraProbe, StreamDriver, StreamRequest, TrackInfo, TrackKind,
};
pub use config::{CameraConfig, CameraConfigError};
pub use frame::{Frame, Resolution};
#[cfg(feature = "camera")]
pub use native::NativeCamera;
pub use session::{CameraSession, CaptureError, PreviewBinding, SessionState, PROBE_FAILED_MESSAGE};
pub use still::{CapturedImage, ImageError, ImageOrigin};
