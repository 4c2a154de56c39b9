//! Camera abstraction for stream acquisition.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.
//! A granted stream is represented by [`MediaStream`], an owned handle that
//! stops every constituent track when it is stopped or dropped.

use super::{Frame, Resolution};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Which physical camera a stream is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Back camera, facing away from the user.
    #[default]
    Environment,
}

impl FacingMode {
    /// Returns the opposite facing mode.
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(FacingMode::User),
            "environment" | "back" | "rear" => Ok(FacingMode::Environment),
            other => Err(format!("unknown facing mode '{}'", other)),
        }
    }
}

/// Parameters of a stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing_mode: FacingMode,
    /// Preferred resolution; backends pick the closest they support.
    pub ideal: Resolution,
}

/// Errors that can occur while acquiring a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NotFound,
    #[error("camera device is busy")]
    Busy,
    #[error("camera access is not supported: {0}")]
    Unsupported(String),
    #[error("camera error: {0}")]
    Other(String),
}

impl AcquireError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AcquireError::PermissionDenied => "permission_denied",
            AcquireError::NotFound => "not_found",
            AcquireError::Busy => "busy",
            AcquireError::Unsupported(_) => "unsupported",
            AcquireError::Other(_) => "other",
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            AcquireError::PermissionDenied => {
                "Camera access denied. Please grant permission in your system settings."
                    .to_string()
            }
            AcquireError::NotFound => "No camera device found on this device.".to_string(),
            AcquireError::Busy => "Camera is already in use by another application.".to_string(),
            AcquireError::Unsupported(_) => {
                "Could not access the camera. Make sure your device has a camera.".to_string()
            }
            AcquireError::Other(name) => format!("Camera error: {}", name),
        }
    }
}

/// Errors that can occur while reading from a granted stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("stream has been stopped")]
    StreamStopped,
    #[error("failed to read frame: {0}")]
    ReadFailed(String),
}

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Video => f.write_str("video"),
            TrackKind::Audio => f.write_str("audio"),
        }
    }
}

/// Description of one constituent track of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub kind: TrackKind,
}

/// Backend-specific half of a granted stream.
pub trait StreamDriver {
    /// Tracks that are still running.
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Halts one track. Stopping an unknown or stopped track is a no-op.
    fn stop_track(&mut self, track_id: &str);

    /// Resolution the device actually delivers, if known.
    fn native_resolution(&self) -> Option<Resolution>;

    /// Reads the most recent frame.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;
}

/// Owned handle to a live camera stream.
///
/// Every track is stopped by [`MediaStream::stop`] or, failing that, when
/// the handle is dropped.
pub struct MediaStream {
    id: String,
    facing_mode: FacingMode,
    driver: Option<Box<dyn StreamDriver>>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, facing_mode: FacingMode, driver: Box<dyn StreamDriver>) -> Self {
        Self {
            id: id.into(),
            facing_mode,
            driver: Some(driver),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Returns true until the stream has been stopped.
    pub fn is_live(&self) -> bool {
        self.driver.is_some()
    }

    pub fn native_resolution(&self) -> Option<Resolution> {
        self.driver.as_ref()?.native_resolution()
    }

    pub fn read_frame(&mut self) -> Result<Frame, CameraError> {
        self.driver
            .as_mut()
            .ok_or(CameraError::StreamStopped)?
            .read_frame()
    }

    /// Stops every track and releases the device. Idempotent.
    pub fn stop(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };
        for track in driver.tracks() {
            debug!(stream = %self.id, track = %track.id, kind = %track.kind, "Stopping track");
            driver.stop_track(&track.id);
        }
        info!(stream = %self.id, facing = %self.facing_mode, "Camera stream released");
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("facing_mode", &self.facing_mode)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait CameraBackend {
    /// Requests a stream matching the request.
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, AcquireError>;
}

impl<B: CameraBackend + ?Sized> CameraBackend for Box<B> {
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, AcquireError> {
        (**self).acquire(request)
    }
}

#[derive(Debug, Default)]
struct MockShared {
    live: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
    fail_reads: AtomicBool,
    next_failure: Mutex<Option<AcquireError>>,
    failure: Mutex<Option<AcquireError>>,
}

impl MockShared {
    fn take_failure(&self) -> Option<AcquireError> {
        if let Ok(mut next) = self.next_failure.lock() {
            if let Some(err) = next.take() {
                return Some(err);
            }
        }
        self.failure.lock().ok().and_then(|f| f.clone())
    }
}

/// Mock camera for testing that generates synthetic frames.
///
/// Frames are a horizontal red gradient (dark on the left, bright on the
/// right) over a vertical green gradient, so orientation survives encoding.
#[derive(Debug)]
pub struct MockCamera {
    shared: Arc<MockShared>,
    resolution: Option<Resolution>,
    next_id: u64,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// Frame size produced when the mock reports no native resolution.
    pub const UNREPORTED_FRAME: Resolution = Resolution::new(320, 240);

    pub fn new() -> Self {
        Self {
            shared: Arc::new(MockShared::default()),
            resolution: Some(Resolution::new(64, 48)),
            next_id: 0,
        }
    }

    /// Sets the resolution the mock streams report. `None` simulates a
    /// device that never reports its size.
    pub fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        self.resolution = resolution;
        self
    }

    /// Makes every acquisition fail with `err`.
    pub fn failing(self, err: AcquireError) -> Self {
        if let Ok(mut failure) = self.shared.failure.lock() {
            *failure = Some(err);
        }
        self
    }

    /// Returns a handle for inspecting and steering the mock.
    pub fn probe(&self) -> MockCameraProbe {
        MockCameraProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl CameraBackend for MockCamera {
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, AcquireError> {
        if let Some(err) = self.shared.take_failure() {
            return Err(err);
        }

        self.next_id += 1;
        let id = format!("mock-{}-{}", request.facing_mode, self.next_id);
        let driver = MockStream {
            shared: Arc::clone(&self.shared),
            resolution: self.resolution,
            facing_mode: request.facing_mode,
            tracks: vec![TrackInfo {
                id: format!("{}-video", id),
                kind: TrackKind::Video,
            }],
            sequence: 0,
        };

        self.shared.live.fetch_add(1, Ordering::SeqCst);
        self.shared.acquired.fetch_add(1, Ordering::SeqCst);
        info!(stream = %id, facing = %request.facing_mode, "MockCamera stream granted");
        Ok(MediaStream::new(id, request.facing_mode, Box::new(driver)))
    }
}

/// Inspection handle shared with a [`MockCamera`].
#[derive(Debug, Clone)]
pub struct MockCameraProbe {
    shared: Arc<MockShared>,
}

impl MockCameraProbe {
    /// Number of streams granted and not yet released.
    pub fn live_streams(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    pub fn total_acquired(&self) -> u64 {
        self.shared.acquired.load(Ordering::SeqCst)
    }

    pub fn total_released(&self) -> u64 {
        self.shared.released.load(Ordering::SeqCst)
    }

    /// Makes only the next acquisition fail.
    pub fn fail_next_acquire(&self, err: AcquireError) {
        if let Ok(mut next) = self.shared.next_failure.lock() {
            *next = Some(err);
        }
    }

    /// Makes frame reads fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.shared.fail_reads.store(fail, Ordering::SeqCst);
    }
}

struct MockStream {
    shared: Arc<MockShared>,
    resolution: Option<Resolution>,
    facing_mode: FacingMode,
    tracks: Vec<TrackInfo>,
    sequence: u64,
}

impl StreamDriver for MockStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    fn stop_track(&mut self, track_id: &str) {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        if before > 0 && self.tracks.is_empty() {
            self.shared.live.fetch_sub(1, Ordering::SeqCst);
            self.shared.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn native_resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        if self.tracks.is_empty() {
            return Err(CameraError::StreamStopped);
        }
        if self.shared.fail_reads.load(Ordering::SeqCst) {
            return Err(CameraError::ReadFailed("no frame available".to_string()));
        }

        let size = self.resolution.unwrap_or(MockCamera::UNREPORTED_FRAME);
        let (w, h) = (size.width.max(1), size.height.max(1));
        let blue = match self.facing_mode {
            FacingMode::User => 200,
            FacingMode::Environment => 50,
        };

        let mut pixels = Vec::with_capacity((w * h) as usize * Frame::CHANNELS);
        for y in 0..h {
            for x in 0..w {
                let r = (x * 255 / (w - 1).max(1)) as u8;
                let g = (y * 255 / (h - 1).max(1)) as u8;
                pixels.extend_from_slice(&[r, g, blue]);
            }
        }

        self.sequence += 1;
        Ok(Frame::new(pixels, w, h, self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(facing_mode: FacingMode) -> StreamRequest {
        StreamRequest {
            facing_mode,
            ideal: Resolution::new(1280, 720),
        }
    }

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let probe = camera.probe();

        let mut stream = camera.acquire(&request(FacingMode::Environment)).unwrap();
        assert!(stream.is_live());
        assert_eq!(probe.live_streams(), 1);

        let frame = stream.read_frame().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);
        assert_eq!(stream.read_frame().unwrap().sequence(), 2);

        stream.stop();
        assert!(!stream.is_live());
        assert_eq!(probe.live_streams(), 0);
        assert_eq!(probe.total_released(), 1);
    }

    #[test]
    fn test_drop_releases_stream() {
        let mut camera = MockCamera::new();
        let probe = camera.probe();

        {
            let _stream = camera.acquire(&request(FacingMode::User)).unwrap();
            assert_eq!(probe.live_streams(), 1);
        }
        assert_eq!(probe.live_streams(), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut camera = MockCamera::new();
        let probe = camera.probe();

        let mut stream = camera.acquire(&request(FacingMode::User)).unwrap();
        stream.stop();
        stream.stop();
        drop(stream);
        assert_eq!(probe.total_released(), 1);
    }

    #[test]
    fn test_read_after_stop() {
        let mut camera = MockCamera::new();
        let mut stream = camera.acquire(&request(FacingMode::User)).unwrap();
        stream.stop();
        assert_eq!(stream.read_frame().unwrap_err(), CameraError::StreamStopped);
    }

    #[test]
    fn test_persistent_failure() {
        let mut camera = MockCamera::new().failing(AcquireError::Busy);
        assert_eq!(
            camera.acquire(&request(FacingMode::User)).unwrap_err(),
            AcquireError::Busy
        );
        assert_eq!(camera.probe().total_acquired(), 0);
    }

    #[test]
    fn test_next_failure_is_one_shot() {
        let mut camera = MockCamera::new();
        let probe = camera.probe();
        probe.fail_next_acquire(AcquireError::PermissionDenied);

        assert!(camera.acquire(&request(FacingMode::User)).is_err());
        assert!(camera.acquire(&request(FacingMode::User)).is_ok());
    }

    #[test]
    fn test_facing_mode_parse_and_toggle() {
        assert_eq!("front".parse::<FacingMode>().unwrap(), FacingMode::User);
        assert_eq!("environment".parse::<FacingMode>().unwrap(), FacingMode::Environment);
        assert!("sideways".parse::<FacingMode>().is_err());
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
        assert_eq!(FacingMode::User.toggled().toggled(), FacingMode::User);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AcquireError::NotFound.user_message(),
            "No camera device found on this device."
        );
        assert_eq!(
            AcquireError::Other("AbortError".into()).user_message(),
            "Camera error: AbortError"
        );
        assert_eq!(AcquireError::Busy.kind(), "busy");
    }
}
