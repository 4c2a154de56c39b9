//! Native camera backend built on `nokhwa`.
//!
//! Desktop platforms have no notion of facing mode, so each mode is mapped
//! to a device index through [`CameraConfig`].

use super::{
    AcquireError, CameraBackend, CameraConfig, CameraError, Frame, MediaStream, Resolution,
    StreamDriver, StreamRequest, TrackInfo, TrackKind,
};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution as DeviceResolution,
};
use nokhwa::{Camera, NokhwaError};
use tracing::{info, warn};

/// Camera backend for local capture devices.
#[derive(Debug, Clone)]
pub struct NativeCamera {
    config: CameraConfig,
}

impl NativeCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }
}

impl CameraBackend for NativeCamera {
    fn acquire(&mut self, request: &StreamRequest) -> Result<MediaStream, AcquireError> {
        let index = self.config.device_index(request.facing_mode);
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                DeviceResolution::new(request.ideal.width, request.ideal.height),
                FrameFormat::MJPEG,
                30,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(index), format).map_err(classify)?;
        camera.open_stream().map_err(classify)?;

        let resolution = camera.resolution();
        info!(
            device = index,
            facing = %request.facing_mode,
            width = resolution.width(),
            height = resolution.height(),
            "Native camera stream opened"
        );

        let id = format!("device-{}", index);
        let driver = NativeStream {
            camera,
            track: Some(TrackInfo {
                id: format!("{}-video", id),
                kind: TrackKind::Video,
            }),
            sequence: 0,
        };
        Ok(MediaStream::new(id, request.facing_mode, Box::new(driver)))
    }
}

struct NativeStream {
    camera: Camera,
    track: Option<TrackInfo>,
    sequence: u64,
}

impl StreamDriver for NativeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        self.track.iter().cloned().collect()
    }

    fn stop_track(&mut self, track_id: &str) {
        if self.track.as_ref().is_some_and(|t| t.id == track_id) {
            if let Err(e) = self.camera.stop_stream() {
                warn!(error = %e, "Failed to stop native camera stream");
            }
            self.track = None;
        }
    }

    fn native_resolution(&self) -> Option<Resolution> {
        let res = self.camera.resolution();
        Some(Resolution::new(res.width(), res.height())).filter(|r| !r.is_empty())
    }

    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        if self.track.is_none() {
            return Err(CameraError::StreamStopped);
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        self.sequence += 1;
        Ok(Frame::new(decoded.into_raw(), width, height, self.sequence))
    }
}

/// Maps a backend error onto the acquisition taxonomy.
fn classify(err: NokhwaError) -> AcquireError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        AcquireError::PermissionDenied
    } else if lower.contains("busy") || lower.contains("in use") {
        AcquireError::Busy
    } else if lower.contains("not found") || lower.contains("no such") || lower.contains("no device")
    {
        AcquireError::NotFound
    } else {
        AcquireError::Other(message)
    }
}
