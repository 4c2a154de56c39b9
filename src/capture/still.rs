//! Encoded stills produced by a capture or an upload.

use super::{FacingMode, Frame, Resolution};
use base64::Engine;
use image::{imageops, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Errors raised while building a [`CapturedImage`].
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("frame buffer does not match its dimensions")]
    InvalidFrame,
    #[error("failed to encode still: {0}")]
    Encode(String),
    #[error("not a recognised image: {0}")]
    Unrecognised(String),
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a still came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    Camera { facing_mode: FacingMode, mirrored: bool },
    Upload { file_name: Option<String> },
}

/// An encoded still image. Immutable once created.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    resolution: Resolution,
    origin: ImageOrigin,
}

impl CapturedImage {
    /// Encodes a camera frame as JPEG.
    ///
    /// The frame is resampled to `target` when their sizes differ and
    /// flipped horizontally when `mirror` is set.
    pub fn from_frame(
        frame: Frame,
        target: Resolution,
        facing_mode: FacingMode,
        mirror: bool,
        quality: u8,
    ) -> Result<Self, ImageError> {
        let mut image: RgbImage = frame.into_rgb_image().ok_or(ImageError::InvalidFrame)?;

        if !target.is_empty() && image.dimensions() != (target.width, target.height) {
            image = imageops::resize(
                &image,
                target.width,
                target.height,
                imageops::FilterType::Triangle,
            );
        }
        if mirror {
            imageops::flip_horizontal_in_place(&mut image);
        }

        let bytes = encode_jpeg(&image, quality)?;
        Ok(Self {
            bytes,
            format: ImageFormat::Jpeg,
            resolution: Resolution::new(image.width(), image.height()),
            origin: ImageOrigin::Camera {
                facing_mode,
                mirrored: mirror,
            },
        })
    }

    /// Wraps an already encoded image, checking that it decodes.
    pub fn from_bytes(bytes: Vec<u8>, file_name: Option<String>) -> Result<Self, ImageError> {
        let reader = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Unrecognised(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| ImageError::Unrecognised("unknown format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImageError::Unrecognised(e.to_string()))?;

        Ok(Self {
            bytes,
            format,
            resolution: Resolution::new(width, height),
            origin: ImageOrigin::Upload { file_name },
        })
    }

    /// Reads an image file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Self::from_bytes(bytes, file_name)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn origin(&self) -> &ImageOrigin {
        &self.origin
    }

    /// File name to use when the still is sent as a multipart part.
    pub fn file_name(&self) -> String {
        match &self.origin {
            ImageOrigin::Upload {
                file_name: Some(name),
            } => name.clone(),
            _ => format!(
                "capture.{}",
                self.format.extensions_str().first().copied().unwrap_or("bin")
            ),
        }
    }

    /// Renders the still as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Decodes the still back into pixels.
    pub fn decode(&self) -> Result<RgbImage, ImageError> {
        image::load_from_memory_with_format(&self.bytes, self.format)
            .map(|img| img.to_rgb8())
            .map_err(|e| ImageError::Unrecognised(e.to_string()))
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let image = RgbImage::from_fn(width, height, |x, _| {
            let r = (x * 255 / (width - 1)) as u8;
            image::Rgb([r, 0, 0])
        });
        Frame::from(image)
    }

    #[test]
    fn test_from_frame_encodes_jpeg() {
        let still = CapturedImage::from_frame(
            gradient(32, 16),
            Resolution::new(32, 16),
            FacingMode::Environment,
            false,
            90,
        )
        .unwrap();

        assert_eq!(still.mime_type(), "image/jpeg");
        assert_eq!(still.resolution(), Resolution::new(32, 16));
        assert!(still.to_data_uri().starts_with("data:image/jpeg;base64,"));
        assert_eq!(still.file_name(), "capture.jpg");
    }

    #[test]
    fn test_mirror_flips_columns() {
        let still = CapturedImage::from_frame(
            gradient(32, 16),
            Resolution::new(32, 16),
            FacingMode::User,
            true,
            95,
        )
        .unwrap();

        let decoded = still.decode().unwrap();
        assert!(decoded.get_pixel(0, 8).0[0] > 200);
        assert!(decoded.get_pixel(31, 8).0[0] < 55);
    }

    #[test]
    fn test_resamples_to_target() {
        let still = CapturedImage::from_frame(
            gradient(32, 16),
            Resolution::new(64, 32),
            FacingMode::Environment,
            false,
            90,
        )
        .unwrap();
        assert_eq!(still.resolution(), Resolution::new(64, 32));
    }

    #[test]
    fn test_invalid_frame_rejected() {
        let frame = Frame::new(vec![0u8; 10], 32, 16, 1);
        let result =
            CapturedImage::from_frame(frame, Resolution::new(32, 16), FacingMode::User, true, 90);
        assert!(matches!(result, Err(ImageError::InvalidFrame)));
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let still = CapturedImage::from_frame(
            gradient(8, 8),
            Resolution::new(8, 8),
            FacingMode::Environment,
            false,
            90,
        )
        .unwrap();

        let upload =
            CapturedImage::from_bytes(still.bytes().to_vec(), Some("leaf.jpg".into())).unwrap();
        assert_eq!(upload.format(), ImageFormat::Jpeg);
        assert_eq!(upload.resolution(), Resolution::new(8, 8));
        assert_eq!(upload.file_name(), "leaf.jpg");
    }

    #[test]
    fn test_from_bytes_rejects_text() {
        let result = CapturedImage::from_bytes(b"definitely not an image".to_vec(), None);
        assert!(matches!(result, Err(ImageError::Unrecognised(_))));
    }
}
