//! Raw RGB frames read from a live stream.

use image::RgbImage;
use std::time::Instant;

/// Width and height of a stream or frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Packed RGB8 pixels, row-major without padding.
#[derive(Clone)]
pub struct Frame {
    rgb: Vec<u8>,
    resolution: Resolution,
    read_at: Instant,
    /// Counts frames within one stream, starting at 1.
    sequence: u64,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    pub fn new(rgb: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            rgb,
            resolution: Resolution::new(width, height),
            read_at: Instant::now(),
            sequence,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgb
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn read_at(&self) -> Instant {
        self.read_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Non-empty, with exactly three bytes per pixel.
    pub fn is_valid(&self) -> bool {
        !self.resolution.is_empty() && self.rgb.len() == self.resolution.area() * Self::CHANNELS
    }

    /// `None` when the buffer and the resolution disagree.
    pub fn into_rgb_image(self) -> Option<RgbImage> {
        if !self.is_valid() {
            return None;
        }
        RgbImage::from_raw(self.resolution.width, self.resolution.height, self.rgb)
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Frame::new(image.into_raw(), width, height, 0)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame #{} {} ({} bytes)",
            self.sequence,
            self.resolution,
            self.rgb.len()
        )
    }
}
