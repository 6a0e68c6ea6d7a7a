//! Immutable RGB frames and face rectangles.
//!
//! A [`Frame`] is produced once per capture tick and never mutated.  Pixel
//! storage is an `Arc<[u8]>` so handing the same frame to the overlay and to
//! the region extractor costs a reference-count bump, not a copy.  Face
//! sub-images are extracted with [`Frame::crop`], which copies only the
//! region's pixels into a fresh frame owned by the background task.

use std::sync::Arc;

use thiserror::Error;

/// Bytes per pixel.  Frames are always tightly packed RGB8.
pub const CHANNELS: usize = 3;

// ---------------------------------------------------------------------------
// FrameError
// ---------------------------------------------------------------------------

/// Errors raised when constructing a [`Frame`] from raw pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The pixel buffer length does not equal `width * height * 3`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    Empty { width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// FaceRegion
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in pixel coordinates of the frame it was computed
/// from.  Not meaningful against any other frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect the rectangle with a `width` × `height` frame.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the frame.
    ///
    /// ```
    /// use mood_player::vision::FaceRegion;
    ///
    /// let r = FaceRegion::new(90, 10, 20, 20).clamp_to(100, 100).unwrap();
    /// assert_eq!(r, FaceRegion::new(90, 10, 10, 20));
    /// assert!(FaceRegion::new(120, 0, 5, 5).clamp_to(100, 100).is_none());
    /// ```
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<FaceRegion> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        let clamped = FaceRegion::new(self.x, self.y, w, h);
        (!clamped.is_empty()).then_some(clamped)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One captured image: tightly packed RGB8, row-major.
#[derive(Clone)]
pub struct Frame {
    /// Monotonic capture counter, used to associate classification results
    /// with the frame they came from.
    seq: u64,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("seq", &self.seq)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Frame {
    /// Wrap an RGB8 buffer.
    ///
    /// # Errors
    ///
    /// [`FrameError::Empty`] for a zero dimension, [`FrameError::SizeMismatch`]
    /// when `pixels.len() != width * height * 3`.
    pub fn from_rgb(seq: u64, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            seq,
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// A frame filled with a single colour.  Handy for tests and placeholders.
    pub fn solid(seq: u64, width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, FrameError> {
        let count = width as usize * height as usize;
        let pixels = rgb.iter().copied().cycle().take(count * CHANNELS).collect();
        Self::from_rgb(seq, width, height, pixels)
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `[width, height]` as `usize`, the shape egui expects for textures.
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    /// Raw RGB8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Copy the pixels under `region` into a new frame with the same `seq`.
    ///
    /// The region is clamped to the frame first; `None` when the clamped
    /// region is empty.
    pub fn crop(&self, region: &FaceRegion) -> Option<Frame> {
        let r = region.clamp_to(self.width, self.height)?;
        let row_len = self.width as usize * CHANNELS;
        let mut out = Vec::with_capacity(r.width as usize * r.height as usize * CHANNELS);
        for row in r.y..r.y + r.height {
            let start = row as usize * row_len + r.x as usize * CHANNELS;
            let end = start + r.width as usize * CHANNELS;
            out.extend_from_slice(&self.pixels[start..end]);
        }
        Some(Frame {
            seq: self.seq,
            width: r.width,
            height: r.height,
            pixels: out.into(),
        })
    }

    /// Single-channel luma (ITU-R BT.601 weights), one byte per pixel.
    pub fn to_gray(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(CHANNELS)
            .map(|p| {
                let y = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
