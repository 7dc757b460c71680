//! Captured frames and the B-G-R to R-G-B converter.

use anyhow::Result;
use image::RgbImage;

/// One captured image, packed rows of B-G-R pixels (height x width x 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(anyhow::anyhow!(
                "Frame buffer holds {} bytes, expected {} for {}x{} BGR",
                data.len(),
                expected,
                width,
                height
            ));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a B-G-R frame from packed R-G-B bytes.
    pub fn from_rgb(width: u32, height: u32, mut rgb: Vec<u8>) -> Result<Self> {
        for px in rgb.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Self::new(width, height, rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// B-G-R triple at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}

/// Convert a B-G-R frame into a displayable RGB image of the same size.
pub fn to_rgb(frame: &Frame) -> RgbImage {
    let mut rgb = frame.data.clone();
    for px in rgb.chunks_exact_mut(3) {
        px.swap(0, 2);
    }

    // Length was checked when the frame was built
    RgbImage::from_raw(frame.width, frame.height, rgb)
        .unwrap_or_else(|| RgbImage::new(frame.width, frame.height))
}
