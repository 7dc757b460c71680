//! Decoding of raw device buffers into B-G-R frames.

use crate::frame::Frame;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgr24,
    Rgb24,
    Yuyv,
    Mjpeg,
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"BGR3" => Some(Self::Bgr24),
            b"RGB3" => Some(Self::Rgb24),
            b"YUYV" => Some(Self::Yuyv),
            b"MJPG" | b"JPEG" => Some(Self::Mjpeg),
            _ => None,
        }
    }
}

/// Decode one raw buffer of `format` into a frame of `width` x `height`.
pub fn decode(format: PixelFormat, buf: &[u8], width: u32, height: u32) -> Result<Frame> {
    let packed = width as usize * height as usize * 3;

    match format {
        PixelFormat::Bgr24 => {
            let data = buf
                .get(..packed)
                .context("Short BGR3 buffer from device")?
                .to_vec();
            Frame::new(width, height, data)
        }
        PixelFormat::Rgb24 => {
            let data = buf
                .get(..packed)
                .context("Short RGB3 buffer from device")?
                .to_vec();
            Frame::from_rgb(width, height, data)
        }
        PixelFormat::Yuyv => {
            let needed = width as usize * height as usize * 2;
            let data = buf.get(..needed).context("Short YUYV buffer from device")?;
            Frame::new(width, height, yuyv_to_bgr(data))
        }
        PixelFormat::Mjpeg => {
            let decoded = image::load_from_memory_with_format(buf, image::ImageFormat::Jpeg)
                .context("Failed to decode MJPG frame")?
                .to_rgb8();
            let (w, h) = decoded.dimensions();
            Frame::from_rgb(w, h, decoded.into_raw())
        }
    }
}

/// YUYV 4:2:2 to packed B-G-R (BT.601).
pub fn yuyv_to_bgr(data: &[u8]) -> Vec<u8> {
    let mut bgr = Vec::with_capacity(data.len() / 2 * 3);

    // YUYV: Y0 U Y1 V - two pixels per chunk
    for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            bgr.extend_from_slice(&[b, g, r]);
        }
    }

    bgr
}
