//! Periodic preview: capture, convert, fit to the display area, render.

use crate::camera::CameraService;
use crate::frame;
use anyhow::Result;
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::time::{Duration, Instant};
use tracing::trace;

/// Receives each scaled preview image.
pub trait Renderer {
    fn render(&mut self, image: &RgbImage);
}

/// Largest size with the aspect ratio of `source` that fits inside `target`.
///
/// Letterboxes or pillarboxes; never crops and never stretches. A non-empty
/// target always yields at least 1x1.
pub fn fit_within(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (tw, th) = target;
    if sw == 0 || sh == 0 || tw == 0 || th == 0 {
        return (0, 0);
    }

    // Compare tw/th against sw/sh without floating point
    let (w, h) = if tw as u64 * sh as u64 <= th as u64 * sw as u64 {
        let h = (tw as u64 * sh as u64 + sw as u64 / 2) / sw as u64;
        (tw as u64, h.min(th as u64))
    } else {
        let w = (th as u64 * sw as u64 + sh as u64 / 2) / sh as u64;
        (w.min(tw as u64), th as u64)
    };

    (w.max(1) as u32, h.max(1) as u32)
}

/// Resize `image` to fit inside `target` keeping its aspect ratio.
pub fn scale_to_fit(image: &RgbImage, target: (u32, u32)) -> Option<RgbImage> {
    let (w, h) = fit_within(image.dimensions(), target);
    if w == 0 || h == 0 {
        return None;
    }
    if (w, h) == image.dimensions() {
        return Some(image.clone());
    }
    Some(imageops::resize(image, w, h, FilterType::Triangle))
}

pub struct PreviewLoop {
    interval: Duration,
    last_tick: Option<Instant>,
    // Last converted (unscaled) image, kept only for resize re-renders
    last_image: Option<RgbImage>,
}

impl PreviewLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
            last_image: None,
        }
    }

    /// True once a full interval has passed since the last tick.
    pub fn due(&self, now: Instant) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Time left until the next tick is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.last_tick {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    /// Capture one frame and render it scaled to `target`.
    ///
    /// Ticks missed while a previous handler ran are dropped, not queued.
    pub fn tick<C, R>(
        &mut self,
        now: Instant,
        camera: &mut C,
        target: (u32, u32),
        renderer: &mut R,
    ) -> Result<()>
    where
        C: CameraService + ?Sized,
        R: Renderer + ?Sized,
    {
        self.last_tick = Some(now);

        let frame = camera.capture_frame()?;
        let image = frame::to_rgb(&frame);
        trace!(width = image.width(), height = image.height(), "Preview frame");

        if let Some(scaled) = scale_to_fit(&image, target) {
            renderer.render(&scaled);
        }
        self.last_image = Some(image);
        Ok(())
    }

    /// Re-render the last converted image at a new size without capturing.
    pub fn rerender<R: Renderer + ?Sized>(&self, target: (u32, u32), renderer: &mut R) -> bool {
        match self.last_image.as_ref().and_then(|img| scale_to_fit(img, target)) {
            Some(scaled) => {
                renderer.render(&scaled);
                true
            }
            None => false,
        }
    }
}
