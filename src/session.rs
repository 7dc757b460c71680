//! The owning context behind the window: one camera, one preview loop, one
//! capture controller. Every event handler takes `&mut self`, so ticks,
//! resizes and button presses run strictly one after another.

use crate::autofocus;
use crate::camera::{self, CameraService};
use crate::capture::{self, CaptureController, SavePrompt};
use crate::preview::{PreviewLoop, Renderer};
use crate::settings::{Profile, Settings};
use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct CameraSession<C: CameraService> {
    camera: C,
    profile: Profile,
    preview: PreviewLoop,
    controller: CaptureController,
    display_size: Option<(u32, u32)>,
}

impl CameraSession<Box<dyn CameraService>> {
    /// Open the configured camera and prepare the save directory.
    pub fn open(settings: &Settings) -> Result<Self> {
        let camera = camera::open_camera(&settings.camera_source(), settings.resolution())?;
        Self::new(camera, settings)
    }
}

impl<C: CameraService> CameraSession<C> {
    pub fn new(camera: C, settings: &Settings) -> Result<Self> {
        capture::ensure_save_dir(&settings.save_dir)?;

        let profile = settings.profile;
        let controller = CaptureController::new(
            settings.save_dir.clone(),
            profile.filename_prefix(),
            profile.save_target(),
        )
        .with_quality(settings.jpeg_quality);

        Ok(Self {
            camera,
            profile,
            preview: PreviewLoop::new(settings.preview_interval()),
            controller,
            display_size: None,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn save_dir(&self) -> &std::path::Path {
        self.controller.save_dir()
    }

    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.preview.until_next(now)
    }

    /// Timer tick. Returns `Ok(false)` when the interval has not elapsed.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        now: Instant,
        target: (u32, u32),
        renderer: &mut R,
    ) -> Result<bool> {
        if !self.preview.due(now) {
            return Ok(false);
        }
        self.display_size = Some(target);
        self.preview.tick(now, &mut self.camera, target, renderer)?;
        Ok(true)
    }

    /// Display area changed. Re-renders the last frame when the profile
    /// rescales on resize; otherwise the next tick picks up the new size.
    pub fn resize<R: Renderer + ?Sized>(&mut self, target: (u32, u32), renderer: &mut R) -> bool {
        if self.display_size == Some(target) {
            return false;
        }
        self.display_size = Some(target);

        if !self.profile.rerender_on_resize() {
            return false;
        }
        debug!(width = target.0, height = target.1, "Re-rendering after resize");
        self.preview.rerender(target, renderer)
    }

    pub fn capture<P: SavePrompt + ?Sized>(
        &mut self,
        timestamp: &NaiveDateTime,
        prompt: &mut P,
    ) -> Result<Option<PathBuf>> {
        self.controller.capture(&mut self.camera, timestamp, prompt)
    }

    /// Returns false when the profile has no autofocus control.
    pub fn autofocus(&mut self) -> bool {
        if !self.profile.has_autofocus() {
            return false;
        }
        autofocus::trigger_autofocus(&mut self.camera);
        true
    }
}
