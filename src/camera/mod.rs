//! Camera service abstraction and backend selection.

pub mod formats;
pub mod test_pattern;
#[cfg(target_os = "linux")]
pub mod v4l2;

use crate::frame::Frame;
use anyhow::Result;

pub use test_pattern::TestPatternCamera;
#[cfg(target_os = "linux")]
pub use v4l2::V4l2Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Manual,
    ContinuousAuto,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// Hardware device by index (`/dev/video<N>` on Linux).
    Device(usize),
    TestPattern,
}

/// An opened and started camera.
pub trait CameraService {
    fn resolution(&self) -> Resolution;

    /// Grab a fresh frame in B-G-R order.
    fn capture_frame(&mut self) -> Result<Frame>;

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<()>;

    /// Request one autofocus pass; returns once the request is issued.
    fn run_autofocus_cycle(&mut self) -> Result<()>;
}

impl<C: CameraService + ?Sized> CameraService for Box<C> {
    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn capture_frame(&mut self) -> Result<Frame> {
        (**self).capture_frame()
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<()> {
        (**self).set_focus_mode(mode)
    }

    fn run_autofocus_cycle(&mut self) -> Result<()> {
        (**self).run_autofocus_cycle()
    }
}

/// Open, configure and start the camera for `source`.
pub fn open_camera(source: &CameraSource, resolution: Resolution) -> Result<Box<dyn CameraService>> {
    match source {
        CameraSource::TestPattern => Ok(Box::new(TestPatternCamera::new(resolution))),
        #[cfg(target_os = "linux")]
        CameraSource::Device(index) => Ok(Box::new(V4l2Camera::open(*index, resolution)?)),
        #[cfg(not(target_os = "linux"))]
        CameraSource::Device(index) => Err(anyhow::anyhow!(
            "No camera backend for device {} on this platform, use --test-pattern",
            index
        )),
    }
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

/// Enumerate capture devices.
pub fn list_devices() -> Vec<DeviceInfo> {
    #[cfg(target_os = "linux")]
    {
        v4l2::list_devices()
    }

    #[cfg(not(target_os = "linux"))]
    {
        Vec::new()
    }
}
