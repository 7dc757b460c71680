//! V4L2 camera backend.
//!
//! Opens `/dev/video<N>`, negotiates a pixel format the decoder understands,
//! and keeps a memory-mapped stream running for the lifetime of the handle.
//! Focus is driven through the standard camera-class controls.

use super::formats::{self, PixelFormat};
use super::{CameraService, DeviceInfo, FocusMode, Resolution};
use crate::constants::v4l2 as consts;
use crate::frame::Frame;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::control::{Control, Value};
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

pub struct V4l2Camera {
    device: Device,
    stream: Stream<'static>,
    format: PixelFormat,
    resolution: Resolution,
}

impl V4l2Camera {
    /// Open device `index`, request `resolution`, and start streaming.
    pub fn open(index: usize, resolution: Resolution) -> Result<Self> {
        let device = Device::new(index)
            .with_context(|| format!("Failed to open camera /dev/video{}", index))?;

        let (format, resolution) = negotiate_format(&device, resolution)?;

        let stream = Stream::with_buffers(&device, Type::VideoCapture, consts::BUFFER_COUNT)
            .context("Failed to create buffer stream")?;

        info!(
            index,
            width = resolution.width,
            height = resolution.height,
            ?format,
            "V4L2 capture stream started"
        );

        Ok(Self {
            device,
            stream,
            format,
            resolution,
        })
    }

    fn write_control(&self, id: u32, value: Value) -> Result<()> {
        self.device
            .set_control(Control { id, value })
            .with_context(|| format!("Failed to set V4L2 control {:#x}", id))
    }
}

fn negotiate_format(device: &Device, requested: Resolution) -> Result<(PixelFormat, Resolution)> {
    let current = device.format().context("Failed to query format")?;
    debug!(
        width = current.width,
        height = current.height,
        fourcc = ?current.fourcc,
        "Current device format"
    );

    for fourcc in consts::PREFERRED_FOURCCS {
        let mut format = current.clone();
        format.width = requested.width;
        format.height = requested.height;
        format.fourcc = FourCC::new(fourcc);

        let applied = match device.set_format(&format) {
            Ok(applied) => applied,
            Err(e) => {
                debug!(fourcc = ?format.fourcc, error = %e, "Format rejected");
                continue;
            }
        };

        // Drivers answer with the closest format they support
        if let Some(pixel_format) = PixelFormat::from_fourcc(&applied.fourcc.repr) {
            if applied.width != requested.width || applied.height != requested.height {
                warn!(
                    requested_width = requested.width,
                    requested_height = requested.height,
                    width = applied.width,
                    height = applied.height,
                    "Device adjusted capture resolution"
                );
            }
            return Ok((pixel_format, Resolution::new(applied.width, applied.height)));
        }
    }

    Err(anyhow::anyhow!(
        "Camera offers none of the supported pixel formats (BGR3, YUYV, MJPG, RGB3)"
    ))
}

impl CameraService for V4l2Camera {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn capture_frame(&mut self) -> Result<Frame> {
        let (buf, meta) = self.stream.next().context("Failed to dequeue frame")?;

        let used = meta.bytesused as usize;
        let data = if used > 0 && used <= buf.len() {
            &buf[..used]
        } else {
            buf
        };

        formats::decode(
            self.format,
            data,
            self.resolution.width,
            self.resolution.height,
        )
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<()> {
        let enabled = mode == FocusMode::ContinuousAuto;
        self.write_control(consts::CID_FOCUS_AUTO, Value::Boolean(enabled))
    }

    fn run_autofocus_cycle(&mut self) -> Result<()> {
        // Button control; the driver ignores the value
        let start = Control {
            id: consts::CID_AUTO_FOCUS_START,
            value: Value::Integer(1),
        };
        match self.device.set_control(start) {
            Ok(()) => Ok(()),
            Err(e) if is_busy_with_continuous_focus(&e) => {
                debug!(error = %e, "Autofocus start ignored while continuous focus runs");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to start autofocus cycle"),
        }
    }
}

/// Drivers reject the autofocus start button with EBUSY while continuous
/// focus is enabled; the lens is already focusing in that case.
fn is_busy_with_continuous_focus(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::ResourceBusy
}

/// Scan `/dev/video*` for devices with video capture capability.
pub fn list_devices() -> Vec<DeviceInfo> {
    let mut indices: Vec<usize> = std::fs::read_dir("/dev")
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|e| {
            e.file_name()
                .to_str()
                .and_then(|n| n.strip_prefix("video"))
                .and_then(|n| n.parse().ok())
        })
        .collect();
    indices.sort_unstable();

    indices
        .into_iter()
        .filter_map(|index| {
            let device = Device::new(index).ok()?;
            let caps = device.query_caps().ok()?;
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                return None;
            }
            Some(DeviceInfo {
                index,
                name: caps.card,
            })
        })
        .collect()
}
