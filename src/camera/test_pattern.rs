//! Synthetic camera producing scrolling color bars.

use super::{CameraService, FocusMode, Resolution};
use crate::frame::Frame;
use anyhow::Result;
use tracing::debug;

// Eight bars, B-G-R order: white, yellow, cyan, green, magenta, red, blue, black
const BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [0, 255, 255],
    [255, 255, 0],
    [0, 255, 0],
    [255, 0, 255],
    [0, 0, 255],
    [255, 0, 0],
    [0, 0, 0],
];

pub struct TestPatternCamera {
    resolution: Resolution,
    frame_count: u64,
    focus_mode: FocusMode,
    autofocus_cycles: u32,
}

impl TestPatternCamera {
    pub fn new(resolution: Resolution) -> Self {
        debug!(
            width = resolution.width,
            height = resolution.height,
            "Test pattern camera started"
        );
        Self {
            resolution,
            frame_count: 0,
            focus_mode: FocusMode::Manual,
            autofocus_cycles: 0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn focus_mode(&self) -> FocusMode {
        self.focus_mode
    }

    pub fn autofocus_cycles(&self) -> u32 {
        self.autofocus_cycles
    }

    fn render(&self) -> Vec<u8> {
        let Resolution { width, height } = self.resolution;
        let bar_width = (width / BARS.len() as u32).max(1);
        // The pattern repeats every eight bars
        let period = bar_width as u64 * BARS.len() as u64;
        let shift = (self.frame_count % period) as u32;

        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..height {
            for x in 0..width {
                let bar = ((x + shift) / bar_width) as usize % BARS.len();
                data.extend_from_slice(&BARS[bar]);
            }
        }
        data
    }
}

impl CameraService for TestPatternCamera {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn capture_frame(&mut self) -> Result<Frame> {
        let data = self.render();
        self.frame_count += 1;
        Frame::new(self.resolution.width, self.resolution.height, data)
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<()> {
        self.focus_mode = mode;
        Ok(())
    }

    fn run_autofocus_cycle(&mut self) -> Result<()> {
        self.autofocus_cycles += 1;
        Ok(())
    }
}
