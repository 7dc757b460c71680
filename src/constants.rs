// GUI-related constants
pub mod gui {
    // Window settings
    pub const WINDOW_X: f32 = 100.0;
    pub const WINDOW_Y: f32 = 100.0;
    pub const WINDOW_WIDTH: f32 = 800.0;
    pub const WINDOW_HEIGHT: f32 = 600.0;
    pub const MIN_WINDOW_WIDTH: f32 = 320.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 240.0;

    // Space kept below the preview for the button row and status line
    pub const CONTROLS_HEIGHT: f32 = 72.0;

    pub const TITLE_EN: &str = "Raspberry Pi Camera App";
    pub const TITLE_KO: &str = "라즈베리파이 카메라";

    // Default font paths
    pub const DEFAULT_FONT_PATHS: &[&str] =
        &["assets/NotoSansKR-Regular.ttf", "NotoSansKR-Regular.ttf"];

    pub fn get_config_font_path() -> Option<String> {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            Some(format!("{}/.config/picam/NotoSansKR-Regular.ttf", home))
        } else {
            None
        }
    }
}

// Capture configuration defaults
pub mod defaults {
    pub const SAVE_DIR: &str = "captured_images";
    pub const PREFIX_EN: &str = "image";
    pub const PREFIX_KO: &str = "이미지";
    pub const EXTENSION: &str = "jpg";
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    pub const WIDTH: u32 = 640;
    pub const HEIGHT: u32 = 480;
    pub const DEVICE: usize = 0;

    // Matches the quality most camera tools write by default
    pub const JPEG_QUALITY: u8 = 95;
}

// Timing constants
pub mod timing {
    pub const PREVIEW_INTERVAL_MS: u64 = 30;
}

// V4L2 stream settings
pub mod v4l2 {
    pub const BUFFER_COUNT: u32 = 4;
    pub const PREFERRED_FOURCCS: &[&[u8; 4]] = &[b"BGR3", b"YUYV", b"MJPG", b"RGB3"];

    pub const CID_CAMERA_CLASS_BASE: u32 = 0x009a_0900;
    pub const CID_FOCUS_AUTO: u32 = CID_CAMERA_CLASS_BASE + 12;
    pub const CID_AUTO_FOCUS_START: u32 = CID_CAMERA_CLASS_BASE + 28;
}

// Display forcing applied before the window is created
pub mod display {
    pub const LOCAL_DISPLAY: &str = ":0";
}
