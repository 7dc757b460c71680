use crate::camera::{CameraSource, Resolution};
use crate::capture::SaveTarget;
use crate::constants::{defaults, gui, timing};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which release of the camera app to behave like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    V1,
    V2,
    V3,
    #[default]
    V4,
}

impl Profile {
    pub fn filename_prefix(self) -> &'static str {
        match self {
            Profile::V1 => defaults::PREFIX_EN,
            _ => defaults::PREFIX_KO,
        }
    }

    pub fn save_target(self) -> SaveTarget {
        match self {
            Profile::V1 | Profile::V2 => SaveTarget::Direct,
            Profile::V3 | Profile::V4 => SaveTarget::Dialog,
        }
    }

    pub fn has_autofocus(self) -> bool {
        matches!(self, Profile::V3 | Profile::V4)
    }

    pub fn rerender_on_resize(self) -> bool {
        self == Profile::V4
    }

    pub fn forces_local_display(self) -> bool {
        self == Profile::V3
    }

    pub fn title(self) -> &'static str {
        match self {
            Profile::V1 => gui::TITLE_EN,
            _ => gui::TITLE_KO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: Profile,
    pub device: usize,
    pub test_pattern: bool,
    pub width: u32,
    pub height: u32,
    pub save_dir: PathBuf,
    pub preview_interval_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            device: defaults::DEVICE,
            test_pattern: false,
            width: defaults::WIDTH,
            height: defaults::HEIGHT,
            save_dir: PathBuf::from(defaults::SAVE_DIR),
            preview_interval_ms: timing::PREVIEW_INTERVAL_MS,
            jpeg_quality: defaults::JPEG_QUALITY,
        }
    }
}

impl Settings {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn camera_source(&self) -> CameraSource {
        if self.test_pattern {
            CameraSource::TestPattern
        } else {
            CameraSource::Device(self.device)
        }
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms.max(1))
    }
}

pub fn get_settings_file_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Could not find home directory"))?;
    Ok(PathBuf::from(home).join(".picam.json"))
}

/// Parse settings JSON; anything unreadable falls back to defaults.
pub fn parse_settings(content: &str) -> Settings {
    serde_json::from_str(content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unparsable settings file");
        Settings::default()
    })
}

pub fn load_settings() -> Result<Settings> {
    let settings_file = get_settings_file_path()?;

    if !settings_file.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&settings_file)?;
    Ok(parse_settings(&content))
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let settings_file = get_settings_file_path()?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(&settings_file, content)?;
    Ok(settings_file)
}
