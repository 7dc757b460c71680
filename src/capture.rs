//! Still capture: timestamped filenames, save target and JPEG output.

use crate::camera::CameraService;
use crate::constants::defaults;
use crate::frame;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `<prefix>_<YYYYMMDD_HHMMSS>.jpg`
///
/// Unique only to the second: two captures in the same second get the same
/// name and the later one replaces the earlier.
pub fn capture_filename(prefix: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        timestamp.format(defaults::TIMESTAMP_FORMAT),
        defaults::EXTENSION
    )
}

/// Create the save directory if it is missing.
pub fn ensure_save_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create save directory {}", dir.display()))?;
    debug!(dir = %dir.display(), "Created save directory");
    Ok(())
}

pub fn write_jpeg(path: &Path, image: &RgbImage, quality: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    image
        .write_with_encoder(encoder)
        .with_context(|| format!("Failed to write JPEG to {}", path.display()))?;
    Ok(())
}

fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Write straight into the save directory.
    Direct,
    /// Ask the user, pre-filled with the save directory and generated name.
    Dialog,
}

/// Asks the user where to save. `None` means cancelled.
pub trait SavePrompt {
    fn choose(&mut self, dir: &Path, default_name: &str) -> Option<PathBuf>;
}

/// Native save dialog.
pub struct DialogPrompt;

impl SavePrompt for DialogPrompt {
    fn choose(&mut self, dir: &Path, default_name: &str) -> Option<PathBuf> {
        // Dialogs want an absolute start directory
        let start = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        rfd::FileDialog::new()
            .set_title("Save Image")
            .set_directory(start)
            .set_file_name(default_name)
            .add_filter("JPEG", &["jpg", "jpeg"])
            .save_file()
    }
}

/// Prompt for contexts without a user; always keeps the default.
pub struct NoPrompt;

impl SavePrompt for NoPrompt {
    fn choose(&mut self, dir: &Path, default_name: &str) -> Option<PathBuf> {
        Some(dir.join(default_name))
    }
}

pub struct CaptureController {
    save_dir: PathBuf,
    prefix: String,
    target: SaveTarget,
    jpeg_quality: u8,
}

impl CaptureController {
    pub fn new(save_dir: impl Into<PathBuf>, prefix: impl Into<String>, target: SaveTarget) -> Self {
        Self {
            save_dir: save_dir.into(),
            prefix: prefix.into(),
            target,
            jpeg_quality: defaults::JPEG_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn default_filename(&self, timestamp: &NaiveDateTime) -> String {
        capture_filename(&self.prefix, timestamp)
    }

    /// Capture a fresh frame and persist it at full resolution.
    ///
    /// Returns the written path, or `None` when the dialog was cancelled, in
    /// which case nothing is written or logged.
    pub fn capture<C, P>(
        &self,
        camera: &mut C,
        timestamp: &NaiveDateTime,
        prompt: &mut P,
    ) -> Result<Option<PathBuf>>
    where
        C: CameraService + ?Sized,
        P: SavePrompt + ?Sized,
    {
        let frame = camera.capture_frame()?;
        let filename = self.default_filename(timestamp);

        let path = match self.target {
            SaveTarget::Direct => self.save_dir.join(&filename),
            SaveTarget::Dialog => match prompt.choose(&self.save_dir, &filename) {
                Some(path) if has_jpeg_extension(&path) => path,
                Some(path) => path.with_extension(defaults::EXTENSION),
                None => return Ok(None),
            },
        };

        write_jpeg(&path, &frame::to_rgb(&frame), self.jpeg_quality)?;
        info!("Image saved: {}", path.display());
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_filename_format() {
        assert_eq!(capture_filename("image", &at(7, 5, 3)), "image_20240309_070503.jpg");
        assert_eq!(capture_filename("이미지", &at(23, 59, 59)), "이미지_20240309_235959.jpg");
    }

    #[test]
    fn test_filenames_collide_within_one_second() {
        let first = at(12, 0, 0);
        let later = first + chrono::Duration::milliseconds(900);
        assert_eq!(
            capture_filename("image", &first),
            capture_filename("image", &later)
        );
        assert_ne!(
            capture_filename("image", &first),
            capture_filename("image", &(first + chrono::Duration::seconds(1)))
        );
    }

    #[test]
    fn test_ensure_save_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("captured_images");

        ensure_save_dir(&dir).unwrap();
        std::fs::write(dir.join("keep.jpg"), b"x").unwrap();
        ensure_save_dir(&dir).unwrap();

        assert!(dir.join("keep.jpg").exists());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_ensure_save_dir_fails_on_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("captured_images");
        std::fs::write(&blocker, b"not a dir").unwrap();

        assert!(ensure_save_dir(&blocker).is_err());
    }

    #[test]
    fn test_jpeg_extension_check() {
        assert!(has_jpeg_extension(Path::new("a/shot.jpg")));
        assert!(has_jpeg_extension(Path::new("a/shot.JPEG")));
        assert!(!has_jpeg_extension(Path::new("a/shot.png")));
        assert!(!has_jpeg_extension(Path::new("a/shot")));
    }

    #[test]
    fn test_no_prompt_keeps_default() {
        let chosen = NoPrompt.choose(Path::new("out"), "a.jpg");
        assert_eq!(chosen, Some(PathBuf::from("out/a.jpg")));
    }
}
