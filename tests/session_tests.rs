//! Integration tests driving a camera session without a window

use chrono::{NaiveDate, NaiveDateTime};
use image::RgbImage;
use picam::camera::TestPatternCamera;
use picam::{
    CameraService, CameraSession, FocusMode, Profile, Renderer, Resolution, SavePrompt, Settings,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct RecordingRenderer {
    sizes: Vec<(u32, u32)>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, image: &RgbImage) {
        self.sizes.push(image.dimensions());
    }
}

/// Returns a scripted answer and records what it was offered.
struct ScriptedPrompt {
    answer: Option<PathBuf>,
    offered: Vec<(PathBuf, String)>,
}

impl ScriptedPrompt {
    fn answering(answer: Option<PathBuf>) -> Self {
        Self {
            answer,
            offered: Vec::new(),
        }
    }
}

impl SavePrompt for ScriptedPrompt {
    fn choose(&mut self, dir: &Path, default_name: &str) -> Option<PathBuf> {
        self.offered.push((dir.to_path_buf(), default_name.to_string()));
        self.answer.clone()
    }
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with an info-level subscriber and return the lines it logged.
fn logged_lines<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);

    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines = text.lines().map(str::to_string).collect();
    (result, lines)
}

fn settings_in(dir: &Path, profile: Profile) -> Settings {
    Settings {
        profile,
        test_pattern: true,
        width: 640,
        height: 480,
        save_dir: dir.join("captured_images"),
        ..Settings::default()
    }
}

fn session(dir: &Path, profile: Profile) -> CameraSession<TestPatternCamera> {
    let settings = settings_in(dir, profile);
    let camera = TestPatternCamera::new(settings.resolution());
    CameraSession::new(camera, &settings).unwrap()
}

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 31)
        .unwrap()
        .and_hms_opt(9, 8, 7)
        .unwrap()
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn test_preview_then_capture_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V1);
    let mut renderer = RecordingRenderer::default();

    let start = Instant::now();
    assert!(session.tick(start, (400, 400), &mut renderer).unwrap());
    // Second tick inside the interval is skipped
    assert!(!session.tick(start + Duration::from_millis(10), (400, 400), &mut renderer).unwrap());
    assert!(session.tick(start + Duration::from_millis(30), (400, 400), &mut renderer).unwrap());

    assert_eq!(renderer.sizes, vec![(400, 300), (400, 300)]);

    let saved = session
        .capture(&timestamp(), &mut ScriptedPrompt::answering(None))
        .unwrap()
        .expect("direct save never cancels");

    let save_dir = tmp.path().join("captured_images");
    assert_eq!(files_in(&save_dir), vec![save_dir.join("image_20250131_090807.jpg")]);
    assert_eq!(saved, save_dir.join("image_20250131_090807.jpg"));

    // Full capture resolution, not the preview size
    let written = image::open(&saved).unwrap();
    assert_eq!((written.width(), written.height()), (640, 480));
    assert_eq!(
        image::ImageFormat::from_path(&saved).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn test_capture_takes_a_fresh_frame() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V2);
    let mut renderer = RecordingRenderer::default();

    session.tick(Instant::now(), (320, 240), &mut renderer).unwrap();
    assert_eq!(session.camera().frame_count(), 1);

    session
        .capture(&timestamp(), &mut ScriptedPrompt::answering(None))
        .unwrap();
    assert_eq!(session.camera().frame_count(), 2);
}

#[test]
fn test_korean_prefix_from_v2() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V2);

    let saved = session
        .capture(&timestamp(), &mut ScriptedPrompt::answering(None))
        .unwrap()
        .unwrap();
    assert_eq!(
        saved.file_name().unwrap().to_str().unwrap(),
        "이미지_20250131_090807.jpg"
    );
}

#[test]
fn test_same_second_capture_overwrites() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V1);
    let mut prompt = ScriptedPrompt::answering(None);

    let first = session.capture(&timestamp(), &mut prompt).unwrap();
    let second = session.capture(&timestamp(), &mut prompt).unwrap();

    assert_eq!(first, second);
    assert_eq!(files_in(&tmp.path().join("captured_images")).len(), 1);
}

#[test]
fn test_dialog_cancel_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V4);
    let mut prompt = ScriptedPrompt::answering(None);

    let (result, lines) = logged_lines(|| session.capture(&timestamp(), &mut prompt).unwrap());

    assert_eq!(result, None);
    assert!(lines.is_empty(), "{:?}", lines);
    assert!(files_in(&tmp.path().join("captured_images")).is_empty());
    assert_eq!(
        prompt.offered,
        vec![(
            tmp.path().join("captured_images"),
            "이미지_20250131_090807.jpg".to_string()
        )]
    );
}

#[test]
fn test_direct_save_logs_one_line() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V1);

    let (saved, lines) = logged_lines(|| {
        session
            .capture(&timestamp(), &mut ScriptedPrompt::answering(None))
            .unwrap()
            .unwrap()
    });

    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].ends_with(&format!("Image saved: {}", saved.display())));
}

#[test]
fn test_headless_capture_logs_one_line() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V4);

    let (saved, lines) = logged_lines(|| {
        session
            .capture(&timestamp(), &mut picam::capture::NoPrompt)
            .unwrap()
            .unwrap()
    });

    assert_eq!(saved, tmp.path().join("captured_images/이미지_20250131_090807.jpg"));
    assert_eq!(lines.len(), 1, "{:?}", lines);
}

#[test]
fn test_autofocus_logs_one_line() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V3);

    let (started, lines) = logged_lines(|| session.autofocus());

    assert!(started);
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].ends_with("Focus adjustment started"));
}

#[test]
fn test_dialog_non_jpeg_extension_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V4);

    let chosen = tmp.path().join("shot.png");
    let saved = session
        .capture(&timestamp(), &mut ScriptedPrompt::answering(Some(chosen)))
        .unwrap()
        .unwrap();

    assert_eq!(saved, tmp.path().join("shot.jpg"));
    assert!(!tmp.path().join("shot.png").exists());
    assert_eq!(
        image::ImageFormat::from_path(&saved).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert!(image::open(&saved).is_ok());
}

#[test]
fn test_dialog_rename_and_relocate() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = session(tmp.path(), Profile::V3);

    let chosen = tmp.path().join("holiday");
    let saved = session
        .capture(&timestamp(), &mut ScriptedPrompt::answering(Some(chosen)))
        .unwrap()
        .unwrap();

    assert_eq!(saved, tmp.path().join("holiday.jpg"));
    assert!(saved.exists());
    assert!(files_in(&tmp.path().join("captured_images")).is_empty());
}

#[test]
fn test_resize_rerenders_only_in_v4() {
    let tmp = tempfile::tempdir().unwrap();

    for (profile, expected) in [(Profile::V3, false), (Profile::V4, true)] {
        let mut session = session(tmp.path(), profile);
        let mut renderer = RecordingRenderer::default();

        session.tick(Instant::now(), (640, 480), &mut renderer).unwrap();
        let rerendered = session.resize((320, 480), &mut renderer);

        assert_eq!(rerendered, expected, "{:?}", profile);
        if expected {
            assert_eq!(renderer.sizes, vec![(640, 480), (320, 240)]);
            // No new capture for the re-render
            assert_eq!(session.camera().frame_count(), 1);
        } else {
            assert_eq!(renderer.sizes, vec![(640, 480)]);
        }

        // Same size again is not a resize
        assert!(!session.resize((320, 480), &mut renderer));
    }
}

#[test]
fn test_autofocus_only_when_profile_has_it() {
    let tmp = tempfile::tempdir().unwrap();

    let mut v2 = session(tmp.path(), Profile::V2);
    assert!(!v2.autofocus());
    assert_eq!(v2.camera().autofocus_cycles(), 0);

    let mut v4 = session(tmp.path(), Profile::V4);
    assert!(v4.autofocus());
    assert_eq!(v4.camera().focus_mode(), FocusMode::ContinuousAuto);
    assert_eq!(v4.camera().autofocus_cycles(), 1);
}

#[test]
fn test_starting_twice_keeps_one_save_directory() {
    let tmp = tempfile::tempdir().unwrap();

    let mut first = session(tmp.path(), Profile::V1);
    first
        .capture(&timestamp(), &mut ScriptedPrompt::answering(None))
        .unwrap();
    drop(first);

    let _second = session(tmp.path(), Profile::V1);

    assert_eq!(files_in(tmp.path()), vec![tmp.path().join("captured_images")]);
    assert_eq!(files_in(&tmp.path().join("captured_images")).len(), 1);
}

#[test]
fn test_open_with_test_pattern_source() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = Settings {
        width: 160,
        height: 90,
        ..settings_in(tmp.path(), Profile::V1)
    };

    let mut session = CameraSession::open(&settings).unwrap();
    assert_eq!(session.camera().resolution(), Resolution::new(160, 90));

    let mut renderer = RecordingRenderer::default();
    session.tick(Instant::now(), (80, 80), &mut renderer).unwrap();
    assert_eq!(renderer.sizes, vec![(80, 45)]);
}
