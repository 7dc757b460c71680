use crate::camera::CameraService;
use crate::capture::DialogPrompt;
use crate::constants::gui as consts;
use crate::preview::Renderer;
use crate::session::CameraSession;
use crate::settings::{Profile, Settings};
use eframe::egui;
use image::RgbImage;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Clone)]
enum CaptureStatus {
    Idle,
    Completed(String), // Result message
    Error(String),
}

struct Labels {
    capture: &'static str,
    autofocus: &'static str,
    waiting: &'static str,
    saved: &'static str,
    cancelled: &'static str,
}

impl Labels {
    fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::V1 => Self {
                capture: "Capture Image",
                autofocus: "Auto Focus",
                waiting: "Waiting for camera...",
                saved: "Image saved",
                cancelled: "Save cancelled",
            },
            _ => Self {
                capture: "사진 촬영",
                autofocus: "자동 초점",
                waiting: "카메라 대기 중...",
                saved: "이미지 저장됨",
                cancelled: "저장 취소됨",
            },
        }
    }
}

/// Uploads preview images into one reusable texture.
struct TextureRenderer<'a> {
    ctx: &'a egui::Context,
    texture: &'a mut Option<egui::TextureHandle>,
}

impl Renderer for TextureRenderer<'_> {
    fn render(&mut self, image: &RgbImage) {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, image.as_raw());

        if let Some(texture) = self.texture.as_mut() {
            texture.set(color_image, egui::TextureOptions::LINEAR);
            return;
        }
        *self.texture = Some(self.ctx.load_texture(
            "camera-preview",
            color_image,
            egui::TextureOptions::LINEAR,
        ));
    }
}

pub struct CameraApp {
    session: CameraSession<Box<dyn CameraService>>,
    texture: Option<egui::TextureHandle>,
    status: CaptureStatus,
    labels: Labels,
}

impl CameraApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: CameraSession<Box<dyn CameraService>>) -> Self {
        // Korean labels and filenames need a CJK font
        Self::setup_fonts(&cc.egui_ctx);
        let labels = Labels::for_profile(session.profile());

        Self {
            session,
            texture: None,
            status: CaptureStatus::Idle,
            labels,
        }
    }

    fn setup_fonts(ctx: &egui::Context) {
        let mut font_paths: Vec<String> = consts::DEFAULT_FONT_PATHS
            .iter()
            .map(|p| p.to_string())
            .collect();

        // Add user config directory path if available
        if let Some(path) = consts::get_config_font_path() {
            font_paths.push(path);
        }

        let mut fonts = egui::FontDefinitions::default();
        let mut font_loaded = false;

        for path in font_paths.iter() {
            if let Ok(font_data) = std::fs::read(path) {
                fonts.font_data.insert(
                    "custom_font".to_owned(),
                    std::sync::Arc::new(egui::FontData::from_owned(font_data)),
                );

                fonts
                    .families
                    .entry(egui::FontFamily::Proportional)
                    .or_default()
                    .insert(0, "custom_font".to_owned());

                fonts
                    .families
                    .entry(egui::FontFamily::Monospace)
                    .or_default()
                    .push("custom_font".to_owned());

                font_loaded = true;
                info!(path = %path, "Loaded font");
                break;
            }
        }

        if !font_loaded {
            warn!(
                paths = ?font_paths,
                "No NotoSansKR-Regular.ttf found, Korean text will not render"
            );
        }

        ctx.set_fonts(fonts);
    }

    fn capture(&mut self) {
        let timestamp = chrono::Local::now().naive_local();

        match self.session.capture(&timestamp, &mut DialogPrompt) {
            Ok(Some(path)) => {
                self.status =
                    CaptureStatus::Completed(format!("{}: {}", self.labels.saved, path.display()));
            }
            Ok(None) => {
                self.status = CaptureStatus::Completed(self.labels.cancelled.to_string());
            }
            Err(e) => {
                error!(error = ?e, "Capture failed");
                self.status = CaptureStatus::Error(format!("{:#}", e));
            }
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button(self.labels.capture).clicked() {
                self.capture();
            }

            if self.session.profile().has_autofocus() && ui.button(self.labels.autofocus).clicked() {
                self.session.autofocus();
            }
        });

        match &self.status {
            CaptureStatus::Idle => {
                ui.label(format!("{}", self.session.save_dir().display()));
            }
            CaptureStatus::Completed(msg) => {
                ui.colored_label(egui::Color32::GREEN, format!("✓ {}", msg));
            }
            CaptureStatus::Error(msg) => {
                ui.colored_label(egui::Color32::RED, format!("✗ {}", msg));
            }
        }
        ui.add_space(6.0);
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let target = (available.x.max(0.0) as u32, available.y.max(0.0) as u32);

        let mut renderer = TextureRenderer {
            ctx: ui.ctx(),
            texture: &mut self.texture,
        };

        match self.session.tick(Instant::now(), target, &mut renderer) {
            Ok(true) => {}
            Ok(false) => {
                self.session.resize(target, &mut renderer);
            }
            Err(e) => {
                warn!(error = ?e, "Preview frame dropped");
            }
        }

        match &self.texture {
            Some(texture) => {
                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), texture.size_vec2()));
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(self.labels.waiting);
                });
            }
        }
    }
}

impl eframe::App for CameraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("controls")
            .min_height(consts::CONTROLS_HEIGHT)
            .show(ctx, |ui| self.show_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.show_preview(ui));

        ctx.request_repaint_after(self.session.until_next_tick(Instant::now()));
    }
}

pub fn run_gui(settings: Settings) -> anyhow::Result<()> {
    // Camera and save directory failures abort before a window appears
    let session = CameraSession::open(&settings)?;
    let title = settings.profile.title();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_position([consts::WINDOW_X, consts::WINDOW_Y])
            .with_inner_size([consts::WINDOW_WIDTH, consts::WINDOW_HEIGHT])
            .with_min_inner_size([consts::MIN_WINDOW_WIDTH, consts::MIN_WINDOW_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Ok(Box::new(CameraApp::new(cc, session)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {:?}", e))
}
