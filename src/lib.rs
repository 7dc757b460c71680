pub mod autofocus;
pub mod camera;
pub mod capture;
pub mod constants;
pub mod display;
pub mod frame;
pub mod gui;
pub mod preview;
pub mod session;
pub mod settings;

pub use camera::{CameraService, CameraSource, FocusMode, Resolution};
pub use capture::{CaptureController, SavePrompt, SaveTarget, capture_filename, ensure_save_dir};
pub use frame::{Frame, to_rgb};
pub use preview::{PreviewLoop, Renderer, fit_within, scale_to_fit};
pub use session::CameraSession;
pub use settings::{Profile, Settings};

/// Install the `tracing` subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .try_init();
}
