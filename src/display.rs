use crate::constants::display;
use tracing::info;

/// Point the windowing layer at the local X11 display.
///
/// Two values are touched: `DISPLAY` is set to the local display and
/// `WAYLAND_DISPLAY` is removed. winit has no backend override variable, and
/// without `WAYLAND_DISPLAY` it falls back to X11. Must run before the GUI
/// starts and before any other thread exists.
pub fn force_local_display() {
    // SAFETY: called from main before the event loop or any worker thread
    // is created, so nothing else reads the environment concurrently.
    unsafe {
        std::env::set_var("DISPLAY", display::LOCAL_DISPLAY);
        std::env::remove_var("WAYLAND_DISPLAY");
    }
    info!(display = display::LOCAL_DISPLAY, "Forcing local X11 display");
}
