use crate::camera::{CameraService, FocusMode};
use tracing::{info, warn};

/// Switch to continuous autofocus and request one cycle.
///
/// Fire-and-forget: completion is never awaited and failures only reach the log.
pub fn trigger_autofocus<C: CameraService + ?Sized>(camera: &mut C) {
    if let Err(e) = camera.set_focus_mode(FocusMode::ContinuousAuto) {
        warn!(error = %e, "Could not enable continuous autofocus");
    }
    if let Err(e) = camera.run_autofocus_cycle() {
        warn!(error = %e, "Could not start autofocus cycle");
    }
    info!("Focus adjustment started");
}
