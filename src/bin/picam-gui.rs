#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> anyhow::Result<()> {
    picam::init_logging();

    let settings = picam::settings::load_settings()?;
    if settings.profile.forces_local_display() {
        picam::display::force_local_display();
    }
    picam::gui::run_gui(settings)
}
