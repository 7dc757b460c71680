use anyhow::Result;
use clap::{Parser, Subcommand};
use picam::capture::NoPrompt;
use picam::settings::{self, Profile, Settings};
use picam::{CameraSession, camera};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "picam")]
#[command(about = "Camera preview and still capture", long_about = None)]
struct Args {
    #[arg(long, value_enum, help = "Behave like release v1, v2, v3 or v4")]
    profile: Option<Profile>,

    #[arg(short, long, help = "Camera device index (/dev/video<N>)")]
    device: Option<usize>,

    #[arg(long, help = "Use a synthetic color-bar camera instead of hardware")]
    test_pattern: bool,

    #[arg(short, long, help = "Directory captured images are saved to")]
    save_dir: Option<PathBuf>,

    #[arg(long, help = "Capture width in pixels")]
    width: Option<u32>,

    #[arg(long, help = "Capture height in pixels")]
    height: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture one image into the save directory without opening a window
    Snap,
    /// List camera devices
    List,
    /// Print the effective settings
    Config {
        #[arg(long, help = "Write the effective settings to the settings file")]
        save: bool,
    },
}

impl Args {
    /// Command-line flags override the settings file.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(profile) = self.profile {
            settings.profile = profile;
        }
        if let Some(device) = self.device {
            settings.device = device;
        }
        if self.test_pattern {
            settings.test_pattern = true;
        }
        if let Some(dir) = &self.save_dir {
            settings.save_dir = dir.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        settings
    }
}

fn snap(settings: &Settings) -> Result<()> {
    let mut session = CameraSession::open(settings)?;
    let timestamp = chrono::Local::now().naive_local();

    // Headless capture never prompts; the save line comes from the controller
    session.capture(&timestamp, &mut NoPrompt)?;
    Ok(())
}

fn list_devices() -> Result<()> {
    let devices = camera::list_devices();

    if devices.is_empty() {
        println!("No camera devices found");
        println!("   Use --test-pattern to run without hardware");
        return Ok(());
    }

    println!("\nCAMERA DEVICES");
    for device in devices {
        println!("  {}  {}", device.index, device.name);
    }
    println!();
    Ok(())
}

fn show_config(settings: &Settings, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);

    if save {
        let path = settings::save_settings(settings)?;
        println!("\nSettings saved to {}", path.display());
    } else {
        let path = settings::get_settings_file_path()?;
        println!("\nSettings file: {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    picam::init_logging();

    let args = Args::parse();
    let settings = args.apply(settings::load_settings()?);

    match args.command {
        Some(Command::Snap) => snap(&settings),
        Some(Command::List) => list_devices(),
        Some(Command::Config { save }) => show_config(&settings, save),
        None => {
            if settings.profile.forces_local_display() {
                picam::display::force_local_display();
            }
            picam::gui::run_gui(settings)
        }
    }
}
