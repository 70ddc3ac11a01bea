// main.rs - ShotScan Entry Point
//
// Parses the CLI, wires up logging, and hands control to the event loop.
// The `settings` subcommand runs the terminal dialog instead of starting
// the tray app.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use winit::event_loop::{ControlFlow, EventLoop};

use shotscan::ui::prompt;
use shotscan::{decode, App, Settings, UserEvent};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit and save settings interactively.
    Settings,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", LevelFilter::Warn)
        .filter_module("wgpu_hal", LevelFilter::Warn)
        .filter_module("naga", LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    if let Some(Command::Settings) = cli.command {
        prompt::run_settings_dialog().context("Settings dialog failed")?;
        return Ok(());
    }

    info!("ShotScan starting");
    let settings = Settings::load();
    prepare_tesseract(&settings);

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    let mut app = App::new(settings, proxy);
    event_loop.run_app(&mut app).context("Event loop failed")?;

    info!("ShotScan shutting down");
    Ok(())
}

/// Make the configured tesseract binary visible to the OCR stage and log
/// what was found. OCR is a per-capture concern, so a missing install only
/// warns at startup.
fn prepare_tesseract(settings: &Settings) {
    let binary = if settings.tesseract_path.is_empty() {
        "tesseract"
    } else {
        decode::expose_tesseract_binary(&settings.tesseract_path);
        settings.tesseract_path.as_str()
    };
    match decode::tesseract_version(binary) {
        Ok(version) => info!("Tesseract version: {version}"),
        Err(e) => warn!("{e}; OCR will be unavailable until tesseract is installed"),
    }
}
