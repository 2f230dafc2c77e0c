use std::{io::BufRead, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::timeout,
};
use weather_widget_core::{
    Coordinate, DisplayMode, FixedLocationSource, WidgetConfig, WidgetHandle, clients_from_config,
    spawn_widget,
};

use crate::render::{Progress, TerminalRenderer};

/// How long a one-shot run waits for the icon once the weather text is up.
const ICON_WAIT: Duration = Duration::from_secs(10);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Weather widget for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, service URLs and default view mode.
    Configure,

    /// Show the weather at a coordinate.
    ///
    /// While running, type `compact`, `halfscreen` or `fullscreen` and press
    /// enter to switch the view mode.
    Show {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Starting view mode; defaults to the configured one. Case-insensitive.
        #[arg(long)]
        mode: Option<String>,

        /// Re-report the location every N seconds and keep running until Ctrl-C.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        refresh_secs: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                mode,
                refresh_secs,
            } => show(Coordinate::new(lat, lon), mode, refresh_secs).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = WidgetConfig::load()?;

    let api_key = inquire::Password::new("Weather API key (leave blank to keep current):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let weather_api_url = inquire::Text::new("Weather API URL:")
        .with_default(&config.weather_api_url)
        .prompt()
        .context("Failed to read weather API URL")?;

    let image_api_url = inquire::Text::new("Icon API URL:")
        .with_default(&config.image_api_url)
        .prompt()
        .context("Failed to read icon API URL")?;

    let current = config.initial_mode();
    let cursor = DisplayMode::all()
        .iter()
        .position(|m| *m == current)
        .unwrap_or(0);
    let view_mode = inquire::Select::new("Default view mode:", DisplayMode::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read view mode")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }
    config.weather_api_url = weather_api_url;
    config.image_api_url = image_api_url;
    config.view_mode = view_mode.as_str().to_string();

    config.save()?;
    let path = WidgetConfig::config_file_path()?;
    println!("Saved configuration to {}", path.display());

    if !config.is_configured() {
        println!("Note: no API key is set yet; `show` needs one.");
    }

    Ok(())
}

async fn show(
    coordinate: Coordinate,
    mode: Option<String>,
    refresh_secs: Option<u64>,
) -> anyhow::Result<()> {
    let config = WidgetConfig::load()?;
    let (weather, images) = clients_from_config(&config)?;

    let initial_mode = match mode {
        Some(mode) => DisplayMode::try_from(normalize_mode(&mode).as_str())?,
        None => config.initial_mode(),
    };

    let mut location = FixedLocationSource::new(coordinate);
    if let Some(secs) = refresh_secs {
        location = location.with_refresh(Duration::from_secs(secs));
    }

    let (progress_tx, mut progress) = mpsc::unbounded_channel();
    let (handle, _widget) = spawn_widget(
        initial_mode,
        weather,
        images,
        Box::new(location),
        Box::new(TerminalRenderer::new(progress_tx)),
    );

    forward_stdin_modes(handle.clone());

    if refresh_secs.is_some() {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = async { while progress.recv().await.is_some() {} } => {}
        }
    } else {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = wait_for_first_render(&mut progress, ICON_WAIT) => {}
        }
    }

    Ok(())
}

/// Mode names typed by a person may differ in case and surrounding space.
fn normalize_mode(input: &str) -> String {
    input.trim().to_lowercase()
}

/// A one-shot run is done once the first reading and its icon (if any) are on screen.
fn finishes_one_shot(progress: Progress) -> bool {
    !matches!(progress, Progress::WeatherAwaitingIcon)
}

/// Wait for the first reading to render. An icon that never shows up, say
/// because its bytes do not decode, holds the exit back by at most `icon_wait`.
async fn wait_for_first_render(progress: &mut UnboundedReceiver<Progress>, icon_wait: Duration) {
    match progress.recv().await {
        Some(Progress::WeatherAwaitingIcon) => {}
        _ => return,
    }

    let icon = async {
        while let Some(event) = progress.recv().await {
            if finishes_one_shot(event) {
                break;
            }
        }
    };

    if timeout(icon_wait, icon).await.is_err() {
        println!("Icon did not load in {}s; exiting.", icon_wait.as_secs());
    }
}

/// Forward lines typed on stdin to the widget as mode requests.
///
/// Runs on a plain thread: a blocking stdin read cannot be cancelled and must
/// not hold the runtime open at exit.
fn forward_stdin_modes(handle: WidgetHandle) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if !handle.set_mode(normalize_mode(&line)) {
                break;
            }
        }
    });
}
