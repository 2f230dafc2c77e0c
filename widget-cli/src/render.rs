use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use weather_widget_core::{
    DisplayMode, DisplayUpdate, Layout, Renderer,
    mode::{ManagedView, Pin},
};

/// What the terminal has shown so far, for deciding when a one-shot run is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Weather text with no condition, so no icon follows.
    Weather,
    /// Weather text with a condition; its icon may follow.
    WeatherAwaitingIcon,
    Icon,
    Error,
}

/// Prints widget state to stdout, one line per change.
pub struct TerminalRenderer {
    progress: UnboundedSender<Progress>,
}

impl TerminalRenderer {
    pub fn new(progress: UnboundedSender<Progress>) -> Self {
        Self { progress }
    }

    fn line(&self, text: &str) {
        println!("[{}] {text}", Local::now().format("%H:%M:%S"));
    }
}

impl Renderer for TerminalRenderer {
    fn apply_update(&mut self, update: DisplayUpdate) {
        if let Some(place) = &update.place {
            self.line(&format!("Location:    {place}"));
        }
        if let Some(temp) = &update.temperature_text {
            self.line(&format!("Temperature: {temp}"));
        }
        if let Some(min_max) = &update.min_max_text {
            self.line(&format!("Range:       {min_max}"));
        }
        if let Some(description) = &update.description {
            self.line(&format!("Conditions:  {description}"));
        }

        let progress = match &update.icon {
            Some(icon) => {
                self.line(&format!("Icon:        {}x{} px", icon.width, icon.height));
                Progress::Icon
            }
            None if update.description.is_some() => Progress::WeatherAwaitingIcon,
            None => Progress::Weather,
        };
        let _ = self.progress.send(progress);
    }

    fn apply_layout(&mut self, mode: DisplayMode, layout: &Layout) {
        self.line(&format!(
            "Mode:        {mode} (interaction {})",
            on_off(layout.interaction_enabled)
        ));

        let pins = layout.pins();
        for view in ManagedView::all() {
            let label = format!("{view:?}:");
            self.line(&format!("  {label:<19}{}", pin_summary(&pins, *view)));
        }
    }

    fn report_error(&mut self, message: &str) {
        self.line(&format!("Error:       {message}  [OK]"));
        let _ = self.progress.send(Progress::Error);
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// `Leading 64, Top 64` for the pins that belong to `view`.
fn pin_summary(pins: &[Pin], view: ManagedView) -> String {
    pins.iter()
        .filter(|pin| pin.view == view)
        .map(|pin| format!("{:?} {}", pin.edge, pin.inset))
        .collect::<Vec<_>>()
        .join(", ")
}
