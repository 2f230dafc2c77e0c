//! The widget's orchestration core.
//!
//! All state lives in [`WidgetController`], which runs on a single serial
//! display context: one task draining a channel of [`WidgetEvent`]s. Location
//! updates and fetch completions arrive from other tasks and are posted onto
//! that channel before anything renderer-facing is touched.
//!
//! Completions only hold a weak sender. Once every [`WidgetHandle`] is dropped
//! the display context shuts down and late completions are discarded.

use std::sync::Arc;

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
    task::JoinHandle,
};

use crate::{
    display::{DisplayUpdate, IconImage, Renderer},
    error::FetchError,
    location::{LocationSink, LocationSource},
    mode::{DisplayMode, Layout},
    model::{Coordinate, IconAsset, WeatherReading},
    provider::{ImageFetchClient, WeatherFetchClient},
};

/// Everything that can happen on the display context.
#[derive(Debug)]
pub enum WidgetEvent {
    LocationUpdated(Coordinate),
    WeatherFetched(Result<WeatherReading, FetchError>),
    IconFetched {
        icon_code: String,
        result: Result<IconAsset, FetchError>,
    },
    ModeRequested(String),
}

/// Owning handle to a running widget. Dropping the last one tears the widget down.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    events: UnboundedSender<WidgetEvent>,
}

impl WidgetHandle {
    /// Request a display mode by name. Unrecognized names are ignored by the widget.
    ///
    /// Returns `false` if the widget is no longer running.
    pub fn set_mode(&self, mode: impl Into<String>) -> bool {
        let event = WidgetEvent::ModeRequested(mode.into());
        self.events.send(event).is_ok()
    }

    fn downgrade(&self) -> WeakUnboundedSender<WidgetEvent> {
        self.events.downgrade()
    }
}

/// Create the display-context channel a [`WidgetController`] is driven by.
pub fn display_channel() -> (WidgetHandle, UnboundedReceiver<WidgetEvent>) {
    let (events, rx) = mpsc::unbounded_channel();
    (WidgetHandle { events }, rx)
}

pub struct WidgetController {
    weather: Arc<dyn WeatherFetchClient>,
    images: Arc<dyn ImageFetchClient>,
    location: Box<dyn LocationSource>,
    renderer: Box<dyn Renderer>,
    mode: DisplayMode,
    /// Icon code of the last image fetch issued. Set on request, never cleared.
    last_icon_code: Option<String>,
    events: WeakUnboundedSender<WidgetEvent>,
}

impl WidgetController {
    pub fn new(
        handle: &WidgetHandle,
        mode: DisplayMode,
        weather: Arc<dyn WeatherFetchClient>,
        images: Arc<dyn ImageFetchClient>,
        mut location: Box<dyn LocationSource>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let events = handle.downgrade();
        location.set_delegate(LocationSink::new(events.clone()));

        Self {
            weather,
            images,
            location,
            renderer,
            mode,
            last_icon_code: None,
            events,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn last_icon_code(&self) -> Option<&str> {
        self.last_icon_code.as_deref()
    }

    /// Lay out for the initial mode, then ask for location access and start updates.
    /// Nothing is fetched until the first location update arrives.
    pub fn start(&mut self) {
        self.apply_layout();
        self.location.request_authorization();
        self.location.start_updating();
    }

    pub fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::LocationUpdated(coordinate) => self.request_weather(coordinate),
            WidgetEvent::WeatherFetched(Ok(reading)) => self.apply_reading(reading),
            WidgetEvent::WeatherFetched(Err(err)) => self.report(&err, "weather fetch failed"),
            WidgetEvent::IconFetched { icon_code, result } => match result {
                Ok(asset) => self.apply_icon(&icon_code, &asset),
                // `last_icon_code` stays put: the same code will not be fetched again.
                Err(err) => self.report(&err, "icon fetch failed"),
            },
            WidgetEvent::ModeRequested(mode) => self.set_mode(&mode),
        }
    }

    /// Switch display mode and re-derive layout. Unrecognized names are a silent no-op.
    pub fn set_mode(&mut self, value: &str) {
        let Some(mode) = DisplayMode::parse(value) else {
            tracing::debug!(value, "ignoring unrecognized view mode");
            return;
        };

        tracing::info!(%mode, "display mode changed");
        self.mode = mode;
        self.apply_layout();
    }

    /// Drive the widget until every [`WidgetHandle`] has been dropped.
    pub async fn run(mut self, mut events: UnboundedReceiver<WidgetEvent>) {
        self.start();

        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }

        self.location.stop_updating();
        tracing::debug!("display context closed");
    }

    fn apply_layout(&mut self) {
        let layout = Layout::for_mode(self.mode);
        self.renderer.apply_layout(self.mode, &layout);
    }

    fn request_weather(&self, coordinate: Coordinate) {
        tracing::info!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "requesting weather"
        );

        let client = Arc::clone(&self.weather);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.fetch(coordinate).await;
            post(&events, WidgetEvent::WeatherFetched(result));
        });
    }

    fn apply_reading(&mut self, reading: WeatherReading) {
        self.renderer.apply_update(DisplayUpdate::from_reading(&reading));

        let Some(condition) = reading.conditions.into_iter().next() else {
            return;
        };

        if self.last_icon_code.as_deref() == Some(condition.icon_code.as_str()) {
            tracing::debug!(icon_code = %condition.icon_code, "icon unchanged; skipping fetch");
            return;
        }

        self.last_icon_code = Some(condition.icon_code.clone());
        self.request_icon(condition.icon_code);
    }

    fn request_icon(&self, icon_code: String) {
        tracing::info!(%icon_code, "requesting icon");

        let client = Arc::clone(&self.images);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.fetch(&icon_code).await;
            post(&events, WidgetEvent::IconFetched { icon_code, result });
        });
    }

    fn apply_icon(&mut self, icon_code: &str, asset: &IconAsset) {
        match IconImage::decode(asset) {
            Ok(icon) => self.renderer.apply_update(DisplayUpdate::icon(icon)),
            Err(err) => {
                tracing::debug!(icon_code, error = %err, "undecodable icon; keeping current one")
            }
        }
    }

    fn report(&mut self, err: &FetchError, what: &str) {
        tracing::error!(error = %err, "{what}");
        self.renderer.report_error(&err.to_string());
    }
}

/// Post a completion back onto the display context, dropping it if the widget is gone.
fn post(events: &WeakUnboundedSender<WidgetEvent>, event: WidgetEvent) {
    let delivered = events.upgrade().is_some_and(|tx| tx.send(event).is_ok());
    if !delivered {
        tracing::debug!("widget torn down; dropping late completion");
    }
}

/// Spawn a widget on its own display-context task.
pub fn spawn_widget(
    mode: DisplayMode,
    weather: Arc<dyn WeatherFetchClient>,
    images: Arc<dyn ImageFetchClient>,
    location: Box<dyn LocationSource>,
    renderer: Box<dyn Renderer>,
) -> (WidgetHandle, JoinHandle<()>) {
    let (handle, events) = display_channel();
    let controller = WidgetController::new(&handle, mode, weather, images, location, renderer);
    let task = tokio::spawn(controller.run(events));
    (handle, task)
}
