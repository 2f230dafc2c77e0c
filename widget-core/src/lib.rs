//! Core library for the embeddable weather widget.
//!
//! This crate defines:
//! - Fetch clients for current weather and condition icons
//! - The location source contract
//! - The orchestration controller and its display-mode state machine
//! - Configuration handling
//!
//! Rendering is left to the embedder through the [`Renderer`] trait.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod location;
pub mod mode;
pub mod model;
pub mod provider;

pub use config::WidgetConfig;
pub use controller::{
    WidgetController, WidgetEvent, WidgetHandle, display_channel, spawn_widget,
};
pub use display::{DisplayUpdate, IconImage, Renderer};
pub use error::FetchError;
pub use location::{AuthorizationStatus, FixedLocationSource, LocationSink, LocationSource};
pub use mode::{DisplayMode, Layout};
pub use model::{ConditionEntry, Coordinate, IconAsset, WeatherReading};
pub use provider::{ImageFetchClient, WeatherFetchClient, clients_from_config};
