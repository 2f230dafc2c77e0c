//! Renderer-facing display state.
//!
//! The controller never touches widgets directly. It hands [`DisplayUpdate`]s,
//! layouts and error messages to a [`Renderer`], always from the display context.

use crate::{
    mode::{DisplayMode, Layout},
    model::{IconAsset, WeatherReading},
};

/// A decoded icon ready to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl IconImage {
    pub fn decode(asset: &IconAsset) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(asset.as_bytes())?;
        let rgba = decoded.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

/// Incremental update; `None` fields leave the current value on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayUpdate {
    pub place: Option<String>,
    pub temperature_text: Option<String>,
    pub min_max_text: Option<String>,
    pub description: Option<String>,
    pub icon: Option<IconImage>,
}

impl DisplayUpdate {
    pub fn from_reading(reading: &WeatherReading) -> Self {
        Self {
            place: Some(reading.place_name.clone()),
            temperature_text: Some(temperature_text(reading.temperature)),
            min_max_text: Some(min_max_text(reading.temp_max, reading.temp_min)),
            description: reading
                .primary_condition()
                .map(|c| capitalize_words(&c.description)),
            icon: None,
        }
    }

    pub fn icon(icon: IconImage) -> Self {
        Self {
            icon: Some(icon),
            ..Self::default()
        }
    }
}

/// Consumer of resolved display state. Runs on the display context only.
pub trait Renderer: Send {
    fn apply_update(&mut self, update: DisplayUpdate);

    fn apply_layout(&mut self, mode: DisplayMode, layout: &Layout);

    /// One-button acknowledgement of a failed fetch.
    fn report_error(&mut self, message: &str);
}

/// `21.4` -> `"21.4°C"`, `21.0` -> `"21.0°C"`.
pub fn temperature_text(celsius: f64) -> String {
    format!("{celsius:?}°C")
}

/// High/low rounded half away from zero: `(25.6, 18.2)` -> `"H: 26°C, L: 18°C"`.
pub fn min_max_text(max: f64, min: f64) -> String {
    format!(
        "H: {}°C, L: {}°C",
        max.round() as i64,
        min.round() as i64
    )
}

/// Upper-case the first letter of each word and lower-case the rest.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}
