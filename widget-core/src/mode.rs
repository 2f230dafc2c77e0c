//! Display density and the layout it implies.
//!
//! The widget renders at one of three densities. Each mode maps to one of two
//! constraint sets plus an interaction flag; the renderer re-applies both
//! whenever the controller accepts a mode change.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Compact,
    Halfscreen,
    Fullscreen,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Compact => "compact",
            DisplayMode::Halfscreen => "halfscreen",
            DisplayMode::Fullscreen => "fullscreen",
        }
    }

    pub const fn all() -> &'static [DisplayMode] {
        &[
            DisplayMode::Compact,
            DisplayMode::Halfscreen,
            DisplayMode::Fullscreen,
        ]
    }

    /// Parse one of the exact mode names, returning `None` for anything else.
    /// Matching is case-sensitive and does not trim.
    pub fn parse(value: &str) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Compact widgets are glanceable only; larger modes accept touches.
    pub fn interaction_enabled(&self) -> bool {
        !matches!(self, DisplayMode::Compact)
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DisplayMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "compact" => Ok(DisplayMode::Compact),
            "halfscreen" => Ok(DisplayMode::Halfscreen),
            "fullscreen" => Ok(DisplayMode::Fullscreen),
            _ => Err(anyhow::anyhow!(
                "Unknown view mode '{value}'. Supported modes: compact, halfscreen, fullscreen."
            )),
        }
    }
}

/// Views the widget lays out and toggles interaction on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedView {
    Place,
    Description,
    Icon,
    Temperature,
    TemperatureDetails,
}

impl ManagedView {
    pub const fn all() -> &'static [ManagedView] {
        &[
            ManagedView::Place,
            ManagedView::Description,
            ManagedView::Icon,
            ManagedView::Temperature,
            ManagedView::TemperatureDetails,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintSet {
    /// Views hug the layout margins.
    Compact,
    /// Views sit [`WIDE_MARGIN_INSET`] points inside the layout margins.
    WideMargin,
}

pub const WIDE_MARGIN_INSET: f32 = 64.0;

impl ConstraintSet {
    pub fn inset(&self) -> f32 {
        match self {
            ConstraintSet::Compact => 0.0,
            ConstraintSet::WideMargin => WIDE_MARGIN_INSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

pub const BASE_MARGINS: Margins = Margins {
    top: 8.0,
    leading: 16.0,
    bottom: 8.0,
    trailing: 16.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Leading,
    Bottom,
    Trailing,
    CenterX,
    CenterY,
}

/// Distance of a view edge inward from the matching layout-margin edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    pub view: ManagedView,
    pub edge: Edge,
    pub inset: f32,
}

impl Pin {
    fn new(view: ManagedView, edge: Edge, inset: f32) -> Self {
        Self { view, edge, inset }
    }
}

/// Everything the renderer needs to re-lay out after a mode change.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub active: ConstraintSet,
    pub deactivated: ConstraintSet,
    pub margins: Margins,
    pub interaction_enabled: bool,
}

impl Layout {
    pub fn for_mode(mode: DisplayMode) -> Self {
        let (active, deactivated) = match mode {
            DisplayMode::Compact | DisplayMode::Halfscreen => {
                (ConstraintSet::Compact, ConstraintSet::WideMargin)
            }
            DisplayMode::Fullscreen => (ConstraintSet::WideMargin, ConstraintSet::Compact),
        };

        Self {
            active,
            deactivated,
            margins: BASE_MARGINS,
            interaction_enabled: mode.interaction_enabled(),
        }
    }

    /// Pins of the active constraint set. The icon is always centred and
    /// spans the full widget height regardless of the set.
    pub fn pins(&self) -> Vec<Pin> {
        use ManagedView::*;

        let inset = self.active.inset();
        vec![
            Pin::new(Place, Edge::Leading, inset),
            Pin::new(Place, Edge::Top, inset),
            Pin::new(Description, Edge::Leading, inset),
            Pin::new(Description, Edge::Bottom, inset),
            Pin::new(Icon, Edge::CenterX, 0.0),
            Pin::new(Icon, Edge::CenterY, 0.0),
            Pin::new(Temperature, Edge::Top, inset),
            Pin::new(Temperature, Edge::Trailing, inset),
            Pin::new(TemperatureDetails, Edge::Trailing, inset),
            Pin::new(TemperatureDetails, Edge::Bottom, inset),
        ]
    }
}
