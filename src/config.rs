//! Controller configuration.

use std::fmt;
use std::str::FromStr;

/// Which controls the host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlLayout {
    /// One combined control: the flashlight also drives screen brightness.
    #[default]
    Single,
    /// Separate flashlight and screen-light controls.
    Dual,
}

impl ControlLayout {
    /// Whether this layout has a separate screen-light control.
    pub fn has_screen_light(self) -> bool {
        matches!(self, ControlLayout::Dual)
    }
}

impl fmt::Display for ControlLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlLayout::Single => f.write_str("single"),
            ControlLayout::Dual => f.write_str("dual"),
        }
    }
}

/// Error returned when parsing an unknown layout name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control layout {0:?} (expected \"single\" or \"dual\")")]
pub struct ParseLayoutError(String);

impl FromStr for ControlLayout {
    type Err = ParseLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ControlLayout::Single),
            "dual" => Ok(ControlLayout::Dual),
            other => Err(ParseLayoutError(other.to_string())),
        }
    }
}

/// Configuration for a [`LightController`](crate::LightController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightConfig {
    /// Control layout.
    pub layout: ControlLayout,
}

impl LightConfig {
    /// Create the default configuration (single layout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given layout.
    pub fn with_layout(mut self, layout: ControlLayout) -> Self {
        self.layout = layout;
        self
    }
}
