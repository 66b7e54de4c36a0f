//! Controller state snapshot and the small value types it is built from.

/// Flash mode of a camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashMode {
    /// LED is dark.
    #[default]
    Off,
    /// LED is continuously lit.
    Torch,
}

/// A raw brightness reading as reported by a display backend.
///
/// Backends use different scales (0-255 on phones, `0..=max_brightness`
/// on sysfs), so the maximum travels with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    /// The current value.
    pub raw: u32,
    /// The largest value the backend accepts.
    pub max: u32,
}

impl Brightness {
    /// Create a reading of `raw` on a `0..=max` scale.
    pub fn new(raw: u32, max: u32) -> Self {
        Self { raw, max }
    }

    /// Convert the reading to a 0.0-1.0 fraction of the maximum.
    ///
    /// Unlike [`Brightness::to_percent`] this keeps the full resolution of
    /// the backend's scale. A zero maximum yields 0.0.
    pub fn to_fraction(self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.raw.min(self.max) as f32 / self.max as f32
    }

    /// Convert the reading to a percentage (0-100).
    ///
    /// A zero maximum yields 0.
    pub fn to_percent(self) -> u8 {
        if self.max == 0 {
            return 0;
        }
        let raw = self.raw.min(self.max);
        ((raw as f32 / self.max as f32) * 100.0).round() as u8
    }
}

/// Wording shown on a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// "on" wording.
    On,
    /// "off" wording.
    Off,
}

/// Foreground/background coloring of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// Black text on a white background.
    Bright,
    /// White text on a black background.
    Dark,
}

/// How a control should currently be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    /// Label wording.
    pub label: Label,
    /// Coloring.
    pub scheme: ColorScheme,
}

impl Affordance {
    /// The lit rendering: "on" wording, bright scheme.
    pub const ON: Affordance = Affordance {
        label: Label::On,
        scheme: ColorScheme::Bright,
    };

    /// The dark rendering: "off" wording, dark scheme.
    pub const OFF: Affordance = Affordance {
        label: Label::Off,
        scheme: ColorScheme::Dark,
    };
}

impl Default for Affordance {
    fn default() -> Self {
        Self::OFF
    }
}

/// Which tap targets the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Show the flashlight control.
    pub flashlight: bool,
    /// Show the screen-light control.
    pub screen_light: bool,
}

/// A snapshot of the controller's current state.
///
/// Use [`LightController::state`](crate::LightController::state) to obtain one.
/// Listeners receive a fresh snapshot after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightState {
    /// Whether the flashlight was last switched on.
    pub flash_on: bool,
    /// Whether the screen light is on.
    pub screen_on: bool,
    /// Whether the torch is confirmed lit on the hardware.
    pub torch_lit: bool,
    /// Whether a camera session is currently held.
    pub camera_acquired: bool,
    /// Ambient brightness captured at creation (0-100).
    pub previous_brightness: Option<u8>,
    /// The brightness override currently applied, as a 0.0-1.0 fraction.
    /// `None` means the system default is in effect.
    pub brightness: Option<f32>,
    /// Rendering of the flashlight control.
    pub flash_affordance: Affordance,
    /// Rendering of the screen-light control.
    pub screen_affordance: Affordance,
}
