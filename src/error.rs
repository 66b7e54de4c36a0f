//! Error types for the light controller and its backends.

use std::fmt;

/// Errors that can occur when driving the flashlight or the display.
#[derive(Debug, thiserror::Error)]
pub enum LightError {
    /// The ambient brightness setting could not be read.
    #[error("Ambient brightness unavailable: {0}")]
    AmbientBrightness(String),

    /// The camera could not be bound to its preview surface.
    #[error("Failed to bind camera preview: {0}")]
    PreviewBinding(String),

    /// The camera device could not be opened.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Reading or writing the flash mode failed.
    #[error("Failed to access flash mode: {0}")]
    FlashMode(String),

    /// Applying a brightness override failed.
    #[error("Failed to apply brightness: {0}")]
    Brightness(String),

    /// The controller was configured without a screen light.
    #[error("Screen light is not available in the single-control layout")]
    ScreenLightUnavailable,

    /// No matching device was found under the given sysfs class.
    #[error("No {class} device found")]
    DeviceNotFound {
        /// The sysfs class that was searched (e.g. `leds`).
        class: &'static str,
    },

    /// A device attribute held a value that could not be interpreted.
    #[error("Invalid value {value:?} in {attribute}")]
    InvalidValue {
        /// The attribute file name.
        attribute: &'static str,
        /// The raw contents.
        value: String,
    },

    /// An I/O error occurred while talking to a device.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The part of the controller a recovered failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Reading the ambient brightness at creation.
    AmbientBrightness,
    /// Opening the camera.
    CameraOpen,
    /// Binding the camera to its preview surface.
    PreviewBinding,
    /// Starting the preview stream.
    PreviewStart,
    /// Reading or writing the flash mode.
    FlashMode,
    /// Applying a brightness override.
    Brightness,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::AmbientBrightness => "ambient brightness",
            FailureKind::CameraOpen => "camera open",
            FailureKind::PreviewBinding => "preview binding",
            FailureKind::PreviewStart => "preview start",
            FailureKind::FlashMode => "flash mode",
            FailureKind::Brightness => "brightness",
        };
        f.write_str(name)
    }
}

/// A failure the controller recovered from.
///
/// Operations on [`LightController`](crate::LightController) are best-effort:
/// hardware errors do not abort them. Each one is logged and handed to the
/// registered listeners as a `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Where the failure happened.
    pub kind: FailureKind,
    /// The rendered error message.
    pub message: String,
}

impl Failure {
    pub(crate) fn new(kind: FailureKind, error: &LightError) -> Self {
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.kind, self.message)
    }
}
