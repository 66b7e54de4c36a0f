//! Hardware seams used by the light controller.
//!
//! The controller never touches devices directly. It drives a
//! [`FlashHardware`] (capability query and camera access) and a [`Display`]
//! (brightness), so it can run against real devices or a
//! [`MockHardware`](crate::MockHardware).

use crate::error::LightError;
use crate::state::{Brightness, FlashMode};

use log::{debug, warn};

/// Lowest platform level on which a lit torch may outlive a stopped host.
///
/// Below it, the torch is forced off and the camera released on stop.
pub const TORCH_PERSIST_MIN_LEVEL: u32 = 14;

/// Access to the device's flash-capable camera.
pub trait FlashHardware: Send {
    /// Whether the device reports a camera flash.
    fn has_flashlight(&self) -> bool;

    /// Platform level, compared against [`TORCH_PERSIST_MIN_LEVEL`].
    ///
    /// Backends without such a notion keep the default, which lets the torch
    /// persist.
    fn platform_level(&self) -> u32 {
        u32::MAX
    }

    /// Open a handle to the camera.
    fn open_camera(&mut self) -> Result<Box<dyn Camera>, LightError>;
}

/// An open camera handle.
pub trait Camera: Send {
    /// Bind the camera to its preview surface.
    fn bind_preview(&mut self) -> Result<(), LightError>;

    /// Start the preview stream.
    fn start_preview(&mut self) -> Result<(), LightError>;

    /// Read the current flash mode.
    fn flash_mode(&self) -> Result<FlashMode, LightError>;

    /// Set the flash mode.
    fn set_flash_mode(&mut self, mode: FlashMode) -> Result<(), LightError>;

    /// Release the device. Called exactly once by [`CameraSession`].
    fn release(&mut self);
}

/// Display brightness control.
pub trait Display: Send {
    /// Read the system-wide brightness in effect before any override.
    fn ambient_brightness(&self) -> Result<Brightness, LightError>;

    /// Apply a brightness override as a 0.0-1.0 fraction, or clear it with
    /// `None`.
    fn apply_brightness(&mut self, fraction: Option<f32>) -> Result<(), LightError>;
}

/// Scoped ownership of an open camera.
///
/// The camera is released once, either by [`CameraSession::release`] or when
/// the session is dropped.
pub struct CameraSession {
    camera: Option<Box<dyn Camera>>,
}

impl CameraSession {
    /// Wrap an open camera.
    pub fn new(camera: Box<dyn Camera>) -> Self {
        Self {
            camera: Some(camera),
        }
    }

    /// Whether the underlying camera is still held.
    pub fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    /// Read the flash mode, or `Off` if the camera was already released.
    pub fn flash_mode(&self) -> Result<FlashMode, LightError> {
        match &self.camera {
            Some(camera) => camera.flash_mode(),
            None => Ok(FlashMode::Off),
        }
    }

    /// Set the flash mode on the held camera.
    pub fn set_flash_mode(&mut self, mode: FlashMode) -> Result<(), LightError> {
        match self.camera.as_mut() {
            Some(camera) => camera.set_flash_mode(mode),
            None => Err(LightError::CameraUnavailable("camera already released".into())),
        }
    }

    /// Mutable access to the held camera.
    pub fn camera_mut(&mut self) -> Option<&mut (dyn Camera + 'static)> {
        self.camera.as_deref_mut()
    }

    /// Release the camera. Further calls are no-ops.
    pub fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            debug!("releasing camera");
            camera.release();
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if self.camera.is_some() {
            warn!("camera session dropped while open, releasing");
            self.release();
        }
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("open", &self.is_open())
            .finish()
    }
}
