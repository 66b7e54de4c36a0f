//! Mock hardware for testing.

use crate::error::LightError;
use crate::hardware::{Camera, Display, FlashHardware};
use crate::state::{Brightness, FlashMode};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the mock records about how it was driven.
#[derive(Debug, Clone)]
pub struct MockRecord {
    /// Whether the device reports a flash.
    pub has_flashlight: bool,
    /// Reported platform level.
    pub platform_level: u32,
    /// Ambient brightness, or `None` to make the read fail.
    pub ambient: Option<Brightness>,
    /// Make preview binding fail.
    pub fail_preview_bind: bool,
    /// Make opening the camera fail.
    pub fail_open: bool,
    /// Make brightness writes fail.
    pub fail_brightness: bool,
    /// Whether a camera handle is currently open.
    pub camera_open: bool,
    /// How many times the camera was opened.
    pub opens: u32,
    /// How many times the camera was released.
    pub releases: u32,
    /// Whether the preview was bound.
    pub preview_bound: bool,
    /// Whether the preview was started.
    pub preview_started: bool,
    /// The camera's flash mode.
    pub flash_mode: FlashMode,
    /// Every brightness override applied, in order.
    pub brightness_history: Vec<Option<f32>>,
}

impl Default for MockRecord {
    fn default() -> Self {
        Self {
            has_flashlight: true,
            platform_level: u32::MAX,
            ambient: Some(Brightness::new(128, 256)),
            fail_preview_bind: false,
            fail_open: false,
            fail_brightness: false,
            camera_open: false,
            opens: 0,
            releases: 0,
            preview_bound: false,
            preview_started: false,
            flash_mode: FlashMode::Off,
            brightness_history: Vec::new(),
        }
    }
}

/// Mock flash hardware and display.
///
/// Clones share one [`MockRecord`], so a test can hand one clone to a
/// [`LightController`](crate::LightController) and inspect another.
///
/// # Example
///
/// ```
/// use torchlet_core::{FlashHardware, MockHardware};
///
/// let hw = MockHardware::new().without_flashlight();
/// assert!(!hw.has_flashlight());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHardware {
    record: Arc<Mutex<MockRecord>>,
}

impl MockHardware {
    /// A device with a flashlight, a high platform level and ambient
    /// brightness 128/256.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with a custom initial record.
    pub fn with_record(record: MockRecord) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
        }
    }

    /// Report no flashlight.
    pub fn without_flashlight(self) -> Self {
        self.lock().has_flashlight = false;
        self
    }

    /// Report the given platform level.
    pub fn with_platform_level(self, level: u32) -> Self {
        self.lock().platform_level = level;
        self
    }

    /// Report the given ambient brightness.
    pub fn with_ambient(self, ambient: Brightness) -> Self {
        self.lock().ambient = Some(ambient);
        self
    }

    /// Make the ambient brightness read fail.
    pub fn without_ambient(self) -> Self {
        self.lock().ambient = None;
        self
    }

    /// Make preview binding fail.
    pub fn failing_preview_bind(self) -> Self {
        self.lock().fail_preview_bind = true;
        self
    }

    /// Make opening the camera fail.
    pub fn failing_open(self) -> Self {
        self.lock().fail_open = true;
        self
    }

    /// Make brightness writes fail.
    pub fn failing_brightness(self) -> Self {
        self.lock().fail_brightness = true;
        self
    }

    /// A copy of the current record.
    pub fn record(&self) -> MockRecord {
        self.lock().clone()
    }

    /// Current flash mode.
    pub fn flash_mode(&self) -> FlashMode {
        self.lock().flash_mode
    }

    /// Whether the LED is lit.
    pub fn torch_lit(&self) -> bool {
        self.flash_mode() == FlashMode::Torch
    }

    /// The last brightness override applied, if any was.
    pub fn last_brightness(&self) -> Option<Option<f32>> {
        self.lock().brightness_history.last().copied()
    }

    fn lock(&self) -> MutexGuard<'_, MockRecord> {
        self.record.lock().unwrap()
    }
}

impl FlashHardware for MockHardware {
    fn has_flashlight(&self) -> bool {
        self.lock().has_flashlight
    }

    fn platform_level(&self) -> u32 {
        self.lock().platform_level
    }

    fn open_camera(&mut self) -> Result<Box<dyn Camera>, LightError> {
        let mut record = self.lock();
        if record.fail_open {
            return Err(LightError::CameraUnavailable("mock camera busy".into()));
        }
        record.camera_open = true;
        record.opens += 1;
        drop(record);

        Ok(Box::new(MockCamera {
            record: Arc::clone(&self.record),
        }))
    }
}

impl Display for MockHardware {
    fn ambient_brightness(&self) -> Result<Brightness, LightError> {
        self.lock()
            .ambient
            .ok_or_else(|| LightError::AmbientBrightness("setting not found".into()))
    }

    fn apply_brightness(&mut self, fraction: Option<f32>) -> Result<(), LightError> {
        let mut record = self.lock();
        if record.fail_brightness {
            return Err(LightError::Brightness("mock display rejected write".into()));
        }
        record.brightness_history.push(fraction);
        Ok(())
    }
}

struct MockCamera {
    record: Arc<Mutex<MockRecord>>,
}

impl MockCamera {
    fn lock(&self) -> MutexGuard<'_, MockRecord> {
        self.record.lock().unwrap()
    }
}

impl Camera for MockCamera {
    fn bind_preview(&mut self) -> Result<(), LightError> {
        let mut record = self.lock();
        if record.fail_preview_bind {
            return Err(LightError::PreviewBinding("no preview surface".into()));
        }
        record.preview_bound = true;
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), LightError> {
        self.lock().preview_started = true;
        Ok(())
    }

    fn flash_mode(&self) -> Result<FlashMode, LightError> {
        Ok(self.lock().flash_mode)
    }

    fn set_flash_mode(&mut self, mode: FlashMode) -> Result<(), LightError> {
        self.lock().flash_mode = mode;
        Ok(())
    }

    fn release(&mut self) {
        let mut record = self.lock();
        record.camera_open = false;
        record.releases += 1;
        record.preview_bound = false;
        record.preview_started = false;
        // Closing the camera cuts power to the LED.
        record.flash_mode = FlashMode::Off;
    }
}
