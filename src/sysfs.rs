//! Linux sysfs backend.
//!
//! The flashlight is an LED-class device (`/sys/class/leds/<name>`) whose name
//! mentions `flash` or `torch`; the screen is the first backlight device under
//! `/sys/class/backlight`. Writing either needs permission on the attribute
//! files (usually a udev rule or membership in the `video` group).

use crate::error::LightError;
use crate::hardware::{Camera, Display, FlashHardware};
use crate::state::{Brightness, FlashMode};

use log::{debug, trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of LED devices.
pub const LEDS_DIR: &str = "/sys/class/leds";

/// Location of backlight devices.
pub const BACKLIGHT_DIR: &str = "/sys/class/backlight";

const FILE_BRIGHTNESS: &str = "brightness";
const FILE_MAX_BRIGHTNESS: &str = "max_brightness";

/// Substrings that mark an LED as a camera flash.
const FLASH_NAME_HINTS: [&str; 2] = ["flash", "torch"];

fn read_u32(dir: &Path, attribute: &'static str) -> Result<u32, LightError> {
    let raw = fs::read_to_string(dir.join(attribute))?;
    trace!("read {}/{} = {:?}", dir.display(), attribute, raw.trim());
    raw.trim().parse().map_err(|_| LightError::InvalidValue {
        attribute,
        value: raw.trim().to_string(),
    })
}

fn write_u32(dir: &Path, attribute: &'static str, value: u32) -> Result<(), LightError> {
    trace!("write {}/{} = {}", dir.display(), attribute, value);
    fs::write(dir.join(attribute), value.to_string())?;
    Ok(())
}

fn sorted_entries(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(dir) => dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            debug!("cannot list {}: {}", root.display(), e);
            return Vec::new();
        }
    };
    entries.sort();
    entries
}

// =============================================================================
// Flash
// =============================================================================

/// A flash LED exposed through the sysfs LED class.
#[derive(Debug, Clone)]
pub struct SysfsFlash {
    device: Option<PathBuf>,
}

impl SysfsFlash {
    /// Look for a flash LED under [`LEDS_DIR`].
    pub fn discover() -> Self {
        Self::discover_in(LEDS_DIR)
    }

    /// Look for a flash LED under `root`.
    ///
    /// Finding nothing is not an error: the result simply reports no
    /// flashlight.
    pub fn discover_in(root: impl AsRef<Path>) -> Self {
        let device = sorted_entries(root.as_ref()).into_iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_ascii_lowercase())
                .is_some_and(|name| FLASH_NAME_HINTS.iter().any(|hint| name.contains(hint)))
        });
        match &device {
            Some(path) => debug!("found flash LED at {}", path.display()),
            None => debug!("no flash LED under {}", root.as_ref().display()),
        }
        Self { device }
    }

    /// Use the LED named `name` under `root`.
    ///
    /// # Errors
    ///
    /// [`LightError::DeviceNotFound`] if the device has no `brightness`
    /// attribute.
    pub fn open_in(root: impl AsRef<Path>, name: &str) -> Result<Self, LightError> {
        let path = root.as_ref().join(name);
        if !path.join(FILE_BRIGHTNESS).is_file() {
            return Err(LightError::DeviceNotFound { class: "leds" });
        }
        Ok(Self { device: Some(path) })
    }

    /// The device directory, if one was found.
    pub fn device(&self) -> Option<&Path> {
        self.device.as_deref()
    }
}

impl FlashHardware for SysfsFlash {
    fn has_flashlight(&self) -> bool {
        self.device
            .as_ref()
            .is_some_and(|dir| dir.join(FILE_BRIGHTNESS).is_file())
    }

    fn open_camera(&mut self) -> Result<Box<dyn Camera>, LightError> {
        let dir = self
            .device
            .clone()
            .ok_or(LightError::DeviceNotFound { class: "leds" })?;
        let max = read_u32(&dir, FILE_MAX_BRIGHTNESS)?;
        debug!("opened flash LED {} (max {})", dir.display(), max);
        Ok(Box::new(SysfsTorch { dir, max }))
    }
}

/// Open handle on a flash LED. There is no preview stream: the LED is driven
/// directly through its `brightness` attribute.
struct SysfsTorch {
    dir: PathBuf,
    max: u32,
}

impl Camera for SysfsTorch {
    fn bind_preview(&mut self) -> Result<(), LightError> {
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), LightError> {
        Ok(())
    }

    fn flash_mode(&self) -> Result<FlashMode, LightError> {
        let value = read_u32(&self.dir, FILE_BRIGHTNESS)
            .map_err(|e| LightError::FlashMode(e.to_string()))?;
        Ok(if value > 0 {
            FlashMode::Torch
        } else {
            FlashMode::Off
        })
    }

    fn set_flash_mode(&mut self, mode: FlashMode) -> Result<(), LightError> {
        let value = match mode {
            FlashMode::Torch => self.max,
            FlashMode::Off => 0,
        };
        write_u32(&self.dir, FILE_BRIGHTNESS, value)
            .map_err(|e| LightError::FlashMode(e.to_string()))
    }

    fn release(&mut self) {
        if let Err(e) = write_u32(&self.dir, FILE_BRIGHTNESS, 0) {
            warn!("failed to switch off {} on release: {}", self.dir.display(), e);
        }
    }
}

// =============================================================================
// Backlight
// =============================================================================

/// A display backlight exposed through sysfs.
#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    dir: PathBuf,
    max: u32,
    initial: u32,
}

impl SysfsBacklight {
    /// Open the first backlight under [`BACKLIGHT_DIR`].
    pub fn open() -> Result<Self, LightError> {
        Self::open_in(BACKLIGHT_DIR, None)
    }

    /// Open the backlight `name` under `root`, or the first one if `name` is
    /// `None`.
    ///
    /// The brightness read here is what clearing the override restores.
    ///
    /// # Errors
    ///
    /// - [`LightError::DeviceNotFound`] if no backlight matches
    /// - [`LightError::Io`] / [`LightError::InvalidValue`] if its attributes
    ///   cannot be read
    pub fn open_in(root: impl AsRef<Path>, name: Option<&str>) -> Result<Self, LightError> {
        let root = root.as_ref();
        let dir = match name {
            Some(name) => Some(root.join(name)).filter(|dir| dir.is_dir()),
            None => sorted_entries(root).into_iter().next(),
        }
        .ok_or(LightError::DeviceNotFound { class: "backlight" })?;

        let max = read_u32(&dir, FILE_MAX_BRIGHTNESS)?;
        let initial = read_u32(&dir, FILE_BRIGHTNESS)?;
        debug!(
            "opened backlight {} (brightness {}/{})",
            dir.display(),
            initial,
            max
        );
        Ok(Self { dir, max, initial })
    }

    /// The device directory.
    pub fn device(&self) -> &Path {
        &self.dir
    }

    /// Convert a 0.0-1.0 fraction to a raw value on this device's scale.
    pub fn fraction_to_raw(&self, fraction: f32) -> u32 {
        (fraction.clamp(0.0, 1.0) * self.max as f32).round() as u32
    }
}

impl Display for SysfsBacklight {
    fn ambient_brightness(&self) -> Result<Brightness, LightError> {
        let raw = read_u32(&self.dir, FILE_BRIGHTNESS)
            .map_err(|e| LightError::AmbientBrightness(e.to_string()))?;
        Ok(Brightness::new(raw, self.max))
    }

    fn apply_brightness(&mut self, fraction: Option<f32>) -> Result<(), LightError> {
        let raw = match fraction {
            Some(fraction) => self.fraction_to_raw(fraction),
            None => self.initial,
        };
        write_u32(&self.dir, FILE_BRIGHTNESS, raw).map_err(|e| LightError::Brightness(e.to_string()))
    }
}
