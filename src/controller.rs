//! The light controller.

use crate::config::{ControlLayout, LightConfig};
use crate::error::{Failure, FailureKind, LightError};
use crate::events::{LightEvent, ListenerId, Listeners};
use crate::hardware::{CameraSession, Display, FlashHardware, TORCH_PERSIST_MIN_LEVEL};
use crate::state::{Affordance, Brightness, Controls, FlashMode, LightState};

use log::{debug, info, trace, warn};

/// Full brightness, in percent.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Coordinates the flashlight and the screen light.
///
/// The controller owns the flash hardware, the display and all toggle state.
/// Hosts forward taps to the `toggle_*` methods and lifecycle events to
/// [`LightController::create`] and [`LightController::on_stop`], then render
/// the [`LightState`] they get back from [`LightController::state`] or from a
/// listener.
///
/// Hardware errors never abort an operation. They are logged and delivered
/// to listeners as [`LightEvent::Failed`].
///
/// # Example
///
/// ```
/// use torchlet_core::{LightConfig, LightController, MockHardware};
///
/// let hw = MockHardware::new();
/// let mut controller =
///     LightController::create(LightConfig::new(), Box::new(hw.clone()), Box::new(hw.clone()));
///
/// controller.toggle_flash_light();
/// assert!(controller.state().flash_on);
/// assert!(hw.torch_lit());
///
/// controller.on_stop();
/// ```
pub struct LightController {
    config: LightConfig,
    flash: Box<dyn FlashHardware>,
    display: Box<dyn Display>,
    camera: Option<CameraSession>,
    ambient: Option<Brightness>,
    brightness: Option<f32>,
    flash_on: bool,
    screen_on: bool,
    flash_affordance: Affordance,
    screen_affordance: Affordance,
    listeners: Listeners,
}

impl LightController {
    /// Create a controller. This is the host's creation step.
    ///
    /// The ambient display brightness is read once here and kept as the
    /// restore target. If the read fails the error is logged and
    /// [`LightController::previous_brightness`] stays `None`.
    pub fn create(
        config: LightConfig,
        flash: Box<dyn FlashHardware>,
        display: Box<dyn Display>,
    ) -> Self {
        let ambient = match display.ambient_brightness() {
            Ok(reading) => {
                debug!(
                    "ambient brightness {}/{} ({}%)",
                    reading.raw,
                    reading.max,
                    reading.to_percent()
                );
                Some(reading)
            }
            Err(e) => {
                warn!("{} failed: {}", FailureKind::AmbientBrightness, e);
                None
            }
        };

        info!(
            "light controller created (layout={}, flashlight={})",
            config.layout,
            flash.has_flashlight()
        );

        Self {
            config,
            flash,
            display,
            camera: None,
            ambient,
            brightness: None,
            flash_on: false,
            screen_on: false,
            flash_affordance: Affordance::OFF,
            screen_affordance: Affordance::OFF,
            listeners: Listeners::default(),
        }
    }

    /// The configuration this controller was created with.
    pub fn config(&self) -> LightConfig {
        self.config
    }

    /// Whether the device reports a camera flash.
    pub fn device_has_flashlight(&self) -> bool {
        self.flash.has_flashlight()
    }

    /// The ambient brightness captured at creation (0-100).
    pub fn previous_brightness(&self) -> Option<u8> {
        self.ambient.map(Brightness::to_percent)
    }

    /// The raw ambient reading captured at creation. Restores apply exactly
    /// this value.
    pub fn ambient_brightness(&self) -> Option<Brightness> {
        self.ambient
    }

    /// Whether a camera session is held and its flash is in torch mode.
    pub fn torch_lit(&self) -> bool {
        self.camera
            .as_ref()
            .is_some_and(|session| matches!(session.flash_mode(), Ok(FlashMode::Torch)))
    }

    /// Which tap targets the host should show.
    ///
    /// The single layout always has its one combined control. The dual
    /// layout hides the flashlight control on devices without a flash.
    pub fn visible_controls(&self) -> Controls {
        match self.config.layout {
            ControlLayout::Single => Controls {
                flashlight: true,
                screen_light: false,
            },
            ControlLayout::Dual => Controls {
                flashlight: self.device_has_flashlight(),
                screen_light: true,
            },
        }
    }

    /// Take a snapshot of the current state.
    pub fn state(&self) -> LightState {
        LightState {
            flash_on: self.flash_on,
            screen_on: self.screen_on,
            torch_lit: self.torch_lit(),
            camera_acquired: self.camera.as_ref().is_some_and(CameraSession::is_open),
            previous_brightness: self.previous_brightness(),
            brightness: self.brightness,
            flash_affordance: self.flash_affordance,
            screen_affordance: self.screen_affordance,
        }
    }

    /// Register a listener for state changes and recovered failures.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LightEvent) + Send + 'static,
    {
        let id = self.listeners.add(Box::new(listener));
        debug!("listener {:?} subscribed ({} total)", id, self.listeners.len());
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Apply a brightness override of `level / 100`.
    ///
    /// Levels above 100 are clamped.
    pub fn set_brightness(&mut self, level: u8) {
        let before = self.state();
        self.apply_brightness(level);
        self.notify(before);
    }

    /// Switch the flashlight to the opposite of its current state.
    pub fn toggle_flash_light(&mut self) {
        if self.flash_on {
            self.turn_off_flash_light();
        } else {
            self.turn_on_flash_light();
        }
    }

    /// Turn the flashlight on.
    ///
    /// The flash is first reset to off. If the device has a flashlight the
    /// camera is opened on first use and its flash set to torch. The control
    /// switches to its lit rendering and, in the single layout, the screen
    /// goes to full brightness.
    ///
    /// The flashlight is recorded as on even when the device has no flash;
    /// see [`LightState::torch_lit`] for the hardware view.
    pub fn turn_on_flash_light(&mut self) {
        let before = self.state();
        self.switch_flash_off();

        if self.device_has_flashlight() {
            if self.camera.is_none() {
                self.acquire_camera();
            }
            let result = self
                .camera
                .as_mut()
                .map(|session| session.set_flash_mode(FlashMode::Torch));
            if let Some(Err(e)) = result {
                self.fail(FailureKind::FlashMode, &e);
            }
        } else {
            debug!("no flashlight on this device, lighting the screen only");
        }

        self.flash_affordance = Affordance::ON;
        if self.config.layout == ControlLayout::Single {
            self.apply_brightness(MAX_BRIGHTNESS);
        }
        self.flash_on = true;
        debug!("flashlight on (torch lit: {})", self.torch_lit());

        self.notify(before);
    }

    /// Turn the flashlight off.
    ///
    /// A lit torch is switched off; the camera stays open. In the single
    /// layout the screen goes back to the ambient brightness.
    pub fn turn_off_flash_light(&mut self) {
        let before = self.state();
        self.switch_flash_off();
        debug!("flashlight off");
        self.notify(before);
    }

    /// Switch the screen light to the opposite of its current state.
    ///
    /// # Errors
    ///
    /// [`LightError::ScreenLightUnavailable`] in the single layout.
    pub fn toggle_screen_light(&mut self) -> Result<(), LightError> {
        if self.screen_on {
            self.turn_off_screen_light()
        } else {
            self.turn_on_screen_light()
        }
    }

    /// Light the screen: full brightness and the bright color scheme.
    ///
    /// # Errors
    ///
    /// [`LightError::ScreenLightUnavailable`] in the single layout.
    pub fn turn_on_screen_light(&mut self) -> Result<(), LightError> {
        self.require_screen_light()?;
        let before = self.state();

        self.apply_brightness(MAX_BRIGHTNESS);
        self.screen_affordance = Affordance::ON;
        self.screen_on = true;
        debug!("screen light on");

        self.notify(before);
        Ok(())
    }

    /// Restore the ambient brightness and the dark color scheme.
    ///
    /// # Errors
    ///
    /// [`LightError::ScreenLightUnavailable`] in the single layout.
    pub fn turn_off_screen_light(&mut self) -> Result<(), LightError> {
        self.require_screen_light()?;
        let before = self.state();

        self.restore_brightness();
        self.screen_affordance = Affordance::OFF;
        self.screen_on = false;
        debug!("screen light off");

        self.notify(before);
        Ok(())
    }

    /// The host's stop step.
    ///
    /// Restores the ambient brightness. If the torch may not outlive the host
    /// on this platform, or the flashlight is off anyway, the flash is forced
    /// off and the camera released. Otherwise a lit torch stays lit.
    pub fn on_stop(&mut self) {
        let before = self.state();
        info!("stopping light controller");

        self.restore_brightness();
        if self.screen_on {
            self.screen_affordance = Affordance::OFF;
            self.screen_on = false;
        }

        let level = self.flash.platform_level();
        if level < TORCH_PERSIST_MIN_LEVEL || !self.flash_on {
            debug!("tearing down flashlight (platform level {})", level);
            self.switch_flash_off();
            self.release_camera();
        } else {
            info!("keeping torch lit after stop");
        }

        self.notify(before);
    }

    fn require_screen_light(&self) -> Result<(), LightError> {
        if self.config.layout.has_screen_light() {
            Ok(())
        } else {
            Err(LightError::ScreenLightUnavailable)
        }
    }

    fn acquire_camera(&mut self) {
        let camera = match self.flash.open_camera() {
            Ok(camera) => camera,
            Err(e) => {
                self.fail(FailureKind::CameraOpen, &e);
                return;
            }
        };
        info!("camera opened");

        let mut session = CameraSession::new(camera);
        if let Some(camera) = session.camera_mut() {
            // A failed binding still lets the flash mode be attempted.
            if let Err(e) = camera.bind_preview() {
                self.fail(FailureKind::PreviewBinding, &e);
            }
            if let Err(e) = camera.start_preview() {
                self.fail(FailureKind::PreviewStart, &e);
            }
        }
        self.camera = Some(session);
    }

    fn release_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.release();
            info!("camera released");
        }
    }

    fn switch_flash_off(&mut self) {
        let mode = self.camera.as_ref().map(CameraSession::flash_mode);
        match mode {
            Some(Ok(FlashMode::Torch)) => {
                let result = self
                    .camera
                    .as_mut()
                    .map(|session| session.set_flash_mode(FlashMode::Off));
                if let Some(Err(e)) = result {
                    self.fail(FailureKind::FlashMode, &e);
                }
            }
            Some(Err(e)) => self.fail(FailureKind::FlashMode, &e),
            Some(Ok(FlashMode::Off)) | None => {}
        }

        self.flash_affordance = Affordance::OFF;
        if self.config.layout == ControlLayout::Single {
            self.restore_brightness();
        }
        self.flash_on = false;
    }

    fn apply_brightness(&mut self, level: u8) {
        let level = level.min(MAX_BRIGHTNESS);
        self.apply_fraction(f32::from(level) / 100.0);
    }

    fn apply_fraction(&mut self, fraction: f32) {
        trace!("applying brightness {}", fraction);
        match self.display.apply_brightness(Some(fraction)) {
            Ok(()) => self.brightness = Some(fraction),
            Err(e) => self.fail(FailureKind::Brightness, &e),
        }
    }

    fn restore_brightness(&mut self) {
        match self.ambient {
            Some(reading) => self.apply_fraction(reading.to_fraction()),
            None => {
                trace!("no ambient brightness recorded, clearing override");
                match self.display.apply_brightness(None) {
                    Ok(()) => self.brightness = None,
                    Err(e) => self.fail(FailureKind::Brightness, &e),
                }
            }
        }
    }

    fn fail(&mut self, kind: FailureKind, error: &LightError) {
        warn!("{} failed: {}", kind, error);
        self.listeners
            .emit(&LightEvent::Failed(Failure::new(kind, error)));
    }

    fn notify(&mut self, before: LightState) {
        let after = self.state();
        if after != before {
            self.listeners.emit(&LightEvent::Changed(after));
        }
    }
}
