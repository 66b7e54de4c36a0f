//! Flashlight and screen-light controller.
//!
//! This crate turns a device into a makeshift light source: it switches the
//! camera flash LED into torch mode and/or pushes the screen to full
//! brightness, then puts the display back the way it found it when the host
//! stops.
//!
//! The [`LightController`] holds all state. Hardware is reached through two
//! traits, [`FlashHardware`] and [`Display`], with two implementations
//! shipped here:
//!
//! - [`SysfsFlash`] / [`SysfsBacklight`] for Linux LED and backlight devices
//! - [`MockHardware`] for tests
//!
//! # Example
//!
//! ```no_run
//! use torchlet_core::{ControlLayout, LightConfig, LightController, SysfsBacklight, SysfsFlash};
//!
//! fn main() -> Result<(), torchlet_core::LightError> {
//!     let config = LightConfig::new().with_layout(ControlLayout::Dual);
//!     let mut controller = LightController::create(
//!         config,
//!         Box::new(SysfsFlash::discover()),
//!         Box::new(SysfsBacklight::open()?),
//!     );
//!
//!     // Tap on the flashlight control
//!     controller.toggle_flash_light();
//!
//!     // Tap on the screen-light control
//!     controller.toggle_screen_light()?;
//!
//!     // Host is going away: restore brightness, maybe release the LED
//!     controller.on_stop();
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockHardware`] to test code without hardware:
//!
//! ```
//! use torchlet_core::{LightConfig, LightController, MockHardware};
//!
//! let hw = MockHardware::new();
//! let mut controller =
//!     LightController::create(LightConfig::new(), Box::new(hw.clone()), Box::new(hw.clone()));
//! controller.toggle_flash_light();
//! assert!(hw.torch_lit());
//! ```

#![warn(missing_docs)]

mod config;
mod controller;
mod error;
mod events;
mod hardware;
mod mock;
mod state;
mod sysfs;

// Re-export public API
pub use config::{ControlLayout, LightConfig, ParseLayoutError};
pub use controller::{LightController, MAX_BRIGHTNESS};
pub use error::{Failure, FailureKind, LightError};
pub use events::{LightEvent, ListenerId};
pub use hardware::{Camera, CameraSession, Display, FlashHardware, TORCH_PERSIST_MIN_LEVEL};
pub use mock::{MockHardware, MockRecord};
pub use state::{Affordance, Brightness, ColorScheme, Controls, FlashMode, Label, LightState};
pub use sysfs::{BACKLIGHT_DIR, LEDS_DIR, SysfsBacklight, SysfsFlash};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn controller(layout: ControlLayout, hw: &MockHardware) -> LightController {
        let _ = env_logger::builder().is_test(true).try_init();
        LightController::create(
            LightConfig::new().with_layout(layout),
            Box::new(hw.clone()),
            Box::new(hw.clone()),
        )
    }

    fn record_events(controller: &mut LightController) -> Arc<Mutex<Vec<LightEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        controller.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_toggle_parity() {
        for has_flash in [true, false] {
            let hw = if has_flash {
                MockHardware::new()
            } else {
                MockHardware::new().without_flashlight()
            };
            let mut controller = controller(ControlLayout::Single, &hw);

            for calls in 1..=7 {
                controller.toggle_flash_light();
                assert_eq!(controller.state().flash_on, calls % 2 == 1);
            }
        }
    }

    #[test]
    fn test_fresh_start_with_flashlight() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.toggle_flash_light();

        let record = hw.record();
        assert_eq!(record.opens, 1);
        assert!(record.camera_open);
        assert!(record.preview_bound);
        assert!(record.preview_started);
        assert_eq!(record.flash_mode, FlashMode::Torch);

        let state = controller.state();
        assert!(state.flash_on);
        assert!(state.torch_lit);
        assert!(state.camera_acquired);
        assert_eq!(state.flash_affordance, Affordance::ON);
        assert_eq!(state.brightness, Some(1.0));
        assert_eq!(hw.last_brightness(), Some(Some(1.0)));
    }

    #[test]
    fn test_fresh_start_without_flashlight() {
        let hw = MockHardware::new().without_flashlight();
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.toggle_flash_light();

        let record = hw.record();
        assert_eq!(record.opens, 0);
        assert!(!record.camera_open);
        assert_eq!(record.flash_mode, FlashMode::Off);

        let state = controller.state();
        assert!(state.flash_on);
        assert!(!state.torch_lit);
        assert!(!state.camera_acquired);
        assert_eq!(state.flash_affordance.label, Label::On);
        assert_eq!(state.brightness, Some(1.0));
    }

    #[test]
    fn test_turn_off_never_leaves_torch() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.turn_off_flash_light();
        assert_ne!(hw.flash_mode(), FlashMode::Torch);

        controller.turn_on_flash_light();
        controller.turn_on_flash_light();
        assert_eq!(hw.flash_mode(), FlashMode::Torch);
        assert_eq!(hw.record().opens, 1);

        controller.turn_off_flash_light();
        assert_eq!(hw.flash_mode(), FlashMode::Off);
        assert_eq!(controller.state().flash_affordance, Affordance::OFF);
        // The camera stays open until stop.
        assert!(hw.record().camera_open);
    }

    #[test]
    fn test_brightness_restores_startup_fraction() {
        let hw = MockHardware::new().with_ambient(Brightness::new(51, 255));
        let mut controller = controller(ControlLayout::Single, &hw);
        assert_eq!(controller.previous_brightness(), Some(20));

        controller.set_brightness(100);
        assert_eq!(hw.last_brightness(), Some(Some(1.0)));

        let p = controller.previous_brightness().unwrap();
        controller.set_brightness(p);
        assert_eq!(hw.last_brightness(), Some(Some(0.2)));

        controller.set_brightness(250);
        assert_eq!(hw.last_brightness(), Some(Some(1.0)));
    }

    #[test]
    fn test_single_layout_flash_off_restores_brightness() {
        let hw = MockHardware::new().with_ambient(Brightness::new(255, 255));
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.turn_on_flash_light();
        controller.set_brightness(30);
        controller.turn_off_flash_light();
        assert_eq!(controller.state().brightness, Some(1.0));
    }

    #[test]
    fn test_missing_ambient_brightness_clears_override() {
        let hw = MockHardware::new().without_ambient();
        let mut controller = controller(ControlLayout::Single, &hw);
        assert_eq!(controller.previous_brightness(), None);

        controller.toggle_flash_light();
        assert_eq!(controller.state().brightness, Some(1.0));

        controller.toggle_flash_light();
        assert_eq!(controller.state().brightness, None);
        assert_eq!(hw.last_brightness(), Some(None));
    }

    #[test]
    fn test_stop_below_threshold_forces_off() {
        let hw = MockHardware::new().with_platform_level(TORCH_PERSIST_MIN_LEVEL - 1);
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.toggle_flash_light();
        assert!(hw.torch_lit());

        controller.on_stop();

        let record = hw.record();
        assert_eq!(record.flash_mode, FlashMode::Off);
        assert!(!record.camera_open);
        assert_eq!(record.releases, 1);
        assert!(!controller.state().flash_on);
        assert!(!controller.state().camera_acquired);
    }

    #[test]
    fn test_stop_keeps_torch_when_supported() {
        let hw = MockHardware::new().with_platform_level(TORCH_PERSIST_MIN_LEVEL);
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.toggle_flash_light();
        controller.on_stop();

        assert!(hw.torch_lit());
        assert_eq!(hw.record().releases, 0);
        assert!(controller.state().flash_on);
        // Brightness still goes back to ambient.
        assert_eq!(hw.last_brightness(), Some(Some(0.5)));

        // Dropping the controller releases the camera.
        drop(controller);
        assert_eq!(hw.record().releases, 1);
        assert!(!hw.torch_lit());
    }

    #[test]
    fn test_stop_with_flash_off_releases_camera() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);

        controller.toggle_flash_light();
        controller.toggle_flash_light();
        controller.on_stop();

        assert_eq!(hw.record().releases, 1);
        assert!(!controller.state().camera_acquired);

        // Reacquired lazily after a restart.
        controller.toggle_flash_light();
        assert_eq!(hw.record().opens, 2);
        assert!(hw.torch_lit());
    }

    #[test]
    fn test_dual_screen_light_leaves_camera_alone() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Dual, &hw);

        controller.toggle_screen_light().unwrap();

        let state = controller.state();
        assert!(state.screen_on);
        assert!(!state.flash_on);
        assert_eq!(state.screen_affordance, Affordance::ON);
        assert_eq!(state.brightness, Some(1.0));
        assert_eq!(hw.record().opens, 0);

        controller.toggle_screen_light().unwrap();
        let state = controller.state();
        assert!(!state.screen_on);
        assert_eq!(state.screen_affordance.scheme, ColorScheme::Dark);
        assert_eq!(state.brightness, Some(0.5));
        assert_eq!(hw.record().opens, 0);
    }

    #[test]
    fn test_dual_stop_turns_screen_light_off() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Dual, &hw);

        controller.turn_on_screen_light().unwrap();
        assert_eq!(hw.last_brightness(), Some(Some(1.0)));

        controller.on_stop();

        let state = controller.state();
        assert!(!state.screen_on);
        assert_eq!(state.screen_affordance, Affordance::OFF);
        assert_eq!(state.brightness, Some(0.5));
        assert_eq!(hw.last_brightness(), Some(Some(0.5)));

        let record = hw.record();
        assert_eq!(record.opens, 0);
        assert_eq!(record.releases, 0);
        assert_eq!(record.flash_mode, FlashMode::Off);
    }

    #[test]
    fn test_dual_flash_does_not_touch_brightness() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Dual, &hw);

        controller.toggle_flash_light();
        assert!(hw.torch_lit());
        assert!(hw.record().brightness_history.is_empty());

        controller.toggle_screen_light().unwrap();
        controller.toggle_flash_light();
        assert!(!hw.torch_lit());
        assert!(controller.state().screen_on);
        assert_eq!(controller.state().brightness, Some(1.0));
    }

    #[test]
    fn test_single_layout_has_no_screen_light() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);

        assert!(matches!(
            controller.toggle_screen_light(),
            Err(LightError::ScreenLightUnavailable)
        ));
        assert!(!controller.state().screen_on);
    }

    #[test]
    fn test_visible_controls() {
        let with_flash = MockHardware::new();
        let without_flash = MockHardware::new().without_flashlight();

        let single = controller(ControlLayout::Single, &without_flash);
        assert_eq!(
            single.visible_controls(),
            Controls {
                flashlight: true,
                screen_light: false
            }
        );

        let dual = controller(ControlLayout::Dual, &with_flash);
        assert!(dual.visible_controls().flashlight);
        assert!(dual.visible_controls().screen_light);

        let dual = controller(ControlLayout::Dual, &without_flash);
        assert!(!dual.visible_controls().flashlight);
        assert!(dual.visible_controls().screen_light);
    }

    #[test]
    fn test_preview_bind_failure_still_lights_torch() {
        let hw = MockHardware::new().failing_preview_bind();
        let mut controller = controller(ControlLayout::Single, &hw);
        let events = record_events(&mut controller);

        controller.toggle_flash_light();

        assert!(hw.torch_lit());
        assert!(hw.record().preview_started);
        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            LightEvent::Failed(Failure {
                kind: FailureKind::PreviewBinding,
                ..
            })
        )));
    }

    #[test]
    fn test_camera_open_failure_is_reported() {
        let hw = MockHardware::new().failing_open();
        let mut controller = controller(ControlLayout::Single, &hw);
        let events = record_events(&mut controller);

        controller.toggle_flash_light();

        assert!(!hw.torch_lit());
        let state = controller.state();
        assert!(state.flash_on);
        assert!(!state.camera_acquired);
        let events = events.lock().unwrap();
        assert!(matches!(
            events.first(),
            Some(LightEvent::Failed(Failure {
                kind: FailureKind::CameraOpen,
                ..
            }))
        ));
        assert!(matches!(events.last(), Some(LightEvent::Changed(s)) if s.flash_on));
    }

    #[test]
    fn test_brightness_failure_keeps_previous_override() {
        let hw = MockHardware::new().failing_brightness();
        let mut controller = controller(ControlLayout::Single, &hw);
        let events = record_events(&mut controller);

        controller.set_brightness(80);

        assert_eq!(controller.state().brightness, None);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            LightEvent::Failed(failure) if failure.kind == FailureKind::Brightness
        ));
    }

    #[test]
    fn test_listeners_see_changes_once() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);
        let events = record_events(&mut controller);

        controller.toggle_flash_light();
        controller.turn_on_flash_light();
        controller.turn_off_flash_light();
        controller.turn_off_flash_light();

        let events = events.lock().unwrap();
        let flash: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                LightEvent::Changed(state) => Some(state.flash_on),
                LightEvent::Failed(_) => None,
            })
            .collect();
        assert_eq!(flash, vec![true, false]);
    }

    #[test]
    fn test_unsubscribe() {
        let hw = MockHardware::new();
        let mut controller = controller(ControlLayout::Single, &hw);
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = controller.subscribe(move |_| *sink.lock().unwrap() += 1);

        controller.toggle_flash_light();
        assert!(controller.unsubscribe(id));
        assert!(!controller.unsubscribe(id));
        controller.toggle_flash_light();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_brightness_to_percent() {
        assert_eq!(Brightness::new(0, 255).to_percent(), 0);
        assert_eq!(Brightness::new(255, 255).to_percent(), 100);
        assert_eq!(Brightness::new(128, 255).to_percent(), 50);
        assert_eq!(Brightness::new(900, 255).to_percent(), 100);
        assert_eq!(Brightness::new(5, 0).to_percent(), 0);
    }

    #[test]
    fn test_restore_keeps_fine_ambient_reading() {
        let hw = MockHardware::new().with_ambient(Brightness::new(500, 120_000));
        let mut controller = controller(ControlLayout::Single, &hw);
        assert_eq!(controller.previous_brightness(), Some(0));
        assert_eq!(
            controller.ambient_brightness(),
            Some(Brightness::new(500, 120_000))
        );

        controller.toggle_flash_light();
        controller.on_stop();

        let restored = hw.last_brightness().flatten().unwrap();
        assert_eq!(restored, 500.0 / 120_000.0);
        assert!(restored > 0.0);
    }

    #[test]
    fn test_brightness_to_fraction() {
        assert_eq!(Brightness::new(128, 256).to_fraction(), 0.5);
        assert_eq!(Brightness::new(300, 200).to_fraction(), 1.0);
        assert_eq!(Brightness::new(5, 0).to_fraction(), 0.0);
    }

    #[test]
    fn test_layout_parsing() {
        assert_eq!("single".parse::<ControlLayout>(), Ok(ControlLayout::Single));
        assert_eq!(" Dual ".parse::<ControlLayout>(), Ok(ControlLayout::Dual));
        assert!("triple".parse::<ControlLayout>().is_err());
        assert_eq!(ControlLayout::Dual.to_string(), "dual");
    }
}
