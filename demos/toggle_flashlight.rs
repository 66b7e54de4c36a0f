//! Example: Toggle the flashlight on/off.
//!
//! Run with: `cargo run --example toggle_flashlight`
//!
//! Needs write access to the LED and backlight attributes under `/sys/class`.

use std::thread;
use std::time::Duration;

use torchlet_core::{LightConfig, LightController, LightError, LightEvent, SysfsBacklight, SysfsFlash};

fn main() -> Result<(), LightError> {
    // Initialize logging (optional)
    env_logger::init();

    let flash = SysfsFlash::discover();
    let backlight = SysfsBacklight::open()?;
    println!(
        "Flash LED: {}",
        flash
            .device()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("Backlight: {}", backlight.device().display());

    // Create the controller
    let mut controller =
        LightController::create(LightConfig::new(), Box::new(flash), Box::new(backlight));

    controller.subscribe(|event| match event {
        LightEvent::Changed(state) => println!(
            "State: flash_on={}, torch_lit={}, brightness={:?}",
            state.flash_on, state.torch_lit, state.brightness
        ),
        LightEvent::Failed(failure) => eprintln!("Error: {}", failure),
    });

    // On for a few seconds, then off
    controller.toggle_flash_light();
    thread::sleep(Duration::from_secs(3));
    controller.toggle_flash_light();

    controller.on_stop();
    Ok(())
}
