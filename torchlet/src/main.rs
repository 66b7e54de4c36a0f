use std::sync::mpsc::{self, Receiver};

use iced::keyboard::{self, Event as KeyboardEvent, Key};
use iced::widget::{Column, container, mouse_area, text};
use iced::{Background, Color, Element, Length, Subscription, Task, Theme, window};
use log::{info, warn};
use torchlet_core::{
    BACKLIGHT_DIR, Brightness, ColorScheme, ControlLayout, Controls, Display, LEDS_DIR, Label,
    LightConfig, LightController, LightError, LightEvent, LightState, SysfsBacklight, SysfsFlash,
};

pub fn main() -> iced::Result {
    env_logger::init();

    iced::application(TorchletApp::default, TorchletApp::update, TorchletApp::view)
        .title("Torchlet")
        .subscription(TorchletApp::subscription)
        .theme(TorchletApp::theme)
        .window(window::Settings {
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .run()
}

// =============================================================================
// Settings
// =============================================================================

/// Settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Settings {
    layout: ControlLayout,
    led: Option<String>,
    backlight: Option<String>,
}

impl Settings {
    fn from_env() -> Self {
        Self::from_values(
            std::env::var("TORCHLET_LAYOUT").ok(),
            std::env::var("TORCHLET_LED").ok(),
            std::env::var("TORCHLET_BACKLIGHT").ok(),
        )
    }

    fn from_values(
        layout: Option<String>,
        led: Option<String>,
        backlight: Option<String>,
    ) -> Self {
        let layout = match layout.as_deref().map(str::parse::<ControlLayout>) {
            Some(Ok(layout)) => layout,
            Some(Err(e)) => {
                warn!("{}, using the default layout", e);
                ControlLayout::default()
            }
            None => ControlLayout::default(),
        };
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Self {
            layout,
            led: non_empty(led),
            backlight: non_empty(backlight),
        }
    }
}

/// Stands in when no backlight device can be opened, so every brightness
/// change surfaces as a failure instead of silently doing nothing.
struct MissingBacklight;

impl Display for MissingBacklight {
    fn ambient_brightness(&self) -> Result<Brightness, LightError> {
        Err(LightError::DeviceNotFound { class: "backlight" })
    }

    fn apply_brightness(&mut self, _fraction: Option<f32>) -> Result<(), LightError> {
        Err(LightError::DeviceNotFound { class: "backlight" })
    }
}

// =============================================================================
// Application
// =============================================================================

struct TorchletApp {
    controller: LightController,
    events: Receiver<LightEvent>,
    status: Option<String>,
    state: LightState,
    controls: Controls,
    has_flashlight: bool,
}

#[derive(Debug, Clone)]
enum Message {
    ToggleFlashLight,
    ToggleScreenLight,
    KeyboardEvent(KeyboardEvent),
    CloseRequested(window::Id),
}

impl Default for TorchletApp {
    fn default() -> Self {
        let settings = Settings::from_env();
        let mut status = None;

        let flash = match settings.led.as_deref() {
            Some(name) => SysfsFlash::open_in(LEDS_DIR, name).unwrap_or_else(|e| {
                status = Some(format!("LED {}: {}", name, e));
                SysfsFlash::discover()
            }),
            None => SysfsFlash::discover(),
        };

        let display: Box<dyn Display> =
            match SysfsBacklight::open_in(BACKLIGHT_DIR, settings.backlight.as_deref()) {
                Ok(backlight) => Box::new(backlight),
                Err(e) => {
                    status = Some(format!("Backlight: {}", e));
                    Box::new(MissingBacklight)
                }
            };

        let config = LightConfig::new().with_layout(settings.layout);
        let mut controller = LightController::create(config, Box::new(flash), display);

        let (tx, events) = mpsc::channel();
        controller.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });

        if controller.previous_brightness().is_none() && status.is_none() {
            status = Some("Ambient brightness unknown, will reset to default".to_string());
        }

        info!("starting with {:?}", settings);

        Self {
            state: controller.state(),
            controls: controller.visible_controls(),
            has_flashlight: controller.device_has_flashlight(),
            controller,
            events,
            status,
        }
    }
}

impl TorchletApp {
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::ToggleFlashLight => {
                self.status = None;
                self.controller.toggle_flash_light();
                Task::none()
            }

            Message::ToggleScreenLight => {
                self.status = None;
                if let Err(e) = self.controller.toggle_screen_light() {
                    self.status = Some(e.to_string());
                }
                Task::none()
            }

            Message::KeyboardEvent(event) => {
                if let KeyboardEvent::KeyPressed { key, .. } = event {
                    match key.as_ref() {
                        Key::Character("f") | Key::Named(keyboard::key::Named::Space) => {
                            return self.update(Message::ToggleFlashLight);
                        }
                        Key::Character("s") if self.controls.screen_light => {
                            return self.update(Message::ToggleScreenLight);
                        }
                        _ => {}
                    }
                }
                Task::none()
            }

            Message::CloseRequested(id) => {
                self.controller.on_stop();
                window::close(id)
            }
        };

        self.drain_events();
        task
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                LightEvent::Changed(state) => self.state = state,
                LightEvent::Failed(failure) => self.status = Some(failure.to_string()),
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let mut controls: Vec<Element<'_, Message>> = Vec::new();

        if self.controls.flashlight {
            let name = match self.controller.config().layout {
                ControlLayout::Single => "Light",
                ControlLayout::Dual => "Flashlight",
            };
            let hint = if self.has_flashlight {
                None
            } else {
                Some("No flash found, using the screen")
            };
            controls.push(light_control(
                label_text(name, self.state.flash_affordance.label),
                hint,
                self.state.flash_affordance.scheme,
                Message::ToggleFlashLight,
            ));
        }

        if self.controls.screen_light {
            controls.push(light_control(
                label_text("Screen light", self.state.screen_affordance.label),
                None,
                self.state.screen_affordance.scheme,
                Message::ToggleScreenLight,
            ));
        }

        let status = text(self.status.clone().unwrap_or_default()).size(14);

        Column::with_children(controls)
            .push(status)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::listen().map(Message::KeyboardEvent),
            window::close_requests().map(Message::CloseRequested),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn label_text(name: &str, label: Label) -> String {
    match label {
        Label::On => format!("{} on", name),
        Label::Off => format!("{} off", name),
    }
}

fn scheme_colors(scheme: ColorScheme) -> (Color, Color) {
    match scheme {
        ColorScheme::Bright => (Color::BLACK, Color::WHITE),
        ColorScheme::Dark => (Color::WHITE, Color::BLACK),
    }
}

/// A full-width tap target.
fn light_control<'a>(
    label: String,
    hint: Option<&'a str>,
    scheme: ColorScheme,
    on_press: Message,
) -> Element<'a, Message> {
    let (foreground, background) = scheme_colors(scheme);

    let mut content = Column::new().push(text(label).size(32)).spacing(10);
    if let Some(hint) = hint {
        content = content.push(text(hint).size(14));
    }

    let tile = container(content)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            text_color: Some(foreground),
            background: Some(Background::Color(background)),
            ..container::Style::default()
        });

    mouse_area(tile).on_press(on_press).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_values() {
        let settings = Settings::from_values(
            Some("dual".to_string()),
            Some("white:flash".to_string()),
            Some("  ".to_string()),
        );
        assert_eq!(settings.layout, ControlLayout::Dual);
        assert_eq!(settings.led.as_deref(), Some("white:flash"));
        assert_eq!(settings.backlight, None);
    }

    #[test]
    fn test_settings_unknown_layout_falls_back() {
        let settings = Settings::from_values(Some("both".to_string()), None, None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_label_text_and_colors() {
        assert_eq!(label_text("Flashlight", Label::On), "Flashlight on");
        assert_eq!(label_text("Screen light", Label::Off), "Screen light off");

        assert_eq!(scheme_colors(ColorScheme::Bright), (Color::BLACK, Color::WHITE));
        assert_eq!(scheme_colors(ColorScheme::Dark), (Color::WHITE, Color::BLACK));
    }
}
