// hotkey.rs - Global Hotkey Registration and Forwarding
//
// Hotkeys are delivered by the OS on a platform thread; presses are
// forwarded into the winit event loop as user events so the app never has
// to poll.

use std::sync::Mutex;

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use log::{error, info};
use thiserror::Error;
use winit::event_loop::EventLoopProxy;

use crate::constants::hotkeys;
use crate::settings::Settings;
use crate::UserEvent;

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Invalid hotkey \"{binding}\": {reason}")]
    InvalidBinding { binding: String, reason: String },

    #[error("Could not register hotkey \"{binding}\": {reason}")]
    Registration { binding: String, reason: String },

    #[error("Hotkey system unavailable: {0}")]
    Unavailable(String),
}

/// Check a binding string like `alt+s` or `ctrl+shift+f5` without
/// registering it. Used by the settings dialog.
pub fn validate_binding(binding: &str) -> Result<(), HotkeyError> {
    parse_binding(binding).map(|_| ())
}

fn parse_binding(binding: &str) -> Result<HotKey, HotkeyError> {
    binding
        .parse::<HotKey>()
        .map_err(|e| HotkeyError::InvalidBinding {
            binding: binding.to_string(),
            reason: e.to_string(),
        })
}

/// The app's registered global hotkeys.
///
/// The OS registration lives as long as this value; dropping it releases
/// the bindings.
pub struct HotkeyBindings {
    _manager: GlobalHotKeyManager,
    capture: HotKey,
    exit: Option<HotKey>,
}

impl HotkeyBindings {
    /// Register the bindings from `settings`.
    ///
    /// The capture hotkey is the app's only entry point, so an unparsable
    /// stored binding falls back to the default instead of failing startup.
    /// The exit hotkey is optional: empty means unbound, and a bad one is
    /// logged and skipped.
    pub fn register(settings: &Settings) -> Result<Self, HotkeyError> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyError::Unavailable(e.to_string()))?;

        let (capture, capture_binding) = match parse_binding(&settings.capture_hotkey) {
            Ok(hotkey) => (hotkey, settings.capture_hotkey.clone()),
            Err(e) => {
                error!("{e}; falling back to \"{}\"", hotkeys::DEFAULT_CAPTURE);
                (
                    parse_binding(hotkeys::DEFAULT_CAPTURE)?,
                    hotkeys::DEFAULT_CAPTURE.to_string(),
                )
            }
        };
        manager
            .register(capture)
            .map_err(|e| HotkeyError::Registration {
                binding: capture_binding.clone(),
                reason: e.to_string(),
            })?;
        info!("Capture hotkey registered: {capture_binding}");

        let exit = register_exit(&manager, &settings.exit_hotkey);

        Ok(Self {
            _manager: manager,
            capture,
            exit,
        })
    }

    /// Forward hotkey presses (not releases) into the event loop.
    pub fn forward_presses(&self, proxy: EventLoopProxy<UserEvent>) {
        let capture_id = self.capture.id();
        let exit_id = self.exit.map(|hotkey| hotkey.id());
        let proxy = Mutex::new(proxy);

        GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
            if event.state != HotKeyState::Pressed {
                return;
            }
            let user_event = if event.id == capture_id {
                UserEvent::CaptureRequested
            } else if Some(event.id) == exit_id {
                UserEvent::ExitRequested
            } else {
                return;
            };
            if let Ok(proxy) = proxy.lock() {
                // Failure means the event loop is already gone.
                let _ = proxy.send_event(user_event);
            }
        }));
    }
}

fn register_exit(manager: &GlobalHotKeyManager, binding: &str) -> Option<HotKey> {
    if binding.trim().is_empty() {
        info!("No exit hotkey bound");
        return None;
    }
    let hotkey = match parse_binding(binding) {
        Ok(hotkey) => hotkey,
        Err(e) => {
            error!("{e}; exit hotkey disabled");
            return None;
        }
    };
    match manager.register(hotkey) {
        Ok(()) => {
            info!("Exit hotkey registered: {binding}");
            Some(hotkey)
        }
        Err(e) => {
            error!("Could not register exit hotkey \"{binding}\": {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_default_bindings() {
        validate_binding(hotkeys::DEFAULT_CAPTURE).unwrap();
        validate_binding(hotkeys::DEFAULT_EXIT).unwrap();
    }

    #[test]
    fn accepts_multi_modifier_chords() {
        validate_binding("ctrl+shift+f5").unwrap();
        validate_binding("super+alt+p").unwrap();
    }

    #[test]
    fn rejects_garbage_bindings() {
        assert!(validate_binding("").is_err());
        assert!(validate_binding("alt+").is_err());
        assert!(validate_binding("bogus+s").is_err());
        assert!(validate_binding("alt+notakey").is_err());
    }

    #[test]
    #[ignore = "requires a desktop session to register OS hotkeys"]
    fn registers_the_default_settings() {
        let bindings = HotkeyBindings::register(&Settings::default()).unwrap();
        assert!(bindings.exit.is_some());
    }
}
