// app/mod.rs - Event Loop Driver
//
// Owns the long-lived pieces (settings, monitor tracker, tray, hotkeys) and
// drives the winit event loop. Hotkey presses and tray clicks arrive as user
// events; everything else is routed to the active selection session.
//
// Control flow: Wait while idle, WaitUntil with a short timeout while a
// selection overlay is up so it can follow the cursor between monitors.

mod state;

pub use state::{AppMode, SelectionSession};

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoopProxy};
use winit::window::WindowId;

use crate::capture::FrozenScreen;
use crate::clipboard;
use crate::constants::{app, overlay};
use crate::decode::{self, DecodeError};
use crate::geometry::Rect;
use crate::hotkey::HotkeyBindings;
use crate::monitor::{CursorProbe, MonitorInfo, MonitorTracker};
use crate::overlay::{SelectionOutcome, SelectionOverlay};
use crate::settings::Settings;
use crate::ui::SystemTray;
use crate::UserEvent;

pub struct App {
    settings: Settings,
    tracker: MonitorTracker,
    mode: AppMode,
    proxy: EventLoopProxy<UserEvent>,
    hotkeys: Option<HotkeyBindings>,
    tray: Option<SystemTray>,
    initialized: bool,
}

impl App {
    pub fn new(settings: Settings, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            settings,
            tracker: MonitorTracker::with_os_source(),
            mode: AppMode::Idle,
            proxy,
            hotkeys: None,
            tray: None,
            initialized: false,
        }
    }

    /// Hotkey and tray registration, run once the event loop is live.
    ///
    /// Either surface may fail on its own (no tray protocol, hotkey taken by
    /// another app); the app stays usable through the surviving one.
    fn init_surfaces(&mut self, event_loop: &ActiveEventLoop) {
        match HotkeyBindings::register(&self.settings) {
            Ok(bindings) => {
                bindings.forward_presses(self.proxy.clone());
                self.hotkeys = Some(bindings);
            }
            Err(e) => error!("{e}; continuing with the tray only"),
        }

        match SystemTray::init(self.proxy.clone()) {
            Ok(tray) => self.tray = Some(tray),
            Err(e) => warn!("Tray icon unavailable: {e}"),
        }

        if self.hotkeys.is_none() && self.tray.is_none() {
            error!("No way left to trigger a capture; exiting");
            event_loop.exit();
            return;
        }
        info!(
            "{} ready; press {} to capture a region",
            app::NAME,
            self.settings.capture_hotkey
        );
    }

    fn begin_capture(&mut self, event_loop: &ActiveEventLoop) {
        if self.mode.is_selecting() {
            debug!("Capture requested while a selection is already open");
            return;
        }
        match self.start_session(event_loop) {
            Ok(session) => self.mode = AppMode::Selecting(session),
            Err(e) => error!("Could not start capture: {e:#}"),
        }
    }

    /// Freeze the desktop, then open the overlay on the cursor's monitor.
    ///
    /// The freeze comes first so the overlay can never appear in its own
    /// capture. The monitor list is re-read at the same moment to keep the
    /// tracker consistent with the frozen layout.
    fn start_session(&mut self, event_loop: &ActiveEventLoop) -> Result<SelectionSession> {
        let frozen = FrozenScreen::capture_all()?;
        self.tracker.refresh()?;

        let probe = CursorProbe::new();
        let monitor = match &probe {
            Ok(probe) => match probe.position().and_then(|pos| self.tracker.locate(pos)) {
                Ok(monitor) => monitor,
                Err(e) => {
                    warn!("Cursor lookup failed ({e}); opening on the primary monitor");
                    self.primary_monitor()?
                }
            },
            Err(e) => {
                warn!("Cursor tracking unavailable ({e}); overlay will not follow");
                self.primary_monitor()?
            }
        };

        let overlay = SelectionOverlay::open(event_loop, &monitor)?;
        Ok(SelectionSession {
            overlay,
            frozen,
            probe: probe.ok(),
        })
    }

    fn primary_monitor(&mut self) -> Result<MonitorInfo> {
        let monitors = self.tracker.monitors()?;
        monitors
            .iter()
            .find(|m| m.is_primary)
            .or_else(|| monitors.first())
            .cloned()
            .ok_or_else(|| anyhow!("No monitors reported"))
    }

    /// Cut the selection out of the frozen screen, decode it, and copy the
    /// result. Every failure ends in a log line; the app goes back to idle
    /// regardless.
    fn finish_capture(&self, frozen: &FrozenScreen, selection: Rect) {
        let image = match frozen.extract(selection) {
            Ok(image) => image,
            Err(e) => {
                error!("{e}");
                return;
            }
        };
        let decoded = match decode::decode_image(&image, &self.settings.languages) {
            Ok(decoded) => decoded,
            Err(DecodeError::NothingRecognized) => {
                info!("Nothing recognized in the selection; clipboard untouched");
                return;
            }
            Err(e) => {
                error!("{e}");
                return;
            }
        };
        if let Err(e) = clipboard::copy_text(&decoded.text) {
            error!("{e}");
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.initialized {
            self.initialized = true;
            self.init_surfaces(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::CaptureRequested => self.begin_capture(event_loop),
            UserEvent::ExitRequested => {
                info!("Exit requested");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = self.mode.session_mut() else {
            return;
        };
        if session.overlay.window_id() != window_id {
            return;
        }

        if let Some(outcome) = session.overlay.handle_event(&event) {
            if let Some(session) = self.mode.finish() {
                if let SelectionOutcome::Selected(rect) = outcome {
                    self.finish_capture(&session.frozen, rect);
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.mode.session_mut() {
            Some(session) => {
                if let Some(probe) = &session.probe {
                    session.overlay.follow_cursor(probe, &mut self.tracker);
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(
                    Instant::now() + Duration::from_millis(overlay::CURSOR_POLL_MS),
                ));
            }
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
