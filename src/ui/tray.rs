// ui/tray.rs - System Tray Icon
//
// The tray is the app's only persistent surface: a left click or the menu's
// "Capture region" starts a capture, "Exit" quits. Events are forwarded into
// the winit loop through the event-loop proxy.

use std::sync::Mutex;

use anyhow::Result;
use log::{error, info};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent,
};
use winit::event_loop::EventLoopProxy;

use crate::constants::app;
use crate::UserEvent;

/// Keeps the OS tray entry alive; dropping this removes the icon.
pub struct SystemTray {
    _tray_icon: TrayIcon,
}

impl SystemTray {
    /// Build the icon and menu and wire their events to `proxy`.
    pub fn init(proxy: EventLoopProxy<UserEvent>) -> Result<Self> {
        let capture_item = MenuItem::new("Capture region", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu = Menu::new();
        menu.append_items(&[
            &capture_item,
            &PredefinedMenuItem::separator(),
            &exit_item,
        ])?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(app::TOOLTIP)
            .with_icon(build_icon()?)
            .build()?;

        let capture_id = capture_item.id().clone();
        let exit_id = exit_item.id().clone();
        let menu_proxy = Mutex::new(proxy.clone());
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            if event.id() == &capture_id {
                send(&menu_proxy, UserEvent::CaptureRequested);
            } else if event.id() == &exit_id {
                send(&menu_proxy, UserEvent::ExitRequested);
            }
        }));

        let click_proxy = Mutex::new(proxy);
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            // Left click starts a capture; right click opens the menu on its
            // own.
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                send(&click_proxy, UserEvent::CaptureRequested);
            }
        }));

        info!("System tray icon initialized");
        Ok(Self {
            _tray_icon: tray_icon,
        })
    }
}

fn send(proxy: &Mutex<EventLoopProxy<UserEvent>>, event: UserEvent) {
    if let Ok(proxy) = proxy.lock() {
        if let Err(e) = proxy.send_event(event) {
            error!("Failed to forward tray event: {e}");
        }
    }
}

/// 16x16 viewfinder glyph: white corner brackets around a green target.
fn build_icon() -> Result<tray_icon::Icon> {
    let width = 16u32;
    let height = 16u32;
    let mut rgba = vec![0u8; (width * height * 4) as usize];

    for y in 0..height {
        for x in 0..width {
            let offset = ((y * width + x) * 4) as usize;
            let on_edge = x == 0 || x == width - 1 || y == 0 || y == height - 1;
            let in_bracket_gap = (6..=9).contains(&x) || (6..=9).contains(&y);

            let pixel = if on_edge && !in_bracket_gap {
                [255, 255, 255, 255]
            } else if (6..=9).contains(&x) && (6..=9).contains(&y) {
                [0, 200, 120, 255]
            } else {
                [0, 0, 0, 0]
            };
            rgba[offset..offset + 4].copy_from_slice(&pixel);
        }
    }

    Ok(tray_icon::Icon::from_rgba(rgba, width, height)?)
}
