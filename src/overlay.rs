// overlay.rs - Selection Overlay Session
//
// One borderless always-on-top window that covers the monitor under the
// cursor, follows it across monitors until the drag starts, and turns the
// drag into a desktop-space rectangle. The desktop itself was frozen before
// the overlay opened, so nothing drawn here can end up in the capture.
//
// Coordinates: the window sits exactly on the monitor's rectangle, so a
// window-space cursor position plus the monitor origin is a desktop-space
// point.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowId, WindowLevel};

use crate::constants::app;
use crate::geometry::{Point, Rect};
use crate::monitor::{CursorProbe, MonitorInfo, MonitorTracker};
use crate::render::OverlayRenderer;

/// How a selection session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A non-empty rectangle in desktop coordinates.
    Selected(Rect),
    /// Escape, window close, or a zero-area drag.
    Cancelled,
}

pub struct SelectionOverlay {
    window: Arc<Window>,
    renderer: OverlayRenderer,
    /// The monitor the window currently covers.
    monitor_rect: Rect,
    /// Last cursor position, in window space.
    cursor: PhysicalPosition<f64>,
    /// Window-space position of the mouse-down, once dragging.
    anchor: Option<PhysicalPosition<f64>>,
}

impl SelectionOverlay {
    pub fn open(event_loop: &ActiveEventLoop, monitor: &MonitorInfo) -> Result<Self> {
        info!("Opening selection overlay on {} ({})", monitor.name, monitor.rect);

        let attrs = Window::default_attributes()
            .with_title(app::NAME)
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_position(PhysicalPosition::new(monitor.rect.x, monitor.rect.y))
            .with_inner_size(PhysicalSize::new(monitor.rect.width, monitor.rect.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create overlay window")?,
        );
        window.set_cursor(CursorIcon::Crosshair);
        window.focus_window();

        let renderer = OverlayRenderer::new(window.clone())?;
        window.request_redraw();

        Ok(Self {
            window,
            renderer,
            monitor_rect: monitor.rect,
            cursor: PhysicalPosition::new(0.0, 0.0),
            anchor: None,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// The periodic tick: move the overlay to whichever monitor holds the
    /// cursor. Once a drag has started the window stays pinned so the
    /// anchor's coordinate space cannot shift mid-selection.
    pub fn follow_cursor(&mut self, probe: &CursorProbe, tracker: &mut MonitorTracker) {
        if self.anchor.is_some() {
            return;
        }
        let pos = match probe.position() {
            Ok(pos) => pos,
            Err(e) => {
                debug!("Cursor poll failed: {e}");
                return;
            }
        };
        match tracker.locate(pos) {
            Ok(monitor) if monitor.rect != self.monitor_rect => self.relocate(&monitor),
            Ok(_) => {}
            Err(e) => debug!("Cursor not on any monitor during overlay session: {e}"),
        }
    }

    /// Feed one event of this overlay's window. A `Some` return ends the
    /// session.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<SelectionOutcome> {
        match event {
            WindowEvent::CloseRequested => return Some(SelectionOutcome::Cancelled),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && event.logical_key == Key::Named(NamedKey::Escape) {
                    info!("Selection cancelled");
                    return Some(SelectionOutcome::Cancelled);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                if self.anchor.is_some() {
                    self.window.request_redraw();
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.anchor = Some(self.cursor);
                    self.window.request_redraw();
                }
                ElementState::Released => {
                    // A release without an anchor is a click that began
                    // outside the overlay.
                    if let Some(anchor) = self.anchor {
                        return Some(self.resolve(anchor));
                    }
                }
            },

            WindowEvent::Resized(size) => self.renderer.resize(*size),

            WindowEvent::RedrawRequested => self.draw(),

            _ => {}
        }
        None
    }

    fn relocate(&mut self, monitor: &MonitorInfo) {
        info!("Overlay following cursor to {} ({})", monitor.name, monitor.rect);
        self.monitor_rect = monitor.rect;
        self.window
            .set_outer_position(PhysicalPosition::new(monitor.rect.x, monitor.rect.y));
        let applied = self
            .window
            .request_inner_size(PhysicalSize::new(monitor.rect.width, monitor.rect.height));
        // Some platforms resize synchronously and emit no Resized event.
        if let Some(size) = applied {
            self.renderer.resize(size);
        }
        self.window.focus_window();
        self.window.request_redraw();
    }

    fn resolve(&self, anchor: PhysicalPosition<f64>) -> SelectionOutcome {
        let origin = self.monitor_rect.origin();
        let a = desktop_point(origin, anchor);
        let b = desktop_point(origin, self.cursor);
        match Rect::from_corners(a, b) {
            Some(rect) => {
                info!("Region selected: {rect}");
                SelectionOutcome::Selected(rect)
            }
            None => {
                info!("Zero-area selection; nothing captured");
                SelectionOutcome::Cancelled
            }
        }
    }

    fn draw(&mut self) {
        let band = self.anchor.map(|anchor| {
            [
                anchor.x as f32,
                anchor.y as f32,
                self.cursor.x as f32,
                self.cursor.y as f32,
            ]
        });
        if let Err(e) = self.renderer.render(band) {
            match e {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    self.renderer.resize(self.window.inner_size());
                    self.window.request_redraw();
                }
                wgpu::SurfaceError::OutOfMemory => error!("Overlay surface out of memory"),
                other => warn!("Overlay frame skipped: {other}"),
            }
        }
    }
}

fn desktop_point(origin: Point, pos: PhysicalPosition<f64>) -> Point {
    Point::new(
        origin.x + pos.x.round() as i32,
        origin.y + pos.y.round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_positions_translate_into_desktop_space() {
        let origin = Point::new(1920, 0);
        let p = desktop_point(origin, PhysicalPosition::new(10.4, 20.6));
        assert_eq!(p, Point::new(1930, 21));
    }

    #[test]
    fn translation_works_for_monitors_left_of_the_primary() {
        let origin = Point::new(-2560, -400);
        let p = desktop_point(origin, PhysicalPosition::new(0.0, 0.0));
        assert_eq!(p, Point::new(-2560, -400));
    }
}
