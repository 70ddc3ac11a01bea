// ui/mod.rs - User-facing Surfaces
//
// The tray icon and the terminal settings dialog. The selection overlay has
// its own top-level module since it owns a window and a renderer.

pub mod prompt;
mod tray;

pub use tray::SystemTray;
