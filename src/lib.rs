//! ShotScan - hotkey-driven region capture that decodes barcodes or text
//! and puts the result on the clipboard.
//!
//! The flow: a global hotkey freezes every monitor, an overlay follows the
//! cursor for a rubber-band selection, the selected pixels are scanned for a
//! barcode and otherwise OCRed, and whatever text comes out is copied.

pub mod app;
pub mod capture;
pub mod clipboard;
pub mod constants;
pub mod decode;
pub mod geometry;
pub mod hotkey;
pub mod monitor;
pub mod overlay;
pub mod render;
pub mod settings;
pub mod ui;

/// Events injected into the winit loop from hotkey and tray threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    CaptureRequested,
    ExitRequested,
}

// Re-export the types the binary and tests reach for most.
pub use app::App;
pub use capture::FrozenScreen;
pub use decode::{DecodedText, TextSource};
pub use geometry::{Point, Rect};
pub use monitor::{MonitorInfo, MonitorTracker};
pub use overlay::SelectionOutcome;
pub use settings::Settings;
