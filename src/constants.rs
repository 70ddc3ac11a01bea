// constants.rs - Application-wide Constants
//
// Centralized constants for colors, timings, and other magic numbers.

/// Application identity.
pub mod app {
    pub const NAME: &str = "ShotScan";
    /// Tooltip shown on the tray icon.
    pub const TOOLTIP: &str = "ShotScan - capture, decode, copy";
}

/// Default hotkey bindings.
pub mod hotkeys {
    /// Starts a region capture.
    pub const DEFAULT_CAPTURE: &str = "alt+s";
    /// Exits the app.
    pub const DEFAULT_EXIT: &str = "shift+escape";
}

/// Selection overlay appearance and timing.
pub mod overlay {
    /// Dim layer over the desktop: white at 20%, straight RGBA.
    pub const DIM_COLOR: [f64; 4] = [1.0, 1.0, 1.0, 0.2];
    /// Fill of the rubber-band rectangle while dragging (RGBA).
    pub const SELECTION_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
    /// How often the overlay re-checks which monitor holds the cursor.
    pub const CURSOR_POLL_MS: u64 = 5;
}
