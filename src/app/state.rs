// app/state.rs - Application Mode
//
// The app is either idle in the tray or running exactly one selection
// session. The session bundles everything that only exists between hotkey
// press and mouse release; dropping it closes the overlay window and frees
// the frozen screen images.

use crate::capture::FrozenScreen;
use crate::monitor::CursorProbe;
use crate::overlay::SelectionOverlay;

/// Everything alive during one capture, from hotkey press to resolution.
pub struct SelectionSession {
    pub overlay: SelectionOverlay,
    /// The desktop as it looked when the hotkey was pressed.
    pub frozen: FrozenScreen,
    /// `None` when the cursor cannot be queried; the overlay then stays on
    /// its opening monitor instead of following.
    pub probe: Option<CursorProbe>,
}

pub enum AppMode {
    Idle,
    Selecting(SelectionSession),
}

impl AppMode {
    pub fn is_selecting(&self) -> bool {
        matches!(self, AppMode::Selecting(_))
    }

    pub fn session_mut(&mut self) -> Option<&mut SelectionSession> {
        match self {
            AppMode::Selecting(session) => Some(session),
            AppMode::Idle => None,
        }
    }

    /// End the session, leaving the app idle.
    pub fn finish(&mut self) -> Option<SelectionSession> {
        match std::mem::replace(self, AppMode::Idle) {
            AppMode::Selecting(session) => Some(session),
            AppMode::Idle => None,
        }
    }
}
