// monitor.rs - Monitor List Maintenance and Active-Monitor Tracking
//
// Keeps the OS monitor list cached and tracks which monitor currently holds
// the cursor. The overlay follows the cursor across displays through this
// tracker, so lookups have to be cheap in the common case (cursor staying on
// one monitor) and correct across layout changes.

use enigo::{Enigo, Mouse};
use log::{debug, info};
use thiserror::Error;

use crate::geometry::{Point, Rect};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to enumerate monitors: {0}")]
    Enumeration(String),

    #[error("Cursor position unavailable: {0}")]
    CursorUnavailable(String),

    #[error("Cursor at {0} is not on any monitor")]
    CursorOffscreen(Point),
}

/// An OS-reported display.
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub id: u32,
    pub name: String,
    pub rect: Rect,
    pub is_primary: bool,
}

impl MonitorInfo {
    /// Read the fallible xcap accessors into a plain value.
    pub(crate) fn try_from_xcap(monitor: &xcap::Monitor) -> Result<Self, xcap::XCapError> {
        Ok(Self {
            id: monitor.id()?,
            name: monitor.name()?,
            rect: Rect::new(
                monitor.x()?,
                monitor.y()?,
                monitor.width()?,
                monitor.height()?,
            ),
            is_primary: monitor.is_primary()?,
        })
    }
}

/// Source of the OS monitor list.
///
/// Split behind a trait so the tracking logic is testable without a display.
pub trait MonitorSource {
    fn enumerate(&self) -> Result<Vec<MonitorInfo>, MonitorError>;
}

/// Production source backed by `xcap`.
pub struct XcapMonitorSource;

impl MonitorSource for XcapMonitorSource {
    fn enumerate(&self) -> Result<Vec<MonitorInfo>, MonitorError> {
        let err = |e: xcap::XCapError| MonitorError::Enumeration(e.to_string());

        let monitors = xcap::Monitor::all().map_err(err)?;
        monitors
            .iter()
            .map(|m| MonitorInfo::try_from_xcap(m).map_err(err))
            .collect()
    }
}

/// Tracks the monitor list and the monitor the cursor was last seen on.
///
/// The list starts empty and is populated through the same miss-then-requery
/// path used for layout changes, so there is no separate initialization step.
pub struct MonitorTracker {
    source: Box<dyn MonitorSource>,
    monitors: Vec<MonitorInfo>,
    active: Option<MonitorInfo>,
}

impl MonitorTracker {
    pub fn new(source: Box<dyn MonitorSource>) -> Self {
        Self {
            source,
            monitors: Vec::new(),
            active: None,
        }
    }

    pub fn with_os_source() -> Self {
        Self::new(Box::new(XcapMonitorSource))
    }

    /// The monitor containing `pos`.
    ///
    /// The cached active monitor short-circuits the common case of the cursor
    /// moving within one display. Otherwise the cached list is scanned, and
    /// only if that also misses is the OS re-queried, at most once per lookup,
    /// before giving up. A point on a shared edge belongs to every adjacent
    /// monitor; the first one in enumeration order wins.
    pub fn locate(&mut self, pos: Point) -> Result<MonitorInfo, MonitorError> {
        if let Some(active) = &self.active {
            if active.rect.contains(pos) {
                return Ok(active.clone());
            }
        }

        let mut requeried = false;
        loop {
            if let Some(hit) = self.monitors.iter().find(|m| m.rect.contains(pos)).cloned() {
                info!("Active monitor now {} ({})", hit.name, hit.rect);
                self.active = Some(hit.clone());
                return Ok(hit);
            }
            if requeried {
                return Err(MonitorError::CursorOffscreen(pos));
            }
            self.refresh()?;
            requeried = true;
        }
    }

    /// Replace the cached list from the source.
    ///
    /// Also drops the cached active monitor: after a layout change its
    /// rectangle may describe a display that no longer exists, and a stale
    /// rectangle must never satisfy a later lookup.
    pub fn refresh(&mut self) -> Result<(), MonitorError> {
        self.monitors = self.source.enumerate()?;
        self.active = None;
        debug!("Monitor list refreshed: {} monitor(s)", self.monitors.len());
        Ok(())
    }

    /// Current monitor list, enumerating on first use.
    pub fn monitors(&mut self) -> Result<&[MonitorInfo], MonitorError> {
        if self.monitors.is_empty() {
            self.refresh()?;
        }
        Ok(&self.monitors)
    }
}

/// Queries the OS pointer location.
///
/// Holds the enigo connection open so the 5 ms follow poll does not
/// reconnect on every tick.
pub struct CursorProbe {
    enigo: Enigo,
}

impl CursorProbe {
    pub fn new() -> Result<Self, MonitorError> {
        Enigo::new(&enigo::Settings::default())
            .map(|enigo| Self { enigo })
            .map_err(|e| MonitorError::CursorUnavailable(e.to_string()))
    }

    /// Current pointer location in absolute screen coordinates.
    pub fn position(&self) -> Result<Point, MonitorError> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| MonitorError::CursorUnavailable(e.to_string()))?;
        Ok(Point::new(x, y))
    }
}
