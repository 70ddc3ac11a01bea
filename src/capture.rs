// capture.rs - Frozen-Screen Capture and Selection Extraction
//
// Every monitor is photographed once, before the selection overlay opens.
// The selection is then cut out of those frozen images, so the overlay's own
// dimming can never leak into the result and a selection spanning monitors
// stitches cleanly.

use std::time::Instant;

use image::{imageops, RgbaImage};
use log::debug;
use thiserror::Error;

use crate::geometry::Rect;
use crate::monitor::MonitorInfo;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Monitor capture failed: {0}")]
    Screenshot(String),

    #[error("No monitors available to capture")]
    NoMonitors,

    #[error("Selection {0} does not touch any captured monitor")]
    OffscreenSelection(Rect),
}

/// One monitor's frozen image together with its placement on the desktop.
pub struct MonitorShot {
    pub info: MonitorInfo,
    pub image: RgbaImage,
}

/// A snapshot of every monitor, taken in one pass.
pub struct FrozenScreen {
    shots: Vec<MonitorShot>,
}

impl FrozenScreen {
    /// Photograph every monitor right now.
    pub fn capture_all() -> Result<Self, CaptureError> {
        let err = |e: xcap::XCapError| CaptureError::Screenshot(e.to_string());

        let monitors = xcap::Monitor::all().map_err(err)?;
        if monitors.is_empty() {
            return Err(CaptureError::NoMonitors);
        }

        let started = Instant::now();
        let mut shots = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            let info = MonitorInfo::try_from_xcap(monitor).map_err(err)?;
            let image = monitor.capture_image().map_err(err)?;
            debug!("Captured {} ({})", info.name, info.rect);
            shots.push(MonitorShot { info, image });
        }
        debug!("Froze {} monitor(s) in {:?}", shots.len(), started.elapsed());

        Ok(Self { shots })
    }

    pub fn from_shots(shots: Vec<MonitorShot>) -> Self {
        Self { shots }
    }

    /// Cut `selection` (absolute desktop coordinates) out of the snapshot.
    ///
    /// The result is exactly `selection.width` x `selection.height`. Regions
    /// of the selection that fall in the gaps of an irregular monitor layout
    /// stay transparent black. A selection touching no monitor at all is an
    /// error.
    pub fn extract(&self, selection: Rect) -> Result<RgbaImage, CaptureError> {
        let mut canvas = RgbaImage::new(selection.width, selection.height);
        let mut covered = false;

        for shot in &self.shots {
            let Some(overlap) = selection.intersect(&shot.info.rect) else {
                continue;
            };
            let piece = crop_from_shot(shot, overlap);
            imageops::replace(
                &mut canvas,
                &piece,
                i64::from(overlap.x - selection.x),
                i64::from(overlap.y - selection.y),
            );
            covered = true;
        }

        if !covered {
            return Err(CaptureError::OffscreenSelection(selection));
        }
        Ok(canvas)
    }
}

/// Crop `overlap` (absolute coordinates, already confined to the shot's
/// rectangle) out of one shot's image.
///
/// On a scaled display the captured image is larger than the monitor's
/// logical rectangle, so the crop is mapped through the pixel ratio and the
/// piece resized back to logical size.
fn crop_from_shot(shot: &MonitorShot, overlap: Rect) -> RgbaImage {
    let rect = shot.info.rect;
    let (img_w, img_h) = shot.image.dimensions();

    let scale = |v: i32, image_len: u32, rect_len: u32| -> u32 {
        (i64::from(v) * i64::from(image_len) / i64::from(rect_len)) as u32
    };
    let x = scale(overlap.x - rect.x, img_w, rect.width);
    let y = scale(overlap.y - rect.y, img_h, rect.height);
    let w = scale(overlap.width as i32, img_w, rect.width).min(img_w.saturating_sub(x));
    let h = scale(overlap.height as i32, img_h, rect.height).min(img_h.saturating_sub(y));

    let piece = imageops::crop_imm(&shot.image, x, y, w, h).to_image();
    if piece.dimensions() == (overlap.width, overlap.height) {
        piece
    } else {
        imageops::resize(
            &piece,
            overlap.width,
            overlap.height,
            imageops::FilterType::Triangle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const EMPTY: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn shot(id: u32, x: i32, y: i32, width: u32, height: u32, fill: Rgba<u8>) -> MonitorShot {
        MonitorShot {
            info: MonitorInfo {
                id,
                name: format!("DP-{id}"),
                rect: Rect::new(x, y, width, height),
                is_primary: id == 1,
            },
            image: RgbaImage::from_pixel(width, height, fill),
        }
    }

    #[test]
    fn extracts_from_a_single_monitor() {
        let screen = FrozenScreen::from_shots(vec![shot(1, 0, 0, 8, 8, RED)]);

        let out = screen.extract(Rect::new(2, 2, 3, 4)).unwrap();
        assert_eq!(out.dimensions(), (3, 4));
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn stitches_across_adjacent_monitors() {
        let screen = FrozenScreen::from_shots(vec![
            shot(1, 0, 0, 8, 8, RED),
            shot(2, 8, 0, 8, 8, BLUE),
        ]);

        let out = screen.extract(Rect::new(6, 1, 4, 2)).unwrap();
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(*out.get_pixel(0, 0), RED);
        assert_eq!(*out.get_pixel(1, 1), RED);
        assert_eq!(*out.get_pixel(2, 0), BLUE);
        assert_eq!(*out.get_pixel(3, 1), BLUE);
    }

    #[test]
    fn gaps_in_the_layout_stay_transparent() {
        // Monitors at x 0..8 and 12..20 leave a hole in the middle.
        let screen = FrozenScreen::from_shots(vec![
            shot(1, 0, 0, 8, 8, RED),
            shot(2, 12, 0, 8, 8, BLUE),
        ]);

        let out = screen.extract(Rect::new(6, 0, 8, 2)).unwrap();
        assert_eq!(*out.get_pixel(0, 0), RED);
        assert_eq!(*out.get_pixel(3, 0), EMPTY);
        assert_eq!(*out.get_pixel(5, 0), EMPTY);
        assert_eq!(*out.get_pixel(7, 0), BLUE);
    }

    #[test]
    fn handles_negative_monitor_origins() {
        let screen = FrozenScreen::from_shots(vec![shot(1, -8, -8, 8, 8, RED)]);

        let corners = Rect::from_corners(Point::new(-6, -6), Point::new(-2, -3)).unwrap();
        let out = screen.extract(corners).unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn offscreen_selection_is_an_error() {
        let screen = FrozenScreen::from_shots(vec![shot(1, 0, 0, 8, 8, RED)]);

        let err = screen.extract(Rect::new(100, 100, 4, 4)).unwrap_err();
        assert!(matches!(err, CaptureError::OffscreenSelection(_)));
    }

    #[test]
    fn selection_hanging_off_an_edge_keeps_the_covered_part() {
        let screen = FrozenScreen::from_shots(vec![shot(1, 0, 0, 8, 8, RED)]);

        let out = screen.extract(Rect::new(-2, 0, 4, 2)).unwrap();
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(*out.get_pixel(0, 0), EMPTY);
        assert_eq!(*out.get_pixel(1, 0), EMPTY);
        assert_eq!(*out.get_pixel(2, 0), RED);
        assert_eq!(*out.get_pixel(3, 0), RED);
    }

    #[test]
    fn scaled_capture_is_mapped_back_to_logical_size() {
        // A 2x display: logical 8x8 rectangle, 16x16 pixels captured.
        let screen = FrozenScreen::from_shots(vec![MonitorShot {
            info: MonitorInfo {
                id: 1,
                name: "eDP-1".into(),
                rect: Rect::new(0, 0, 8, 8),
                is_primary: true,
            },
            image: RgbaImage::from_pixel(16, 16, RED),
        }]);

        let out = screen.extract(Rect::new(3, 3, 4, 4)).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| *p == RED));
    }
}
