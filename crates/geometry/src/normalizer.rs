//! Screen geometry normalization.
//!
//! Raw screen measurements are repaired in a fixed order: the root size is
//! sanitized, the display-wide workarea is checked against the screen, and
//! the DPI goes through a three-tier fallback (reported size, mean monitor
//! size, 96 DPI) so the result is always inside the configured bounds.

use displaykit_common::config::GeometrySettings;
use displaykit_platform_core::{scale_round, DisplaySource, Monitor, Rect, Screen};
use serde::{Deserialize, Serialize};

use crate::dpi::{dpi, mm_at_fallback_dpi, DpiBounds};

/// Largest root dimension accepted from a display server.
pub const MAX_ROOT_DIMENSION: i32 = 32768;
/// Root size used when the reported one is implausible.
pub const FALLBACK_ROOT_SIZE: (i32, i32) = (1920, 1080);

/// Raw display-wide measurements, in device pixels and millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScreen {
    pub name: String,
    pub size: (i32, i32),
    pub size_mm: (i32, i32),
    pub workarea: Option<Rect>,
}

impl RawScreen {
    pub fn from_source(source: &dyn DisplaySource) -> Self {
        Self {
            name: source.display_name(),
            size: source.screen_size(),
            size_mm: source.screen_size_mm(),
            workarea: source.workarea(),
        }
    }
}

/// Which tier produced the physical size of a [`Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DpiSource {
    /// The size the display server reported for the screen.
    Reported,
    /// The mean physical size of all monitors.
    MonitorMean,
    /// A size implied by assuming 96 DPI.
    Assumed96,
}

/// Validates and repairs raw screen data into a [`Screen`].
#[derive(Debug, Clone)]
pub struct GeometryNormalizer {
    bounds: DpiBounds,
    scale_x: f64,
    scale_y: f64,
}

impl Default for GeometryNormalizer {
    fn default() -> Self {
        Self::new(DpiBounds::default())
    }
}

impl GeometryNormalizer {
    pub fn new(bounds: DpiBounds) -> Self {
        Self {
            bounds,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn from_settings(settings: &GeometrySettings) -> Self {
        Self::new(DpiBounds::from_settings(settings))
    }

    /// Scale applied to screen size and workarea (device / logical).
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn bounds(&self) -> DpiBounds {
        self.bounds
    }

    /// Produce one consistent [`Screen`] from collected monitors and raw
    /// display-wide values.
    pub fn normalize(&self, monitors: &[Monitor], raw: &RawScreen) -> Screen {
        let (sw, sh) = sanitize_root_size(raw.size);
        let width = scale_round(sw, self.scale_x).max(1);
        let height = scale_round(sh, self.scale_y).max(1);
        let workarea = self.screen_workarea(raw.workarea, width, height);
        let (width_mm, height_mm, dpi_x, dpi_y, source) =
            self.physical_size(monitors, (sw, sh), raw.size_mm);

        tracing::debug!(
            name = %raw.name,
            width,
            height,
            width_mm,
            height_mm,
            dpi_x,
            dpi_y,
            dpi_source = ?source,
            monitors = monitors.len(),
            "Normalized screen"
        );

        Screen {
            name: raw.name.clone(),
            width,
            height,
            width_mm,
            height_mm,
            monitors: monitors.to_vec(),
            workarea,
            dpi_x,
            dpi_y,
        }
    }

    fn screen_workarea(&self, raw: Option<Rect>, width: i32, height: i32) -> Rect {
        let full = Rect::full(width, height);
        let Some(raw) = raw else {
            return full;
        };
        let scaled = raw.scaled(self.scale_x, self.scale_y);
        if scaled.is_within(&full) {
            scaled
        } else {
            tracing::warn!(workarea = ?raw, screen = ?full, "Discarding invalid workarea values");
            full
        }
    }

    /// Physical size in mm, resulting DPI, and the tier that produced them.
    fn physical_size(
        &self,
        monitors: &[Monitor],
        (sw, sh): (i32, i32),
        (raw_wmm, raw_hmm): (i32, i32),
    ) -> (i32, i32, i32, i32, DpiSource) {
        let (mut wmm, mut hmm) = (raw_wmm as f64, raw_hmm as f64);
        let mut dpi_x = dpi(sw, wmm);
        let mut dpi_y = dpi(sh, hmm);
        let mut source = DpiSource::Reported;

        if !self.bounds.accepts(dpi_x, dpi_y) {
            tracing::warn!(
                dpi_x,
                dpi_y,
                width_mm = raw_wmm,
                height_mm = raw_hmm,
                "Ignoring invalid DPI from screen size"
            );

            if !monitors.is_empty() {
                let n = monitors.len() as f64;
                wmm = monitors.iter().map(|m| m.width_mm as f64).sum::<f64>() / n;
                hmm = monitors.iter().map(|m| m.height_mm as f64).sum::<f64>() / n;
                dpi_x = dpi(sw, wmm);
                dpi_y = dpi(sh, hmm);
                source = DpiSource::MonitorMean;
            }

            if !self.bounds.accepts(dpi_x, dpi_y) {
                wmm = mm_at_fallback_dpi(sw);
                hmm = mm_at_fallback_dpi(sh);
                dpi_x = dpi(sw, wmm);
                dpi_y = dpi(sh, hmm);
                source = DpiSource::Assumed96;
            }

            if !self.bounds.accepts(dpi_x, dpi_y) {
                tracing::warn!(
                    dpi_x,
                    dpi_y,
                    bounds = ?self.bounds,
                    "96 DPI fallback still out of bounds, clamping"
                );
                dpi_x = self.bounds.clamp(dpi_x);
                dpi_y = self.bounds.clamp(dpi_y);
            }

            tracing::info!(
                width_mm = wmm.round() as i32,
                height_mm = hmm.round() as i32,
                source = ?source,
                "Using repaired physical screen size"
            );
        }

        (
            wmm.round() as i32,
            hmm.round() as i32,
            dpi_x,
            dpi_y,
            source,
        )
    }
}

/// Replace a non-positive or oversized root size with [`FALLBACK_ROOT_SIZE`].
pub fn sanitize_root_size((w, h): (i32, i32)) -> (i32, i32) {
    if w <= 0 || h <= 0 || w > MAX_ROOT_DIMENSION || h > MAX_ROOT_DIMENSION {
        tracing::warn!(
            width = w,
            height = h,
            fallback = ?FALLBACK_ROOT_SIZE,
            "Display server returned invalid root window dimensions"
        );
        return FALLBACK_ROOT_SIZE;
    }
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: i32, x: i32, width_mm: i32, height_mm: i32) -> Monitor {
        Monitor {
            id,
            name: id.to_string(),
            x,
            y: 0,
            width: 1920,
            height: 1080,
            width_mm,
            height_mm,
            manufacturer: String::new(),
            model: String::new(),
            is_primary: id == 0,
            scale_factor: 1.0,
            refresh_rate: Some(60.0),
            workarea: None,
        }
    }

    fn raw(size: (i32, i32), size_mm: (i32, i32), workarea: Option<Rect>) -> RawScreen {
        RawScreen {
            name: ":0".to_string(),
            size,
            size_mm,
            workarea,
        }
    }

    #[test]
    fn plausible_dpi_is_kept() {
        let monitors = vec![monitor(0, 0, 508, 286)];
        let raw = raw((1920, 1080), (508, 286), None);
        let screen = GeometryNormalizer::default().normalize(&monitors, &raw);

        assert_eq!((screen.dpi_x, screen.dpi_y), (96, 96));
        assert_eq!((screen.width_mm, screen.height_mm), (508, 286));
        assert_eq!(screen.workarea, Rect::full(1920, 1080));
        assert_eq!(screen.monitors, monitors);
    }

    #[test]
    fn zero_size_falls_back_to_monitor_mean() {
        let monitors = vec![monitor(0, 0, 600, 340), monitor(1, 1920, 400, 220)];
        let screen =
            GeometryNormalizer::default().normalize(&monitors, &raw((3840, 1080), (0, 0), None));

        assert_eq!((screen.width_mm, screen.height_mm), (500, 280));
        assert_eq!(screen.dpi_x, dpi(3840, 500.0));
        assert_eq!(screen.dpi_y, dpi(1080, 280.0));
    }

    #[test]
    fn zero_everywhere_assumes_96_dpi() {
        let monitors = vec![monitor(0, 0, 0, 0)];
        let screen =
            GeometryNormalizer::default().normalize(&monitors, &raw((1920, 1080), (0, 0), None));

        assert_eq!((screen.width_mm, screen.height_mm), (508, 286));
        assert_eq!((screen.dpi_x, screen.dpi_y), (96, 96));
    }

    #[test]
    fn no_monitors_goes_straight_to_96_dpi() {
        let screen = GeometryNormalizer::default().normalize(&[], &raw((1920, 1080), (1, 1), None));
        assert_eq!((screen.dpi_x, screen.dpi_y), (96, 96));
    }

    #[test]
    fn bounds_excluding_96_are_still_honored() {
        let normalizer = GeometryNormalizer::new(DpiBounds::new(150, 300).unwrap());
        let screen = normalizer.normalize(&[], &raw((1920, 1080), (0, 0), None));
        assert_eq!((screen.dpi_x, screen.dpi_y), (150, 150));
    }

    #[test]
    fn valid_workarea_overrides_full_screen() {
        let wa = Rect::new(0, 32, 1920, 1048);
        let screen =
            GeometryNormalizer::default().normalize(&[], &raw((1920, 1080), (508, 286), Some(wa)));
        assert_eq!(screen.workarea, wa);
    }

    #[test]
    fn workarea_past_screen_edge_is_replaced() {
        let wa = Rect::new(0, 32, 1920, 1080);
        let screen =
            GeometryNormalizer::default().normalize(&[], &raw((1920, 1080), (508, 286), Some(wa)));
        assert_eq!(screen.workarea, Rect::full(1920, 1080));
    }

    #[test]
    fn oversized_workarea_extent_is_replaced() {
        let wa = Rect::new(10, 0, i32::MAX, 100);
        let screen =
            GeometryNormalizer::default().normalize(&[], &raw((1920, 1080), (508, 286), Some(wa)));
        assert_eq!(screen.workarea, Rect::full(1920, 1080));
    }

    #[test]
    fn negative_workarea_extent_is_replaced() {
        let wa = Rect::new(100, 0, -50, 10);
        let screen =
            GeometryNormalizer::default().normalize(&[], &raw((1920, 1080), (508, 286), Some(wa)));
        assert_eq!(screen.workarea, Rect::full(1920, 1080));
    }

    #[test]
    fn tiny_root_never_scales_to_an_empty_screen() {
        let screen = GeometryNormalizer::default()
            .with_scale(3.0, 3.0)
            .normalize(&[], &raw((1, 1), (0, 0), None));
        assert_eq!((screen.width, screen.height), (1, 1));
        assert_eq!(screen.workarea, Rect::full(1, 1));
    }

    #[test]
    fn scale_applies_to_size_and_workarea() {
        let wa = Rect::new(0, 64, 3840, 2096);
        let screen = GeometryNormalizer::default()
            .with_scale(2.0, 2.0)
            .normalize(&[], &raw((3840, 2160), (600, 340), Some(wa)));
        assert_eq!((screen.width, screen.height), (1920, 1080));
        assert_eq!(screen.workarea, Rect::new(0, 32, 1920, 1048));
        // DPI comes from device pixels.
        assert_eq!(screen.dpi_x, dpi(3840, 600.0));
    }

    #[test]
    fn implausible_root_size_is_replaced() {
        assert_eq!(sanitize_root_size((0, 1080)), FALLBACK_ROOT_SIZE);
        assert_eq!(sanitize_root_size((40000, 1080)), FALLBACK_ROOT_SIZE);
        assert_eq!(sanitize_root_size((2560, 1440)), (2560, 1440));
    }
}
