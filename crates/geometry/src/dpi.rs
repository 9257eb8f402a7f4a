//! DPI arithmetic and bounds.

use displaykit_common::config::GeometrySettings;
use displaykit_common::error::{DisplaykitError, DisplaykitResult};
use serde::{Deserialize, Serialize};

/// DPI assumed when no plausible physical size is available.
pub const FALLBACK_DPI: f64 = 96.0;

/// Inclusive range of plausible DPI values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpiBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for DpiBounds {
    fn default() -> Self {
        Self { min: 10, max: 500 }
    }
}

impl DpiBounds {
    pub fn new(min: i32, max: i32) -> DisplaykitResult<Self> {
        if min <= 0 || max <= 0 || min >= max {
            return Err(DisplaykitError::config(format!(
                "invalid DPI bounds {min}..{max}: need 0 < min < max"
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounds from settings, falling back to the defaults when the
    /// settings hold an invalid pair.
    pub fn from_settings(settings: &GeometrySettings) -> Self {
        let min = i32::try_from(settings.min_dpi).unwrap_or(i32::MAX);
        let max = i32::try_from(settings.max_dpi).unwrap_or(i32::MAX);
        Self::new(min, max).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default DPI bounds");
            Self::default()
        })
    }

    pub fn contains(&self, dpi: i32) -> bool {
        dpi >= self.min && dpi <= self.max
    }

    /// Both axes inside the bounds.
    pub fn accepts(&self, dpi_x: i32, dpi_y: i32) -> bool {
        self.contains(dpi_x) && self.contains(dpi_y)
    }

    pub fn clamp(&self, dpi: i32) -> i32 {
        dpi.clamp(self.min, self.max)
    }
}

/// `round(pixels * 254 / mm / 10)`, or `0` when `size_mm` is zero.
pub fn dpi(size_pixels: i32, size_mm: f64) -> i32 {
    if size_mm == 0.0 || !size_mm.is_finite() {
        return 0;
    }
    (size_pixels as f64 * 254.0 / size_mm / 10.0).round() as i32
}

/// Physical size implied by `pixels` at [`FALLBACK_DPI`].
pub fn mm_at_fallback_dpi(size_pixels: i32) -> f64 {
    (size_pixels as f64 * 25.4 / FALLBACK_DPI).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_panel_is_96_dpi() {
        assert_eq!(dpi(1920, 508.0), 96);
        assert_eq!(dpi(1080, 286.0), 96);
    }

    #[test]
    fn zero_millimeters_yield_zero_dpi() {
        assert_eq!(dpi(1920, 0.0), 0);
        assert_eq!(dpi(1920, f64::NAN), 0);
    }

    #[test]
    fn fallback_size_maps_back_to_96() {
        let mm = mm_at_fallback_dpi(2560);
        assert_eq!(mm, 677.0);
        assert_eq!(dpi(2560, mm), 96);
    }

    #[test]
    fn bounds_validation() {
        assert!(DpiBounds::new(10, 500).is_ok());
        assert!(DpiBounds::new(0, 500).is_err());
        assert!(DpiBounds::new(500, 10).is_err());
        let bounds = DpiBounds::default();
        assert!(bounds.accepts(96, 96));
        assert!(!bounds.accepts(96, 0));
        assert_eq!(bounds.clamp(9000), 500);
    }

    #[test]
    fn invalid_settings_fall_back_to_default_bounds() {
        let settings = GeometrySettings {
            min_dpi: 400,
            max_dpi: 100,
            prefer_monitor_workarea: true,
        };
        assert_eq!(DpiBounds::from_settings(&settings), DpiBounds::default());
    }
}
