//! displaykit Geometry
//!
//! Turns raw, possibly inconsistent display server measurements into one
//! trustworthy [`Screen`](displaykit_platform_core::Screen) record:
//!
//! ```text
//!  DisplaySource ──► MonitorCollector ──► GeometryNormalizer ──► Screen
//!                    (scale, names,       (workarea check,
//!                     workarea check)      three-tier DPI fallback)
//! ```
//!
//! Implausible values are repaired locally and logged; nothing here
//! returns an error for bad measurements.

pub mod collector;
pub mod dpi;
pub mod info;
pub mod normalizer;

pub use collector::*;
pub use dpi::*;
pub use info::*;
pub use normalizer::*;

use displaykit_common::config::GeometrySettings;
use displaykit_platform_core::{DisplaySource, Screen};

/// Collect monitors from `source` and normalize them into a [`Screen`].
pub fn query_screen(
    source: &dyn DisplaySource,
    settings: &GeometrySettings,
    scale_x: f64,
    scale_y: f64,
) -> Screen {
    let collector = MonitorCollector::from_settings(settings);
    let monitors = collector.collect(source, scale_x, scale_y);
    let normalizer = GeometryNormalizer::from_settings(settings).with_scale(scale_x, scale_y);
    normalizer.normalize(&monitors, &RawScreen::from_source(source))
}
