//! Display information report.

use displaykit_platform_core::{scale_round, DisplaySource, Monitor, Rect};
use serde::{Deserialize, Serialize};

use crate::collector::MonitorCollector;
use crate::normalizer::sanitize_root_size;

/// Platform-level hints a display server may expose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformHints {
    /// Display-wide workarea in logical units.
    pub workarea: Option<Rect>,
    /// Vertical refresh in Hz.
    pub vertical_refresh: Option<u32>,
    /// Double-click interval in milliseconds.
    pub double_click_time: Option<u32>,
    /// Double-click distance in pixels.
    pub double_click_distance: Option<(u32, u32)>,
}

/// Everything known about a display, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub name: String,
    /// Root window size in logical units.
    pub root_size: (i32, i32),
    pub screens: usize,
    /// Pointer position in logical units.
    pub pointer: Option<(i32, i32)>,
    pub input_devices: Option<usize>,
    pub default_cursor_size: Option<u32>,
    pub maximal_cursor_size: Option<(u32, u32)>,
    pub monitors: Vec<Monitor>,
    pub platform: PlatformHints,
}

/// Build a [`DisplayInfo`] report for `source`.
pub fn collect_display_info(
    source: &dyn DisplaySource,
    collector: &MonitorCollector,
    scale_x: f64,
    scale_y: f64,
) -> DisplayInfo {
    let (w, h) = sanitize_root_size(source.screen_size());
    let xy = |(x, y): (i32, i32)| (scale_round(x, scale_x), scale_round(y, scale_y));

    DisplayInfo {
        name: source.display_name(),
        root_size: xy((w, h)),
        screens: 1,
        pointer: source.pointer_position().map(xy),
        input_devices: source.input_device_count(),
        default_cursor_size: source.default_cursor_size(),
        maximal_cursor_size: source.maximal_cursor_size(),
        monitors: collector.collect(source, scale_x, scale_y),
        platform: PlatformHints {
            workarea: source.workarea().map(|r| r.scaled(scale_x, scale_y)),
            vertical_refresh: source.vertical_refresh(),
            double_click_time: source.double_click_time(),
            double_click_distance: source.double_click_distance(),
        },
    }
}
