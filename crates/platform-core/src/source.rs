//! Display server query contract.
//!
//! A [`DisplaySource`] is the only way the geometry code talks to a display
//! server. Values are raw: sizes in device pixels, physical sizes in
//! millimeters, and nothing is validated. [`StaticDisplay`] is a
//! fixture-backed implementation used by tests and the `--fixture` CLI mode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Rect;

/// Raw per-monitor data as reported by a display server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMonitor {
    /// Geometry in device pixels.
    pub geometry: Rect,
    #[serde(default)]
    pub width_mm: i32,
    #[serde(default)]
    pub height_mm: i32,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// Refresh rate in Hz.
    #[serde(default)]
    pub refresh_rate: Option<f64>,
    /// Workarea the monitor reports for itself, in device pixels.
    #[serde(default)]
    pub workarea: Option<Rect>,
}

fn default_scale_factor() -> f64 {
    1.0
}

impl RawMonitor {
    /// A monitor with only geometry and physical size known.
    pub fn new(geometry: Rect, width_mm: i32, height_mm: i32) -> Self {
        Self {
            geometry,
            width_mm,
            height_mm,
            manufacturer: None,
            model: None,
            is_primary: false,
            scale_factor: 1.0,
            refresh_rate: None,
            workarea: None,
        }
    }
}

/// Narrow query interface to a display server.
pub trait DisplaySource {
    /// Name of the display connection (e.g. `":0"`).
    fn display_name(&self) -> String;

    /// Number of monitors currently connected.
    fn monitor_count(&self) -> usize;

    /// Raw data for monitor `index`, `None` when the index is out of range
    /// or the monitor vanished between calls.
    fn monitor(&self, index: usize) -> Option<RawMonitor>;

    /// Root screen size in device pixels.
    fn screen_size(&self) -> (i32, i32);

    /// Root screen physical size in millimeters, `(0, 0)` when unknown.
    fn screen_size_mm(&self) -> (i32, i32);

    /// Display-wide workarea in device pixels.
    fn workarea(&self) -> Option<Rect> {
        None
    }

    /// Per-monitor workarea list in device pixels, in monitor order.
    fn workareas(&self) -> Option<Vec<Rect>> {
        None
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        None
    }

    fn input_device_count(&self) -> Option<usize> {
        None
    }

    fn default_cursor_size(&self) -> Option<u32> {
        None
    }

    fn maximal_cursor_size(&self) -> Option<(u32, u32)> {
        None
    }

    /// Vertical refresh of the display in Hz.
    fn vertical_refresh(&self) -> Option<u32> {
        None
    }

    /// Double-click interval in milliseconds.
    fn double_click_time(&self) -> Option<u32> {
        None
    }

    /// Double-click distance in pixels.
    fn double_click_distance(&self) -> Option<(u32, u32)> {
        None
    }
}

/// Fixture-backed display source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticDisplay {
    #[serde(default = "default_display_name")]
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub width_mm: i32,
    #[serde(default)]
    pub height_mm: i32,
    #[serde(default)]
    pub monitors: Vec<RawMonitor>,
    #[serde(default)]
    pub workarea: Option<Rect>,
    #[serde(default)]
    pub workareas: Option<Vec<Rect>>,
    #[serde(default)]
    pub pointer: Option<(i32, i32)>,
    #[serde(default)]
    pub input_devices: Option<usize>,
    #[serde(default)]
    pub default_cursor_size: Option<u32>,
    #[serde(default)]
    pub maximal_cursor_size: Option<(u32, u32)>,
    #[serde(default)]
    pub vertical_refresh: Option<u32>,
    #[serde(default)]
    pub double_click_time: Option<u32>,
    #[serde(default)]
    pub double_click_distance: Option<(u32, u32)>,
}

fn default_display_name() -> String {
    ":0".to_string()
}

impl StaticDisplay {
    /// A display of the given size with physical size and monitors attached.
    pub fn new(width: i32, height: i32, width_mm: i32, height_mm: i32) -> Self {
        Self {
            name: default_display_name(),
            width,
            height,
            width_mm,
            height_mm,
            monitors: Vec::new(),
            workarea: None,
            workareas: None,
            pointer: None,
            input_devices: None,
            default_cursor_size: None,
            maximal_cursor_size: None,
            vertical_refresh: None,
            double_click_time: None,
            double_click_distance: None,
        }
    }

    pub fn with_monitor(mut self, monitor: RawMonitor) -> Self {
        self.monitors.push(monitor);
        self
    }

    pub fn with_workarea(mut self, workarea: Rect) -> Self {
        self.workarea = Some(workarea);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(std::io::Error::other)
    }
}

impl DisplaySource for StaticDisplay {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    fn monitor(&self, index: usize) -> Option<RawMonitor> {
        self.monitors.get(index).cloned()
    }

    fn screen_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn screen_size_mm(&self) -> (i32, i32) {
        (self.width_mm, self.height_mm)
    }

    fn workarea(&self) -> Option<Rect> {
        self.workarea
    }

    fn workareas(&self) -> Option<Vec<Rect>> {
        self.workareas.clone()
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        self.pointer
    }

    fn input_device_count(&self) -> Option<usize> {
        self.input_devices
    }

    fn default_cursor_size(&self) -> Option<u32> {
        self.default_cursor_size
    }

    fn maximal_cursor_size(&self) -> Option<(u32, u32)> {
        self.maximal_cursor_size
    }

    fn vertical_refresh(&self) -> Option<u32> {
        self.vertical_refresh
    }

    fn double_click_time(&self) -> Option<u32> {
        self.double_click_time
    }

    fn double_click_distance(&self) -> Option<(u32, u32)> {
        self.double_click_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_json_fills_defaults() {
        let display = StaticDisplay::from_json(
            r#"{
                "width": 3840,
                "height": 1080,
                "monitors": [
                    {"geometry": {"x": 0, "y": 0, "width": 1920, "height": 1080},
                     "width_mm": 508, "height_mm": 286, "manufacturer": "DEL"},
                    {"geometry": {"x": 1920, "y": 0, "width": 1920, "height": 1080}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(display.display_name(), ":0");
        assert_eq!(display.monitor_count(), 2);
        assert_eq!(display.screen_size_mm(), (0, 0));
        let second = display.monitor(1).unwrap();
        assert_eq!(second.scale_factor, 1.0);
        assert_eq!(second.manufacturer, None);
        assert!(display.monitor(2).is_none());
    }
}
