//! Per-monitor collection from a display source.

use displaykit_common::config::GeometrySettings;
use displaykit_platform_core::{DisplaySource, Monitor, RawMonitor, Rect};

/// Reads every monitor of a [`DisplaySource`] into [`Monitor`] records.
#[derive(Debug, Clone)]
pub struct MonitorCollector {
    prefer_monitor_workarea: bool,
}

impl Default for MonitorCollector {
    fn default() -> Self {
        Self {
            prefer_monitor_workarea: true,
        }
    }
}

impl MonitorCollector {
    pub fn new(prefer_monitor_workarea: bool) -> Self {
        Self {
            prefer_monitor_workarea,
        }
    }

    pub fn from_settings(settings: &GeometrySettings) -> Self {
        Self::new(settings.prefer_monitor_workarea)
    }

    /// Collect all monitors, converting device pixels to logical units by
    /// dividing by `scale_x`/`scale_y` and rounding.
    pub fn collect(&self, source: &dyn DisplaySource, scale_x: f64, scale_y: f64) -> Vec<Monitor> {
        let count = source.monitor_count();

        let mut workareas = source.workareas().unwrap_or_default();
        if !workareas.is_empty() && workareas.len() != count {
            tracing::debug!(
                workareas = ?workareas,
                monitors = count,
                "Number of monitors does not match number of workareas, discarding them"
            );
            workareas.clear();
        }

        let mut monitors = Vec::with_capacity(count);
        for index in 0..count {
            let Some(raw) = source.monitor(index) else {
                tracing::warn!(index, "Monitor disappeared during collection");
                continue;
            };
            let listed = workareas.get(index).copied();
            monitors.push(self.collect_one(index, raw, listed, scale_x, scale_y));
        }
        monitors
    }

    fn collect_one(
        &self,
        index: usize,
        raw: RawMonitor,
        listed_workarea: Option<Rect>,
        scale_x: f64,
        scale_y: f64,
    ) -> Monitor {
        let manufacturer = normalize_vendor_field(raw.manufacturer);
        let model = normalize_vendor_field(raw.model);
        let name = monitor_display_name(&manufacturer, &model, index);

        let candidate = if self.prefer_monitor_workarea {
            raw.workarea.or(listed_workarea)
        } else {
            listed_workarea.or(raw.workarea)
        };
        let workarea = candidate.and_then(|w| valid_workarea(w, raw.geometry, scale_x, scale_y));

        tracing::trace!(
            index,
            name = %name,
            manufacturer = %manufacturer,
            model = %model,
            "Collected monitor"
        );

        let geometry = raw.geometry.scaled(scale_x, scale_y);
        Monitor {
            id: index as i32,
            name,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            width_mm: raw.width_mm,
            height_mm: raw.height_mm,
            manufacturer,
            model,
            is_primary: raw.is_primary,
            scale_factor: raw.scale_factor,
            refresh_rate: raw.refresh_rate.filter(|hz| hz.is_finite() && *hz > 0.0),
            workarea,
        }
    }
}

/// Map absent values and the `"unknown"` sentinel to an empty string.
pub fn normalize_vendor_field(value: Option<String>) -> String {
    match value {
        Some(v) if v.trim() != "unknown" => v.trim().to_string(),
        _ => String::new(),
    }
}

/// `"manufacturer model"`, then `"manufacturer"`, then `"model"`, then the
/// monitor index.
pub fn monitor_display_name(manufacturer: &str, model: &str, index: usize) -> String {
    match (manufacturer.is_empty(), model.is_empty()) {
        (false, false) => format!("{manufacturer} {model}"),
        (false, true) => manufacturer.to_string(),
        (true, false) => model.to_string(),
        (true, true) => index.to_string(),
    }
}

/// Scale `workarea` to logical units if it lies inside `geometry`, both in
/// device pixels and after scaling; `None` otherwise.
pub fn valid_workarea(workarea: Rect, geometry: Rect, scale_x: f64, scale_y: f64) -> Option<Rect> {
    let scaled = workarea.scaled(scale_x, scale_y);
    if workarea.is_within(&geometry) && scaled.is_within(&geometry.scaled(scale_x, scale_y)) {
        Some(scaled)
    } else {
        tracing::debug!(workarea = ?workarea, monitor = ?geometry, "Discarding invalid workarea");
        None
    }
}
