//! Display server detection and a DRM/sysfs backed display source.
//!
//! Connected connectors are read from `/sys/class/drm/card*-*`. sysfs does
//! not know where the compositor placed each output, so monitors are laid
//! out left to right in connector order, the first one being primary.

use std::path::{Path, PathBuf};

use displaykit_common::error::{DisplaykitError, DisplaykitResult};
use displaykit_platform_core::{
    virtual_desktop_bounds, DisplayServer, DisplaySource, RawMonitor, Rect,
};

use crate::edid::parse_edid;

/// Default sysfs DRM class directory.
pub const DRM_SYSFS_ROOT: &str = "/sys/class/drm";

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    display_server_from(|key| std::env::var(key).ok())
}

/// Detect the display server from an environment lookup.
pub fn display_server_from<F>(lookup: F) -> DisplayServer
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());
    if set("WAYLAND_DISPLAY") {
        DisplayServer::Wayland
    } else if set("DISPLAY") {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

/// Name of the current display connection, `"unknown"` without one.
pub fn display_connection_name() -> String {
    std::env::var("WAYLAND_DISPLAY")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var("DISPLAY").ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Display source built from DRM connector data in sysfs.
#[derive(Debug, Clone)]
pub struct DrmDisplaySource {
    name: String,
    monitors: Vec<RawMonitor>,
}

impl DrmDisplaySource {
    /// Scan the default sysfs location.
    pub fn scan() -> DisplaykitResult<Self> {
        Self::scan_root(Path::new(DRM_SYSFS_ROOT), display_connection_name())
    }

    /// Scan connectors under `root`.
    pub fn scan_root(root: &Path, name: String) -> DisplaykitResult<Self> {
        let entries = std::fs::read_dir(root).map_err(|e| {
            DisplaykitError::platform(format!("Cannot read DRM sysfs at {}: {e}", root.display()))
        })?;

        let mut connectors: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_connector_dir(path))
            .collect();
        connectors.sort();

        let mut monitors = Vec::new();
        let mut next_x = 0;
        for connector in &connectors {
            let Some(mut monitor) = read_connector(connector) else {
                continue;
            };
            monitor.geometry.x = next_x;
            monitor.is_primary = monitors.is_empty();
            next_x += monitor.geometry.width;
            tracing::debug!(
                connector = %connector.display(),
                geometry = ?monitor.geometry,
                width_mm = monitor.width_mm,
                height_mm = monitor.height_mm,
                "Found connected monitor"
            );
            monitors.push(monitor);
        }

        Ok(Self { name, monitors })
    }

    pub fn monitors(&self) -> &[RawMonitor] {
        &self.monitors
    }
}

fn is_connector_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("card") && n.contains('-'))
}

fn read_connector(dir: &Path) -> Option<RawMonitor> {
    let status = std::fs::read_to_string(dir.join("status")).ok()?;
    if status.trim() != "connected" {
        return None;
    }

    let edid = match std::fs::read(dir.join("edid")) {
        Ok(bytes) if !bytes.is_empty() => match parse_edid(&bytes) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(connector = %dir.display(), error = %e, "Ignoring unreadable EDID");
                None
            }
        },
        _ => None,
    };

    let mode = std::fs::read_to_string(dir.join("modes"))
        .ok()
        .and_then(|modes| modes.lines().next().and_then(parse_mode))
        .or_else(|| edid.as_ref().and_then(|info| info.preferred_mode));
    let Some((width, height)) = mode else {
        tracing::debug!(connector = %dir.display(), "Connected connector without a mode");
        return None;
    };

    let mut monitor = RawMonitor::new(Rect::new(0, 0, width, height), 0, 0);
    if let Some(info) = edid {
        monitor.width_mm = info.width_mm;
        monitor.height_mm = info.height_mm;
        monitor.manufacturer = Some(info.manufacturer);
        monitor.model = info.name;
        monitor.refresh_rate = info.refresh_rate;
    }
    Some(monitor)
}

/// Parse a DRM mode line such as `1920x1080` or `1920x1080i`.
fn parse_mode(line: &str) -> Option<(i32, i32)> {
    let (w, h) = line.trim().split_once('x')?;
    let h: String = h.chars().take_while(|c| c.is_ascii_digit()).collect();
    let w = w.parse::<i32>().ok()?;
    let h = h.parse::<i32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

impl DisplaySource for DrmDisplaySource {
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
        let rects: Vec<Rect> = self.monitors.iter().map(|m| m.geometry).collect();
        let bounds = virtual_desktop_bounds(&rects);
        (bounds.width, bounds.height)
    }

    /// sysfs has no notion of a root screen; its physical size is unknown.
    fn screen_size_mm(&self) -> (i32, i32) {
        (0, 0)
    }

    fn vertical_refresh(&self) -> Option<u32> {
        self.monitors
            .iter()
            .find(|m| m.is_primary)
            .and_then(|m| m.refresh_rate)
            .map(|hz| hz.round() as u32)
    }
}
