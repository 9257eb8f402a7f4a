//! displaykit platform core contracts.
//!
//! This crate contains the cross-platform display data structures and the
//! narrow query interface a display server is accessed through, so that the
//! geometry and probing crates never couple to a concrete OS backend.

pub mod source;

pub use source::*;

use serde::{Deserialize, Serialize};

/// A plain rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn full(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge, widened so huge extents cannot overflow.
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `self` is non-empty and every edge lies inside `bounds`
    /// (edges inclusive).
    pub fn is_within(&self, bounds: &Rect) -> bool {
        !self.is_empty()
            && self.x >= bounds.x
            && self.y >= bounds.y
            && self.right() <= bounds.right()
            && self.bottom() <= bounds.bottom()
    }

    /// Convert device pixels to logical units, rounding each component.
    pub fn scaled(&self, scale_x: f64, scale_y: f64) -> Rect {
        Rect {
            x: scale_round(self.x, scale_x),
            y: scale_round(self.y, scale_y),
            width: scale_round(self.width, scale_x),
            height: scale_round(self.height, scale_y),
        }
    }
}

/// Divide a device pixel value by `scale` and round to the nearest integer.
///
/// A non-positive or non-finite scale leaves the value untouched.
pub fn scale_round(value: i32, scale: f64) -> i32 {
    if !scale.is_finite() || scale <= 0.0 {
        return value;
    }
    (value as f64 / scale).round() as i32
}

/// A connected monitor, as seen after collection.
///
/// Geometry is in logical units; physical sizes are in millimeters as
/// reported by the display server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Index in the display server's monitor list.
    pub id: i32,
    /// Display name (see `monitor_display_name`).
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub width_mm: i32,
    pub height_mm: i32,
    pub manufacturer: String,
    pub model: String,
    pub is_primary: bool,
    /// Scale factor (for example 1.0, 1.25, 2.0).
    pub scale_factor: f64,
    /// Refresh rate in Hz.
    pub refresh_rate: Option<f64>,
    /// Area usable for window placement, always inside the monitor.
    pub workarea: Option<Rect>,
}

/// One coherent screen: the normalized result of a geometry query.
///
/// `dpi_x`/`dpi_y` are always inside the configured DPI bounds and
/// `workarea` always fits inside `[0, width] x [0, height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub width_mm: i32,
    pub height_mm: i32,
    pub monitors: Vec<Monitor>,
    pub workarea: Rect,
    pub dpi_x: i32,
    pub dpi_y: i32,
}

/// Display server / platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayServer {
    Wayland,
    X11,
    #[default]
    Unknown,
}

impl DisplayServer {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayServer::Wayland => "wayland",
            DisplayServer::X11 => "x11",
            DisplayServer::Unknown => "unknown",
        }
    }
}

/// Compute the bounding box of all rectangles.
/// Returns `Rect::full(1920, 1080)` for an empty slice.
pub fn virtual_desktop_bounds(rects: &[Rect]) -> Rect {
    if rects.is_empty() {
        return Rect::full(1920, 1080);
    }

    let min_x = rects.iter().map(|r| r.x).min().unwrap_or(0);
    let min_y = rects.iter().map(|r| r.y).min().unwrap_or(0);
    let max_x = rects.iter().map(Rect::right).max().unwrap_or(1920);
    let max_y = rects.iter().map(Rect::bottom).max().unwrap_or(1080);

    Rect::new(
        min_x,
        min_y,
        extent(max_x - i64::from(min_x)),
        extent(max_y - i64::from(min_y)),
    )
}

fn extent(span: i64) -> i32 {
    i32::try_from(span).unwrap_or(i32::MAX).max(1)
}
