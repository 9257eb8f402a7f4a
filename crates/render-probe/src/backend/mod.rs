use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use displaykit_common::error::DisplaykitResult;
use displaykit_platform_core::Rect;
use displaykit_platform_linux::{GpuEnvironment, GpuVendor};
use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::host::HostContext;

pub mod framebuffer;
pub mod gtk;
pub mod native;

pub use framebuffer::{FramebufferWindow, ImageBuffer, PixelFormat, SurfaceLimits};
pub use gtk::GtkBackend;
pub use native::NativeBackend;

/// A loaded rendering backend.
pub trait RenderBackend: Send + Sync {
    /// Composed identifier, e.g. `linux.native`.
    fn name(&self) -> &str;

    /// Capabilities in this environment, empty when unusable.
    /// `force_enable` skips the driver blocklist.
    fn check_support(&self, force_enable: bool) -> Capabilities;

    /// Build a client window backed by this renderer.
    fn create_window(
        &self,
        host: Arc<dyn HostContext>,
        spec: WindowSpec,
    ) -> DisplaykitResult<Box<dyn ClientWindow>>;
}

pub type BackendHandle = Box<dyn RenderBackend>;

/// Called with `(success, message)` once a region has been painted.
pub type PaintCallback<'a> = Box<dyn FnOnce(bool, &str) + 'a>;

/// A client window drawn by a backend.
pub trait ClientWindow {
    /// Allocate the underlying surface.
    fn realize(&mut self) -> DisplaykitResult<()>;

    fn show(&mut self) -> DisplaykitResult<()>;

    /// Upload `image` into `region` and present it. `callback` is invoked
    /// through the host once presentation has been attempted.
    fn draw_region(
        &mut self,
        region: Rect,
        image: ImageBuffer,
        callback: PaintCallback<'_>,
    ) -> DisplaykitResult<()>;

    /// Error from the most recent present, if it failed.
    fn last_present_error(&self) -> Option<String>;

    /// Set once the user closed the window.
    fn is_closed(&self) -> bool {
        false
    }

    fn destroy(&mut self);
}

/// Window border decoration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBorder {
    pub shown: bool,
    /// RGBA in `0.0..=1.0`.
    pub color: (f32, f32, f32, f32),
    pub size: u32,
}

impl Default for WindowBorder {
    fn default() -> Self {
        Self {
            shown: false,
            color: (0.9, 0.1, 0.1, 0.6),
            size: 4,
        }
    }
}

/// Everything a backend needs to build a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub has_alpha: bool,
    pub border: WindowBorder,
    pub max_window_size: (u32, u32),
    /// `0` selects the backend default.
    pub pixel_depth: u32,
}

impl WindowSpec {
    pub fn geometry(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Failure to load a candidate backend. Never fatal to selection.
#[derive(Debug, thiserror::Error)]
pub enum BackendLoadError {
    #[error("unknown rendering backend '{name}'")]
    UnknownBackend { name: String },

    #[error("{identifier} is unavailable: {reason}")]
    Unavailable { identifier: String, reason: String },

    #[error("{identifier} failed to initialize: {reason}")]
    Init { identifier: String, reason: String },
}

/// Built-in backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Direct rendering through a DRI render node.
    Native,
    /// Rendering through the display server's toolkit surface.
    Gtk,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Gtk => "gtk",
        }
    }

    /// `"<platform>.<name>"` for the running platform.
    pub fn identifier(&self) -> String {
        format!("{}.{}", std::env::consts::OS, self.as_str())
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(BackendKind::Native),
            "gtk" => Ok(BackendKind::Gtk),
            _ => Err(BackendLoadError::UnknownBackend {
                name: s.to_string(),
            }),
        }
    }
}

/// Constructor of a backend kind.
pub type LoadFn = fn(&GpuEnvironment) -> Result<BackendHandle, BackendLoadError>;

/// Static mapping of backend kinds to their loaders.
pub const BACKEND_TABLE: &[(BackendKind, LoadFn)] = &[
    (BackendKind::Native, native::load),
    (BackendKind::Gtk, gtk::load),
];

/// Resolves candidate names to loaded backends.
pub trait BackendLoader {
    fn load(&self, name: &str) -> Result<BackendHandle, BackendLoadError>;
}

/// Loader backed by [`BACKEND_TABLE`] and a scanned GPU environment.
#[derive(Debug, Clone)]
pub struct StaticBackendTable {
    env: GpuEnvironment,
}

impl StaticBackendTable {
    pub fn new(env: GpuEnvironment) -> Self {
        Self { env }
    }

    /// Scan the live system.
    pub fn detect() -> Self {
        Self::new(GpuEnvironment::detect())
    }

    pub fn environment(&self) -> &GpuEnvironment {
        &self.env
    }
}

impl BackendLoader for StaticBackendTable {
    fn load(&self, name: &str) -> Result<BackendHandle, BackendLoadError> {
        let kind: BackendKind = name.parse()?;
        let load = BACKEND_TABLE
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, load)| *load)
            .ok_or_else(|| BackendLoadError::UnknownBackend {
                name: name.to_string(),
            })?;
        tracing::debug!(identifier = %kind.identifier(), "Loading rendering backend");
        load(&self.env)
    }
}

/// Driver blocklist shared by the built-in backends.
///
/// Virtual adapters get empty capabilities unless forced, and forced ones
/// are marked unsafe.
pub(crate) fn apply_blocklist(
    identifier: &str,
    vendor: Option<GpuVendor>,
    force_enable: bool,
    caps: Capabilities,
) -> Capabilities {
    match vendor {
        Some(vendor) if vendor.is_virtual() => {
            if !force_enable {
                tracing::warn!(
                    backend = %identifier,
                    vendor = %vendor.name(),
                    "Driver is blocklisted, use force-enable to override"
                );
                return Capabilities::new();
            }
            tracing::warn!(
                backend = %identifier,
                vendor = %vendor.name(),
                "Blocklisted driver enabled by force"
            );
            let mut caps = caps;
            caps.mark_unsafe();
            caps
        }
        _ => caps,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use displaykit_platform_core::DisplayServer;
    use std::path::PathBuf;

    pub(crate) fn environment(vendor: Option<GpuVendor>) -> GpuEnvironment {
        GpuEnvironment {
            display_server: DisplayServer::Wayland,
            render_nodes: vec![PathBuf::from("/dev/dri/renderD128")],
            vendor,
            driver: Some("i915".to_string()),
            render_node_accessible: true,
        }
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("native".parse::<BackendKind>().unwrap(), BackendKind::Native);
        assert_eq!(" GTK ".parse::<BackendKind>().unwrap(), BackendKind::Gtk);
        assert!(matches!(
            "vulkan".parse::<BackendKind>(),
            Err(BackendLoadError::UnknownBackend { .. })
        ));
    }

    #[test]
    fn identifier_is_platform_qualified() {
        assert_eq!(
            BackendKind::Native.identifier(),
            format!("{}.native", std::env::consts::OS)
        );
    }

    #[test]
    fn every_kind_has_a_loader() {
        for kind in [BackendKind::Native, BackendKind::Gtk] {
            assert!(BACKEND_TABLE.iter().any(|(k, _)| *k == kind));
        }
    }

    #[test]
    fn table_loads_by_name() {
        let table = StaticBackendTable::new(environment(Some(GpuVendor::Intel)));
        let backend = table.load("native").unwrap();
        assert!(backend.name().ends_with(".native"));
        assert!(table.load("vulkan").is_err());
    }

    #[test]
    fn blocklist_requires_force() {
        let caps = Capabilities::new().with("display-mode", "native");
        let blocked = apply_blocklist("linux.native", Some(GpuVendor::Qxl), false, caps.clone());
        assert!(blocked.is_empty());

        let forced = apply_blocklist("linux.native", Some(GpuVendor::Qxl), true, caps.clone());
        assert_eq!(forced.is_safe(), Some(false));

        let real = apply_blocklist("linux.native", Some(GpuVendor::Amd), false, caps.clone());
        assert_eq!(real, caps);
    }
}
