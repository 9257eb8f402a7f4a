//! Rendering through the display server's toolkit surface.
//!
//! Needs a display connection but no render node; without one the toolkit
//! falls back to software rendering, which is reported as not accelerated.

use std::sync::Arc;

use displaykit_common::error::DisplaykitResult;
use displaykit_platform_linux::GpuEnvironment;

use super::framebuffer::{FramebufferWindow, SurfaceLimits, SUPPORTED_PIXEL_DEPTHS};
use super::{
    apply_blocklist, BackendHandle, BackendKind, BackendLoadError, ClientWindow, RenderBackend,
    WindowSpec,
};
use crate::capabilities::Capabilities;
use crate::host::HostContext;

const TOOLKIT_TEXTURE_SIZE: u32 = 8192;

pub struct GtkBackend {
    identifier: String,
    env: GpuEnvironment,
}

/// Loader registered in the backend table.
pub fn load(env: &GpuEnvironment) -> Result<BackendHandle, BackendLoadError> {
    let identifier = BackendKind::Gtk.identifier();
    if !env.has_display() {
        return Err(BackendLoadError::Unavailable {
            identifier,
            reason: "no display server connection".to_string(),
        });
    }
    Ok(Box::new(GtkBackend {
        identifier,
        env: env.clone(),
    }))
}

impl RenderBackend for GtkBackend {
    fn name(&self) -> &str {
        &self.identifier
    }

    fn check_support(&self, force_enable: bool) -> Capabilities {
        let accelerated = self.env.has_render_node() && self.env.render_node_accessible;
        let caps = Capabilities::new()
            .with("backend", BackendKind::Gtk.as_str())
            .with("platform", std::env::consts::OS)
            .with("display-mode", "toolkit")
            .with("display-server", self.env.display_server.as_str())
            .with("accelerated", accelerated)
            .with("max-texture-size", TOOLKIT_TEXTURE_SIZE)
            .with("pixel-depths", SUPPORTED_PIXEL_DEPTHS.to_vec())
            .with("safe", accelerated);
        apply_blocklist(&self.identifier, self.env.vendor, force_enable, caps)
    }

    fn create_window(
        &self,
        host: Arc<dyn HostContext>,
        spec: WindowSpec,
    ) -> DisplaykitResult<Box<dyn ClientWindow>> {
        tracing::debug!(backend = %self.identifier, ?spec, "Creating toolkit window");
        let limits = SurfaceLimits {
            max_texture_size: TOOLKIT_TEXTURE_SIZE,
        };
        Ok(Box::new(FramebufferWindow::new(host, spec, limits)))
    }
}
