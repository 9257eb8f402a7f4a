//! Direct rendering through a DRI render node.

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

/// Texture size assumed for hardware adapters.
const HARDWARE_TEXTURE_SIZE: u32 = 16384;
/// Texture size assumed for virtual adapters.
const VIRTUAL_TEXTURE_SIZE: u32 = 8192;

pub struct NativeBackend {
    identifier: String,
    env: GpuEnvironment,
}

/// Loader registered in the backend table.
pub fn load(env: &GpuEnvironment) -> Result<BackendHandle, BackendLoadError> {
    let identifier = BackendKind::Native.identifier();
    let Some(node) = env.render_nodes.first() else {
        return Err(BackendLoadError::Unavailable {
            identifier,
            reason: "no DRI render node found".to_string(),
        });
    };
    if !env.render_node_accessible {
        return Err(BackendLoadError::Init {
            identifier,
            reason: format!("cannot open {} for reading and writing", node.display()),
        });
    }
    Ok(Box::new(NativeBackend {
        identifier,
        env: env.clone(),
    }))
}

impl NativeBackend {
    fn limits(&self) -> SurfaceLimits {
        let max_texture_size = match self.env.vendor {
            Some(vendor) if vendor.is_virtual() => VIRTUAL_TEXTURE_SIZE,
            _ => HARDWARE_TEXTURE_SIZE,
        };
        SurfaceLimits { max_texture_size }
    }
}

impl RenderBackend for NativeBackend {
    fn name(&self) -> &str {
        &self.identifier
    }

    fn check_support(&self, force_enable: bool) -> Capabilities {
        let vendor = self.env.vendor.map(|v| v.name());
        let render_node = self
            .env
            .render_nodes
            .first()
            .map(|p| p.display().to_string());
        let caps = Capabilities::new()
            .with("backend", BackendKind::Native.as_str())
            .with("platform", std::env::consts::OS)
            .with("display-mode", "native")
            .with("renderer", self.env.driver.clone().unwrap_or_else(|| "unknown".into()))
            .with("vendor", vendor.unwrap_or_else(|| "unknown".into()))
            .with("render-node", render_node.unwrap_or_default())
            .with("max-texture-size", self.limits().max_texture_size)
            .with("pixel-depths", SUPPORTED_PIXEL_DEPTHS.to_vec())
            .with("safe", true);
        apply_blocklist(&self.identifier, self.env.vendor, force_enable, caps)
    }

    fn create_window(
        &self,
        host: Arc<dyn HostContext>,
        spec: WindowSpec,
    ) -> DisplaykitResult<Box<dyn ClientWindow>> {
        tracing::debug!(backend = %self.identifier, ?spec, "Creating native window");
        Ok(Box::new(FramebufferWindow::new(host, spec, self.limits())))
    }
}
