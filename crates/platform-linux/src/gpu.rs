//! GPU environment scan.
//!
//! Collects what rendering backends need to decide whether they can run:
//! the display server, DRI render nodes, and the PCI vendor and kernel
//! driver behind the first render node.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use displaykit_platform_core::DisplayServer;
use serde::{Deserialize, Serialize};

use crate::display::detect_display_server;

/// Default device directory holding render nodes.
pub const DRI_DEV_ROOT: &str = "/dev/dri";

/// GPU vendor identification from the PCI vendor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuVendor {
    Intel,
    Amd,
    Nvidia,
    /// VirtIO virtual GPU
    VirtIO,
    /// QXL virtual GPU
    Qxl,
    /// VMware SVGA virtual GPU
    VMware,
    Other(u16),
}

impl GpuVendor {
    pub fn from_pci_id(id: u16) -> Self {
        match id {
            0x8086 => GpuVendor::Intel,
            0x1002 => GpuVendor::Amd,
            0x10de => GpuVendor::Nvidia,
            0x1af4 => GpuVendor::VirtIO,
            0x1b36 => GpuVendor::Qxl,
            0x15ad => GpuVendor::VMware,
            other => GpuVendor::Other(other),
        }
    }

    /// Virtual adapters whose GL stacks are known to misbehave.
    pub fn is_virtual(&self) -> bool {
        matches!(self, GpuVendor::VirtIO | GpuVendor::Qxl | GpuVendor::VMware)
    }

    pub fn name(&self) -> String {
        match self {
            GpuVendor::Intel => "Intel".to_string(),
            GpuVendor::Amd => "AMD".to_string(),
            GpuVendor::Nvidia => "NVIDIA".to_string(),
            GpuVendor::VirtIO => "VirtIO".to_string(),
            GpuVendor::Qxl => "QXL".to_string(),
            GpuVendor::VMware => "VMware".to_string(),
            GpuVendor::Other(id) => format!("{id:#06x}"),
        }
    }
}

/// Snapshot of the rendering environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuEnvironment {
    pub display_server: DisplayServer,
    /// Render nodes found, e.g. `/dev/dri/renderD128`.
    pub render_nodes: Vec<PathBuf>,
    pub vendor: Option<GpuVendor>,
    /// Kernel driver bound to the first render node (e.g. `i915`).
    pub driver: Option<String>,
    /// Whether the current user can open the first render node read/write.
    pub render_node_accessible: bool,
}

impl GpuEnvironment {
    /// Scan the live system.
    pub fn detect() -> Self {
        Self::detect_in(
            Path::new(DRI_DEV_ROOT),
            Path::new(crate::display::DRM_SYSFS_ROOT),
            detect_display_server(),
        )
    }

    /// Scan render nodes under `dev_root` and their sysfs data under
    /// `sys_root`.
    pub fn detect_in(dev_root: &Path, sys_root: &Path, display_server: DisplayServer) -> Self {
        let mut render_nodes: Vec<PathBuf> = std::fs::read_dir(dev_root)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with("renderD"))
                    })
                    .collect()
            })
            .unwrap_or_default();
        render_nodes.sort();

        let first = render_nodes.first();
        let node_sysfs = first
            .and_then(|node| node.file_name())
            .map(|name| sys_root.join(name).join("device"));

        let vendor = node_sysfs
            .as_ref()
            .and_then(|dir| std::fs::read_to_string(dir.join("vendor")).ok())
            .and_then(|raw| parse_pci_id(&raw))
            .map(GpuVendor::from_pci_id);

        let driver = node_sysfs
            .as_ref()
            .and_then(|dir| std::fs::read_link(dir.join("driver")).ok())
            .and_then(|link| link.file_name().map(|n| n.to_string_lossy().into_owned()));

        let render_node_accessible = first.is_some_and(|node| is_read_writable(node));

        let env = Self {
            display_server,
            render_nodes,
            vendor,
            driver,
            render_node_accessible,
        };
        tracing::debug!(?env, "Scanned GPU environment");
        env
    }

    pub fn has_render_node(&self) -> bool {
        !self.render_nodes.is_empty()
    }

    pub fn has_display(&self) -> bool {
        self.display_server != DisplayServer::Unknown
    }
}

fn parse_pci_id(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    u16::from_str_radix(hex, 16).ok()
}

/// `access(2)` check for read and write permission.
pub fn is_read_writable(path: &Path) -> bool {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: cpath is a valid NUL-terminated string for the call's duration.
    unsafe { libc::access(cpath.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_ids_map_to_known_vendors() {
        assert_eq!(GpuVendor::from_pci_id(0x8086), GpuVendor::Intel);
        assert_eq!(GpuVendor::from_pci_id(0x1af4), GpuVendor::VirtIO);
        assert!(GpuVendor::from_pci_id(0x1b36).is_virtual());
        assert!(!GpuVendor::from_pci_id(0x10de).is_virtual());
        assert_eq!(GpuVendor::from_pci_id(0x1234).name(), "0x1234");
    }

    #[test]
    fn pci_id_parsing_accepts_sysfs_format() {
        assert_eq!(parse_pci_id("0x8086\n"), Some(0x8086));
        assert_eq!(parse_pci_id("10de"), Some(0x10de));
        assert_eq!(parse_pci_id("nope"), None);
    }

    #[test]
    fn scan_reads_vendor_and_driver() {
        let base = std::env::temp_dir().join(format!("displaykit-gpu-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&base);
        let dev = base.join("dev");
        let sys = base.join("sys");
        let device = sys.join("renderD128").join("device");
        std::fs::create_dir_all(&dev).unwrap();
        std::fs::create_dir_all(&device).unwrap();
        std::fs::create_dir_all(base.join("drivers").join("virtio-pci")).unwrap();
        std::fs::write(dev.join("renderD128"), b"").unwrap();
        std::fs::write(dev.join("card0"), b"").unwrap();
        std::fs::write(device.join("vendor"), "0x1af4\n").unwrap();
        std::os::unix::fs::symlink(
            base.join("drivers").join("virtio-pci"),
            device.join("driver"),
        )
        .unwrap();

        let env = GpuEnvironment::detect_in(&dev, &sys, DisplayServer::X11);
        assert_eq!(env.render_nodes, vec![dev.join("renderD128")]);
        assert_eq!(env.vendor, Some(GpuVendor::VirtIO));
        assert_eq!(env.driver.as_deref(), Some("virtio-pci"));
        assert!(env.render_node_accessible);
        assert!(env.has_display());

        std::fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn scan_of_empty_system_finds_nothing() {
        let missing = std::env::temp_dir().join("displaykit-gpu-definitely-missing");
        let env = GpuEnvironment::detect_in(&missing, &missing, DisplayServer::Unknown);
        assert!(!env.has_render_node());
        assert!(!env.has_display());
        assert_eq!(env.vendor, None);
        assert!(!env.render_node_accessible);
    }
}
