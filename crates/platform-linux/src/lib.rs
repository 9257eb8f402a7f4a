//! displaykit Linux Platform Integration
//!
//! Platform-specific implementations for Linux:
//! - **Display Detection:** display server detection and a sysfs/EDID
//!   backed [`DisplaySource`](displaykit_platform_core::DisplaySource)
//! - **GPU Environment:** DRI render nodes, PCI vendor and kernel driver
//! - **Requirements:** environment checks and user guidance
//! - **Version Info:** caller-owned cache of component versions

pub mod display;
pub mod edid;
pub mod gpu;
pub mod permissions;
pub mod version;

pub use display::*;
pub use gpu::*;
