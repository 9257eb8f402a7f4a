//! Component version information.
//!
//! Probing versions touches the filesystem and libc, so callers keep a
//! [`VersionInfoCache`] and pass it by reference; it is filled on first
//! use and never re-probed.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::ffi::CStr;

use crate::display::detect_display_server;

/// Version table keyed by component name.
pub type VersionInfo = BTreeMap<String, String>;

/// Caller-owned, lazily populated version table.
#[derive(Debug, Default)]
pub struct VersionInfoCache {
    info: OnceCell<VersionInfo>,
}

impl VersionInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached table, probing the live system on first call.
    pub fn get(&self) -> &VersionInfo {
        self.get_or_probe(probe_versions)
    }

    /// The cached table, filling it from `probe` on first call.
    pub fn get_or_probe<F>(&self, probe: F) -> &VersionInfo
    where
        F: FnOnce() -> VersionInfo,
    {
        self.info.get_or_init(probe)
    }

    pub fn is_populated(&self) -> bool {
        self.info.get().is_some()
    }
}

/// Probe versions of the components displaykit runs on.
pub fn probe_versions() -> VersionInfo {
    let mut info = VersionInfo::new();
    info.insert(
        "displaykit".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    info.insert(
        "display-server".to_string(),
        detect_display_server().as_str().to_string(),
    );
    if let Some((sysname, release)) = kernel_release() {
        info.insert("kernel".to_string(), format!("{sysname} {release}"));
    }
    if let Ok(drm) = std::fs::read_to_string("/sys/module/drm/version") {
        info.insert("drm".to_string(), drm.trim().to_string());
    }
    tracing::debug!(?info, "Probed component versions");
    info
}

fn kernel_release() -> Option<(String, String)> {
    // SAFETY: utsname is plain old data; uname fills it with NUL-terminated
    // strings when it returns 0.
    unsafe {
        let mut uts: libc::utsname = std::mem::zeroed();
        if libc::uname(&mut uts) != 0 {
            return None;
        }
        let sysname = CStr::from_ptr(uts.sysname.as_ptr()).to_string_lossy().into_owned();
        let release = CStr::from_ptr(uts.release.as_ptr()).to_string_lossy().into_owned();
        Some((sysname, release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn probe_runs_once() {
        let cache = VersionInfoCache::new();
        let calls = Cell::new(0);
        let probe = || {
            calls.set(calls.get() + 1);
            VersionInfo::from([("gl".to_string(), "4.6".to_string())])
        };

        assert!(!cache.is_populated());
        assert_eq!(cache.get_or_probe(probe)["gl"], "4.6");
        assert_eq!(cache.get_or_probe(probe)["gl"], "4.6");
        assert_eq!(calls.get(), 1);
        assert!(cache.is_populated());
    }

    #[test]
    fn live_probe_reports_own_version() {
        let info = probe_versions();
        assert_eq!(info["displaykit"], env!("CARGO_PKG_VERSION"));
        assert!(info.contains_key("display-server"));
    }
}
