//! Combined acceleration check: selection followed by a self-test.

use std::time::Duration;

use chrono::{DateTime, Utc};
use displaykit_common::config::RenderSettings;
use serde::{Deserialize, Serialize};

use crate::backend::BackendLoader;
use crate::capabilities::Capabilities;
use crate::probe::select;
use crate::registry::{backends_from_option, BackendCandidate};
use crate::self_test::{self, InteractiveOptions, SelfTestMode, SelfTestResult};

/// How long an interactive check keeps its window up by default.
pub const DEFAULT_SHOW_DURATION: Duration = Duration::from_secs(3);

/// Inputs of [`check_acceleration`].
pub struct GlCheckOptions {
    pub candidates: Vec<BackendCandidate>,
    pub force_enable: bool,
    pub max_window_size: (u32, u32),
    pub pixel_depth: u32,
    pub mode: SelfTestMode,
}

impl GlCheckOptions {
    /// Headless options from the render settings.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            candidates: backends_from_option(&settings.backends),
            force_enable: settings.force_enable,
            max_window_size: settings.max_window_size,
            pixel_depth: settings.pixel_depth,
            mode: SelfTestMode::Headless,
        }
    }

    /// Show the test window for `duration`, repainting every
    /// `repaint_delay_ms` of `settings`.
    pub fn shown(mut self, settings: &RenderSettings, duration: Duration) -> Self {
        self.mode = SelfTestMode::Interactive(InteractiveOptions::for_duration(
            Duration::from_millis(settings.repaint_delay_ms),
            duration,
        ));
        self
    }
}

/// Answer to "can we use GPU acceleration, and with what confidence".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelerationReport {
    pub capabilities: Capabilities,
    /// Identifier of the selected backend.
    pub backend: Option<String>,
    pub self_test: Option<SelfTestResult>,
    pub checked_at: DateTime<Utc>,
}

impl AccelerationReport {
    /// A backend was selected and its self-test passed.
    pub fn is_usable(&self) -> bool {
        self.backend.is_some() && self.self_test.as_ref().is_some_and(|r| r.success)
    }
}

/// Select a backend and validate it with a self-test.
///
/// The self-test message is merged into the capabilities and a failed test
/// marks them unsafe. When no backend is usable the capabilities stay empty
/// and no self-test runs.
pub fn check_acceleration(
    loader: &dyn BackendLoader,
    options: GlCheckOptions,
) -> AccelerationReport {
    let (mut capabilities, backend) = select(loader, &options.candidates, options.force_enable);

    let Some(backend) = backend else {
        return AccelerationReport {
            capabilities,
            backend: None,
            self_test: None,
            checked_at: Utc::now(),
        };
    };

    let result = self_test::run(
        backend.as_ref(),
        options.max_window_size,
        options.pixel_depth,
        options.mode,
    );
    capabilities.insert("message", result.message.clone());
    if !result.success {
        tracing::warn!(
            backend = %backend.name(),
            error = %result.message,
            "Backend failed its self-test, marking it unsafe"
        );
        capabilities.mark_unsafe();
    }

    AccelerationReport {
        capabilities,
        backend: Some(backend.name().to_string()),
        self_test: Some(result),
        checked_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::environment;
    use crate::backend::StaticBackendTable;
    use crate::registry::candidates;
    use displaykit_platform_linux::GpuVendor;

    fn options(names: &[&str], pixel_depth: u32) -> GlCheckOptions {
        GlCheckOptions {
            candidates: candidates(names.iter().copied()),
            force_enable: false,
            max_window_size: (1024, 1024),
            pixel_depth,
            mode: SelfTestMode::Headless,
        }
    }

    #[test]
    fn healthy_native_backend_passes() {
        let table = StaticBackendTable::new(environment(Some(GpuVendor::Amd)));
        let report = check_acceleration(&table, options(&["native"], 24));
        assert!(report.is_usable());
        assert_eq!(report.capabilities.is_safe(), Some(true));
        assert_eq!(report.capabilities.get("message").unwrap(), "");
    }

    #[test]
    fn failed_self_test_marks_unsafe() {
        let table = StaticBackendTable::new(environment(Some(GpuVendor::Amd)));
        let report = check_acceleration(&table, options(&["native"], 8));
        assert!(!report.is_usable());
        assert_eq!(report.capabilities.is_safe(), Some(false));
        let message = report.capabilities.get("message").unwrap().as_str().unwrap();
        assert!(message.starts_with("failed to present"));
    }

    #[test]
    fn nothing_usable_leaves_capabilities_empty() {
        let table = StaticBackendTable::new(environment(Some(GpuVendor::Qxl)));
        let report = check_acceleration(&table, options(&["native", "gtk"], 24));
        assert!(report.capabilities.is_empty());
        assert!(report.backend.is_none());
        assert!(report.self_test.is_none());
    }

    #[test]
    fn settings_drive_candidates() {
        let settings = RenderSettings {
            backends: "opengl:gtk,native".to_string(),
            ..RenderSettings::default()
        };
        let opts = GlCheckOptions::from_settings(&settings);
        let names: Vec<&str> = opts.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gtk", "native"]);
        assert!(!opts.mode.is_interactive());
        assert!(opts.shown(&settings, DEFAULT_SHOW_DURATION).mode.is_interactive());
    }
}
