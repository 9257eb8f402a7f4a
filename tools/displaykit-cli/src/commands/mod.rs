pub mod check;
pub mod glcheck;
pub mod info;
pub mod screens;

use std::path::Path;

use anyhow::Context;
use displaykit_platform_core::{DisplaySource, StaticDisplay};
use displaykit_platform_linux::DrmDisplaySource;

/// A fixture-backed source when `fixture` is given, the live DRM source
/// otherwise.
pub fn open_source(fixture: Option<&Path>) -> anyhow::Result<Box<dyn DisplaySource>> {
    match fixture {
        Some(path) => {
            let display = StaticDisplay::load(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Ok(Box::new(display))
        }
        None => Ok(Box::new(DrmDisplaySource::scan()?)),
    }
}

/// Reject scales the geometry code would silently ignore.
pub fn check_scale(scale_x: f64, scale_y: f64) -> anyhow::Result<()> {
    for scale in [scale_x, scale_y] {
        if !scale.is_finite() || scale <= 0.0 {
            anyhow::bail!("Scale must be a positive number, got {scale}");
        }
    }
    Ok(())
}
