//! Show display and version information.

use std::path::PathBuf;

use displaykit_common::config::GeometrySettings;
use displaykit_geometry::{collect_display_info, MonitorCollector};
use displaykit_platform_linux::version::VersionInfoCache;

use super::open_source;

pub fn run(
    settings: &GeometrySettings,
    fixture: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let source = open_source(fixture.as_deref())?;
    let collector = MonitorCollector::from_settings(settings);
    let info = collect_display_info(source.as_ref(), &collector, 1.0, 1.0);
    let versions = VersionInfoCache::new();

    if json {
        let report = serde_json::json!({
            "display": info,
            "versions": versions.get(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Display: {}", info.name);
    println!("  Root size: {}x{}", info.root_size.0, info.root_size.1);
    println!("  Screens: {}", info.screens);
    if let Some((x, y)) = info.pointer {
        println!("  Pointer: {x},{y}");
    }
    if let Some(n) = info.input_devices {
        println!("  Input devices: {n}");
    }
    if let Some(size) = info.default_cursor_size {
        println!("  Cursor size: {size}");
    }
    if let Some(hz) = info.platform.vertical_refresh {
        println!("  Vertical refresh: {hz} Hz");
    }
    println!();

    println!("Monitors:");
    for m in &info.monitors {
        println!(
            "  [{}] {} {}x{} at {},{}",
            m.id, m.name, m.width, m.height, m.x, m.y
        );
    }
    println!();

    println!("Versions:");
    for (component, version) in versions.get() {
        println!("  {component}: {version}");
    }
    Ok(())
}
