//! Show the normalized screen geometry.

use std::path::PathBuf;

use displaykit_common::config::GeometrySettings;
use displaykit_geometry::query_screen;

use super::{check_scale, open_source};

pub fn run(
    settings: &GeometrySettings,
    fixture: Option<PathBuf>,
    scale_x: f64,
    scale_y: f64,
    json: bool,
) -> anyhow::Result<()> {
    check_scale(scale_x, scale_y)?;
    let source = open_source(fixture.as_deref())?;
    let screen = query_screen(source.as_ref(), settings, scale_x, scale_y);

    if json {
        println!("{}", serde_json::to_string_pretty(&screen)?);
        return Ok(());
    }

    println!("Screen: {}", screen.name);
    println!(
        "  Size: {}x{} ({}x{} mm)",
        screen.width, screen.height, screen.width_mm, screen.height_mm
    );
    println!("  DPI: {}x{}", screen.dpi_x, screen.dpi_y);
    let wa = screen.workarea;
    println!("  Workarea: {}x{} at {},{}", wa.width, wa.height, wa.x, wa.y);
    println!();

    println!("Monitors: {}", screen.monitors.len());
    for m in &screen.monitors {
        println!(
            "  [{}] {} {}x{} at {},{} ({}x{} mm){}",
            m.id,
            m.name,
            m.width,
            m.height,
            m.x,
            m.y,
            m.width_mm,
            m.height_mm,
            if m.is_primary { " (primary)" } else { "" }
        );
        if let Some(hz) = m.refresh_rate {
            println!("      Refresh: {hz:.2} Hz, scale {}x", m.scale_factor);
        }
        if let Some(wa) = m.workarea {
            println!("      Workarea: {}x{} at {},{}", wa.width, wa.height, wa.x, wa.y);
        }
    }
    Ok(())
}
