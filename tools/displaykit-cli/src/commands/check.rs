//! Check environment requirements.

use displaykit_platform_core::{DisplayServer, DisplaySource};
use displaykit_platform_linux::permissions::{check_requirements, print_requirement_report};
use displaykit_platform_linux::{DrmDisplaySource, GpuEnvironment};

pub fn run() -> anyhow::Result<()> {
    println!("displaykit System Check");
    println!("{}", "=".repeat(50));

    let env = GpuEnvironment::detect();
    match env.display_server {
        DisplayServer::Wayland => println!("[OK] Display server: Wayland"),
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        _ => println!("[WARN] Display server: Unknown"),
    }

    match DrmDisplaySource::scan() {
        Ok(source) => {
            println!("[OK] Monitors detected: {}", source.monitor_count());
            for raw in source.monitors() {
                let g = raw.geometry;
                println!(
                    "     {} {}x{} at {},{} ({}x{} mm){}",
                    raw.model.as_deref().unwrap_or("unknown"),
                    g.width,
                    g.height,
                    g.x,
                    g.y,
                    raw.width_mm,
                    raw.height_mm,
                    if raw.is_primary { " (primary)" } else { "" }
                );
            }
        }
        Err(e) => println!("[WARN] Monitors: {e}"),
    }

    match (env.vendor, env.driver.as_deref()) {
        (Some(vendor), driver) => println!(
            "[OK] GPU: {} (driver: {})",
            vendor.name(),
            driver.unwrap_or("unknown")
        ),
        (None, _) => println!("[WARN] GPU: not detected"),
    }

    let requirements = check_requirements(&env);
    println!();
    print_requirement_report(&requirements);

    let all_required_ok = requirements
        .iter()
        .filter(|r| r.required)
        .all(|r| r.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. displaykit is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
