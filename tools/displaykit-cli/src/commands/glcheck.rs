//! Select a rendering backend and self-test it.

use std::time::Duration;

use displaykit_common::config::RenderSettings;
use displaykit_render_probe::{
    check_acceleration, AccelerationReport, GlCheckOptions, StaticBackendTable,
};

pub struct GlCheckArgs {
    pub backends: Option<String>,
    pub force: bool,
    /// Show the window for this long.
    pub show: Option<Duration>,
    pub json: bool,
}

/// Returns whether a backend was selected and passed its self-test.
pub async fn run(mut settings: RenderSettings, args: GlCheckArgs) -> anyhow::Result<bool> {
    if let Some(backends) = args.backends {
        settings.backends = backends;
    }
    settings.force_enable |= args.force;

    let limit =
        Duration::from_secs(settings.self_test_timeout_secs) + args.show.unwrap_or_default();
    let show = args.show;
    let task = tokio::task::spawn_blocking(move || {
        let table = StaticBackendTable::detect();
        let mut options = GlCheckOptions::from_settings(&settings);
        if let Some(duration) = show {
            options = options.shown(&settings, duration);
        }
        check_acceleration(&table, options)
    });

    let report = match tokio::time::timeout(limit, task).await {
        Ok(joined) => joined.map_err(|e| anyhow::anyhow!("Self-test task failed: {e}"))?,
        Err(_) => {
            tracing::error!(timeout_secs = limit.as_secs(), "Self-test timed out");
            eprintln!("Self-test did not finish within {}s", limit.as_secs());
            // The blocking self-test thread cannot be cancelled.
            std::process::exit(2);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.is_usable())
}

fn print_report(report: &AccelerationReport) {
    println!("displaykit GPU Acceleration Check");
    println!("{}", "=".repeat(50));

    let Some(ref backend) = report.backend else {
        println!("[WARN] No usable rendering backend");
        println!("       Run `displaykit check` for environment requirements.");
        return;
    };
    println!("[OK] Backend: {backend}");
    for (key, value) in report.capabilities.iter() {
        println!("     {key}: {value}");
    }

    println!();
    match report.self_test {
        Some(ref result) if result.success => println!("[OK] Self-test passed"),
        Some(ref result) => {
            println!("[FAIL] Self-test: {}", result.message);
            println!("       The backend is marked unsafe.");
        }
        None => println!("[WARN] Self-test did not run"),
    }
}
