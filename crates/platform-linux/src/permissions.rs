//! Environment requirement checks and guidance for Linux.
//!
//! Hardware-accelerated client windows need a display connection and,
//! for the native backend, a DRI render node the user may open.

use crate::gpu::GpuEnvironment;

/// A system requirement displaykit may need.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all requirements against a scanned environment.
pub fn check_requirements(env: &GpuEnvironment) -> Vec<Requirement> {
    vec![
        check_display_connection(env),
        check_render_node(env),
        check_render_node_access(env),
    ]
}

fn check_display_connection(env: &GpuEnvironment) -> Requirement {
    let available = env.has_display();

    Requirement {
        name: "Display Connection".to_string(),
        description: format!(
            "Connection to a display server (detected: {})",
            env.display_server.as_str()
        ),
        available,
        required: true,
        fix_instructions: if !available {
            Some("Run inside a graphical session or export DISPLAY / WAYLAND_DISPLAY".to_string())
        } else {
            None
        },
    }
}

fn check_render_node(env: &GpuEnvironment) -> Requirement {
    let available = env.has_render_node();

    Requirement {
        name: "DRI Render Node".to_string(),
        description: "Direct rendering device for the native backend".to_string(),
        available,
        required: false, // the toolkit backend can still run
        fix_instructions: if !available {
            Some("Load the GPU kernel driver and check /dev/dri/renderD* exists".to_string())
        } else {
            None
        },
    }
}

fn check_render_node_access(env: &GpuEnvironment) -> Requirement {
    let available = env.render_node_accessible;

    Requirement {
        name: "Render Node Access".to_string(),
        description: "Read/write permission on the first render node".to_string(),
        available,
        required: false,
        fix_instructions: if !available && env.has_render_node() {
            Some(format!(
                "{}. Fix: sudo usermod -aG render $USER (logout required)",
                render_node_diagnostic(env)
            ))
        } else {
            None
        },
    }
}

fn render_node_diagnostic(env: &GpuEnvironment) -> String {
    let Some(node) = env.render_nodes.first() else {
        return "no render node".to_string();
    };
    // SAFETY: geteuid/getegid have no preconditions and cannot fail.
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };

    match std::fs::metadata(node) {
        Ok(meta) => {
            use std::os::unix::fs::MetadataExt;
            format!(
                "device={} mode={:o} owner_uid={} owner_gid={} process_uid={uid} process_gid={gid}",
                node.display(),
                meta.mode() & 0o777,
                meta.uid(),
                meta.gid()
            )
        }
        Err(err) => format!("device={} unavailable ({err})", node.display()),
    }
}

/// Print a user-friendly requirement report.
pub fn print_requirement_report(requirements: &[Requirement]) {
    println!("displaykit Environment Requirements:");
    println!("{}", "-".repeat(60));

    for req in requirements {
        let status = if req.available {
            "[OK]"
        } else if req.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, req.name, req.description);

        if let Some(ref fix) = req.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use displaykit_platform_core::DisplayServer;
    use std::path::PathBuf;

    fn env(display_server: DisplayServer, nodes: Vec<PathBuf>, accessible: bool) -> GpuEnvironment {
        GpuEnvironment {
            display_server,
            render_nodes: nodes,
            vendor: None,
            driver: None,
            render_node_accessible: accessible,
        }
    }

    #[test]
    fn headless_environment_misses_required_display() {
        let reqs = check_requirements(&env(DisplayServer::Unknown, vec![], false));
        let display = &reqs[0];
        assert!(display.required);
        assert!(!display.available);
        assert!(display.fix_instructions.is_some());
        // No node, so no group advice either.
        assert!(reqs[2].fix_instructions.is_none());
    }

    #[test]
    fn inaccessible_node_gets_group_advice() {
        let nodes = vec![PathBuf::from("/nonexistent/renderD128")];
        let reqs = check_requirements(&env(DisplayServer::X11, nodes, false));
        assert!(reqs[0].available);
        assert!(reqs[1].available);
        let fix = reqs[2].fix_instructions.as_deref().unwrap();
        assert!(fix.contains("usermod -aG render"));
        assert!(fix.contains("unavailable"));
    }
}
