//! Ordered, fault-tolerant backend selection.

use crate::backend::{BackendHandle, BackendLoader};
use crate::capabilities::Capabilities;
use crate::registry::BackendCandidate;

/// Try `candidates` in order and keep the first backend reporting a
/// non-empty capability set.
///
/// Load failures and empty capability sets are logged and skipped. When no
/// candidate qualifies the result is `(empty, None)`, which is a normal
/// outcome rather than an error.
pub fn select(
    loader: &dyn BackendLoader,
    candidates: &[BackendCandidate],
    force_enable: bool,
) -> (Capabilities, Option<BackendHandle>) {
    for candidate in candidates {
        tracing::debug!(
            backend = %candidate.name,
            priority = candidate.priority,
            "Attempting to load rendering backend"
        );

        let backend = match loader.load(&candidate.name) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(
                    backend = %candidate.name,
                    error = %e,
                    "Cannot load rendering backend"
                );
                continue;
            }
        };

        let caps = backend.check_support(force_enable);
        tracing::debug!(
            backend = %backend.name(),
            force_enable,
            capabilities = caps.len(),
            "Checked backend support"
        );
        if !caps.is_empty() {
            tracing::info!(backend = %backend.name(), "Selected rendering backend");
            return (caps, Some(backend));
        }
    }

    tracing::info!(
        candidates = ?candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        force_enable,
        "No usable rendering backend"
    );
    (Capabilities::new(), None)
}
