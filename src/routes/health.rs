//! Liveness probe.

/// Returns "ok" while the process can answer HTTP.
///
/// Subject to the canonical host check like every other route, so probes should
/// address the service by its canonical host or run without one configured.
pub async fn health() -> &'static str {
    "ok"
}
