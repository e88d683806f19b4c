//! Internal diagnostics using **tracing**.
//!
//! Records go through the installed [`crate::Handler`]s. Problems inside the
//! logger itself (a sink that cannot write, a rotation that fails) are emitted
//! as `tracing` events instead, so they never recurse into the sinks.

/// Installs a JSON `tracing` subscriber on stderr.
///
/// Call once, early, from binaries that want to see sink failures.
/// Returns `false` when another subscriber is already installed.
///
/// # Environment Variables
/// - `RUST_LOG`: filters diagnostics (e.g., `RUST_LOG=kvlog_core=debug`)
pub fn init_diagnostics() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_rejected() {
        init_diagnostics();
        assert!(!init_diagnostics());
    }
}
