use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber for embedding applications and
/// tests. `ZMOVE_LOG` overrides the configured level. Safe to call more
/// than once; later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env("ZMOVE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
