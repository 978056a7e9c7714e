use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber when debug output was requested.
///
/// `RUST_LOG` overrides the default `debug` filter.
pub fn init(debug: bool) {
    if !debug {
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
