//! Logging setup based on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,gloss_geometry=debug,wgpu_core=info,wgpu_hal=info,naga=info";

/// Install a global fmt subscriber.
///
/// Honours `RUST_LOG` and falls back to [`DEFAULT_FILTER`]. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Install a global fmt subscriber with an explicit filter directive.
///
/// # Example
/// ```no_run
/// gloss_core::logging::init_with_filter("trace,wgpu_core=warn");
/// ```
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}
