use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a configured override is present.
pub const DEFAULT_FILTER: &str = "balanced_collateral=info,balanced_governance=info";

/// Initialize JSON tracing output.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns `false` when a global subscriber was already set.
pub fn init_tracing(filter_override: Option<&str>) -> bool {
    let filter = match filter_override {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .is_ok()
}
