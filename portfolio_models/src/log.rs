use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _};

/// Installs the global tracing subscriber.
///
/// `prod_format` selects flattened single-line JSON; otherwise events are
/// pretty-printed with colors. Filtering follows `RUST_LOG`.
pub fn init_tracing(prod_format: bool) {
    if prod_format {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().json().flatten_event(true).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().json().pretty().with_ansi(true))
            .init();
    }
}

/// Same as [`init_tracing`] in development format, but tolerates a subscriber
/// already being installed (tests call it once per test).
pub fn try_init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().pretty().with_ansi(true))
        .try_init()
        .ok();
}
