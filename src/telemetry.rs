use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,warroom=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
