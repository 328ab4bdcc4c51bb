use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies to
/// this crate and `info` to everything else.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("info,tradeforge_api={default_level}"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
