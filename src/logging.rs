//! Logging setup for the command line front-end.

use tracing_subscriber::{
    filter::{Directive, EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Install a stderr fmt subscriber; `RUST_LOG` takes precedence over `level`
pub fn init(level: &str) {
    let default_directive: Directive = level
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());

    let filter = EnvFilter::builder()
        .with_default_directive(default_directive)
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr) // stdout stays free for CLI output
        .with_target(false);

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
