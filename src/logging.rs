use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Install the global subscriber. `RUST_LOG` directives win over `level`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.as_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
