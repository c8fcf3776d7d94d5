//! Log output for the binary: fmt to stderr, filtered by `RUST_LOG`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Builder;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` when set, otherwise `info`.
pub fn env_filter() -> EnvFilter {
    builder().from_env_lossy()
}

/// Same rules as [`env_filter`] for an explicit directive string.
pub fn filter_from(directives: &str) -> EnvFilter {
    builder().parse_lossy(directives)
}

fn builder() -> Builder {
    EnvFilter::builder().with_default_directive(DEFAULT_LEVEL.into())
}
