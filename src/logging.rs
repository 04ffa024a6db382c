use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};
use crate::partition::RankContext;

/// Install the global subscriber for this rank.
///
/// The coordinator logs at `level`; other ranks only report errors so the
/// output is not repeated P times. `RUST_LOG` overrides both.
pub fn init_logging(ctx: &RankContext, level: &str) -> Result<()> {
    let default_level = if ctx.is_coordinator() { level } else { "error" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_line_number(false),
        )
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
