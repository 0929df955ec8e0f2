use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use crate::commands::LogFormat;

/// Filter used when `RUST_LOG` is unset: `--log-level` applies to this crate,
/// everything else (reqwest, hyper, rustls) stays at `warn`.
pub fn default_filter(level: &str) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.trim().to_ascii_lowercase())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() { return Ok(filter); }
    EnvFilter::try_new(default_filter(level)).with_context(|| format!("invalid log level {level:?}"))
}

pub fn init_logging(level: &str, format: &LogFormat) -> Result<()> {
    let filter = build_filter(level)?;
    // module paths only help when digging into client/poll internals
    let verbose = matches!(level.trim().to_ascii_lowercase().as_str(), "debug" | "trace");
    // stdout carries the user-facing result line and --output json
    let layer = fmt::layer()
        .with_target(verbose)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(layer.json().flatten_event(true)).try_init()?,
        LogFormat::Text | LogFormat::Auto => registry.with(layer.compact()).try_init()?,
    }
    Ok(())
}
