use anyhow::Result;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Installs the global subscriber for a service binary.
///
/// `RUST_LOG` wins over `logging.level`. `logging.format = "json"` switches
/// to structured output and `logging.file_path` appends to a file without
/// ANSI colours.
pub fn init_logging(service: &str, config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match &config.file_path {
        Some(path) => Some(Mutex::new(
            std::fs::OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    let layer = match (config.format == "json", file) {
        (true, Some(file)) => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(file)
            .boxed(),
        (true, None) => fmt::layer().json().with_span_events(FmtSpan::CLOSE).boxed(),
        (false, Some(file)) => fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .with_writer(file)
            .boxed(),
        (false, None) => fmt::layer().with_span_events(FmtSpan::CLOSE).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).try_init()?;

    tracing::info!(service, level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
