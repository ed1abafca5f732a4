use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var naming a file that receives a DEBUG-level copy of every log line.
pub const LOG_FILE_ENV: &str = "NAKAMA_LOG_FILE";

pub fn init_tracing() -> std::io::Result<()> {
    init_tracing_with_service("nakama")
}

/// Stderr logging filtered by `RUST_LOG` (default `info`), plus optional file logging.
pub fn init_tracing_with_service(service_name: &str) -> std::io::Result<()> {
    let file_logging = std::env::var(LOG_FILE_ENV).ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let result = if let Some(log_path) = &file_logging {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    // Already initialized (tests, or an embedding app); keep the existing subscriber
    if result.is_err() {
        return Ok(());
    }

    tracing::debug!(service = service_name, log_file = ?file_logging, "tracing initialized");
    Ok(())
}
