//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - Console output (pretty in development, JSON in production)
//! - Optional daily rotating file logs under `log_dir`

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// tableside_server::init_logger("debug", false, None).unwrap();
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let app_log = RollingFileAppender::new(Rotation::DAILY, dir, "tableside");
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log));
            Some(if json_format { layer.json().boxed() } else { layer.boxed() })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
