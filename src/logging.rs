use std::path::Path;

use tracing::warn;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber: stderr plus, when `log_dir` is usable, a
/// daily `hydratrack.<date>.log` file in it.
///
/// `RUST_LOG` wins over `default_filter`. Keep the returned guard alive until
/// exit or the tail of the file log is lost.
pub fn init(default_filter: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let appender = log_dir.map(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("hydratrack")
            .filename_suffix("log")
            .build(dir)
    });

    let (file_layer, guard, file_error) = match appender {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!(error = %e, "Unable to open log file, logging to stderr only");
    }

    guard
}
