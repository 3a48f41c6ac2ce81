// Tracing setup shared by all binaries: console output plus a daily log file.
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Platform log folder, e.g. ~/.local/share/VideoEffectsController/logs
pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "videoeffects", "VideoEffectsController")
        .map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. The returned guard flushes the file
/// writer on drop, so keep it alive until the program ends. Returns `None`
/// when no log folder could be created (console logging still works).
pub fn init(file_prefix: &str, default_level: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Local time when the OS lets us read the offset, UTC otherwise
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let (file_writer, guard) = match log_dir().map(|dir| std::fs::create_dir_all(&dir).map(|_| dir)) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", file_prefix));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        _ => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(timer.clone());

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(timer)
    });

    if tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("[Logging] A global subscriber was already installed");
    }

    guard
}
