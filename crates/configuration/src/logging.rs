use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `settings.level`. Logs go to stderr so they never mix
/// with tables or JSON on stdout, or to `settings.file` when one is set. The
/// returned guard must be held until exit so buffered file lines are flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let (result, guard) = match &settings.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                ConfigError::LoggingError(format!("'{}' is not a file path", path.display()))
            })?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            let result = match settings.format {
                LogFormat::Full => builder.try_init(),
                LogFormat::Compact => builder.compact().try_init(),
            };
            (result, Some(guard))
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            let result = match settings.format {
                LogFormat::Full => builder.try_init(),
                LogFormat::Compact => builder.compact().try_init(),
            };
            (result, None)
        }
    };

    result.map_err(|e| ConfigError::LoggingError(e.to_string()))?;
    Ok(guard)
}
