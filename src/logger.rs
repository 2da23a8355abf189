use std::sync::Arc;

use spdlog::sink::{StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Config, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

fn console_sink(stream: StdStream, filter: LevelFilter) -> spdlog::Result<Arc<StdStreamSink>> {
    Ok(Arc::new(StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(filter)
        .build()?))
}

/// The `<path> : done` progress lines go to stdout. Dropped images, skipped
/// posts and failed downloads go to stderr, so a redirected run still shows them.
fn add_migration_sinks(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    builder
        .sink(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(Level::Warn))?)
        .sink(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(Level::Warn))?);
    Ok(())
}

/// Installs the default logger used by every module of the migration
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let mut builder = Logger::builder();
    add_migration_sinks(&mut builder)?;

    let logger = Arc::new(builder.build()?);
    // Progress must be visible while images download
    logger.set_flush_level_filter(LevelFilter::All);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(config.log_level.into()));

    spdlog::set_default_logger(logger);

    Ok(())
}
