use std::path::Path;

use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system with tracing.
///
/// If `log_dir` is provided, logs will also be written to a file in that directory.
/// The `verbose` flag controls whether debug logs are shown. `RUST_LOG` overrides both.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rhythm_combo=debug,warn")
        } else {
            EnvFilter::new("rhythm_combo=info,warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    if let Some(dir) = log_dir {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "rhythm-combo.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The writer must outlive the process; init_logging runs once.
        std::mem::forget(guard);

        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
