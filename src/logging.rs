use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// 0 = warn, 1 = info, 2 = debug, 3+ = trace. `RUST_LOG` wins when set.
fn filter_for(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Logs to stderr, or to a daily-rotated file under `log_dir` when given.
///
/// The TUI passes a directory so log lines do not land on the alternate screen.
pub fn init_logging(verbose: u8, quiet: bool, log_dir: Option<&Path>) -> Result<()> {
    let registry = Registry::default().with(filter_for(verbose, quiet));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "anishelf.log");
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(appender);
            registry
                .with(layer)
                .try_init()
                .context("failed to install log subscriber")?;
        }
        None => {
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry
                .with(layer)
                .try_init()
                .context("failed to install log subscriber")?;
        }
    }
    Ok(())
}
