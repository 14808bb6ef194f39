/*!
 * Logging Module
 * Subscriber setup (console + rolling files) and request logging middleware
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Default directive when `RUST_LOG` is not set.
fn default_directive(level: &str) -> String {
    format!("agency_api={level},tower_http=debug,axum=info,sqlx=warn")
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers; hold them until shutdown.
pub fn init(config: &LoggingConfig) -> Vec<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(&config.dir) {
        eprintln!("could not create log directory {}: {}", config.dir, e);
    }

    let (file_writer, file_guard) = non_blocking(rolling::daily(&config.dir, "app.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());
    let mut guards = vec![file_guard, console_guard];

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.is_production() {
        let (error_writer, error_guard) = non_blocking(rolling::daily(&config.dir, "error.log"));
        guards.push(error_guard);

        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber.with(file_layer).with(console_layer).init();
    }

    tracing::info!(
        "Logging initialized for {} environment (level {})",
        config.environment,
        config.level
    );

    guards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_crate() {
        let directive = default_directive("info");
        assert!(directive.starts_with("agency_api=info"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
