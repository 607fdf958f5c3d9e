use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::ConfigError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "footy_tally=debug,info"
    } else {
        "footy_tally=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logger(config: &LoggingConfig) -> Result<(), ConfigError> {
    let registry = tracing_subscriber::registry().with(env_filter(config.verbose));
    let result = match config.format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .try_init(),
    };

    result.map_err(|e| ConfigError::Logger {
        message: e.to_string(),
    })
}
