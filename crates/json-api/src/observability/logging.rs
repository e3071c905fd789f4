//! Tracing subscriber.

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::logging::{LogFormat, LoggingConfig};

use super::ObservabilityError;

/// Crates that log at `warn` unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: [&str; 4] = ["h2", "hyper", "sqlx", "reqwest"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

pub(super) fn install(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    tracing_subscriber::registry()
        .with(format_layer(config.format))
        .with(env_filter(&config.level))
        .try_init()?;

    Ok(())
}

fn format_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_unset| EnvFilter::new(directives(level)))
}

fn directives(level: &str) -> String {
    QUIET_DEPENDENCIES
        .iter()
        .fold(level.to_owned(), |directives, dependency| {
            format!("{directives},{dependency}=warn")
        })
}
