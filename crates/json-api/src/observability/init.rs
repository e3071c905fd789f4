//! Observability start-up.

use std::time::Duration;

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, request};

/// Install the tracing subscriber and set the slow request threshold.
pub(crate) fn init(config: &ServerConfig) -> Result<(), ObservabilityError> {
    request::set_slow_request_threshold(Duration::from_millis(
        config.runtime.slow_request_threshold_ms,
    ));

    logging::install(&config.logging)
}
