//! Logging, request spans and Prometheus metrics.

use thiserror::Error;

mod init;
mod logging;
mod metrics;
mod request;

pub(crate) use init::init;
pub(crate) use metrics::{metrics_handler, record_booking_transition, record_payment_event};
pub(crate) use request::request_logging;

#[derive(Debug, Error)]
pub(crate) enum ObservabilityError {
    /// A global subscriber was already installed.
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),
}
