//! Prometheus metrics and the `/metrics` endpoint.

use std::sync::OnceLock;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct RentalsMetrics {
    registry: Registry,
    requests: IntCounterVec,
    request_seconds: HistogramVec,
    in_flight: IntGauge,
    booking_transitions: IntCounterVec,
    payment_events: IntCounterVec,
}

impl RentalsMetrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("rentals".to_owned()), None)?;

        let requests = register(
            &registry,
            IntCounterVec::new(
                Opts::new("http_requests_total", "HTTP responses by method, route and status."),
                &["method", "route", "status_class", "status_code"],
            )?,
        )?;

        let request_seconds = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new("http_request_duration_seconds", "HTTP request latency.")
                    .buckets(DURATION_BUCKETS.to_vec()),
                &["method", "route"],
            )?,
        )?;

        let in_flight = register(
            &registry,
            IntGauge::new("http_requests_in_flight", "Requests currently being served.")?,
        )?;

        let booking_transitions = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "booking_transitions_total",
                    "Booking status changes by operation and resulting status.",
                ),
                &["operation", "status"],
            )?,
        )?;

        let payment_events = register(
            &registry,
            IntCounterVec::new(
                Opts::new("payment_events_total", "Payment lifecycle events by outcome."),
                &["event", "status"],
            )?,
        )?;

        Ok(Self {
            registry,
            requests,
            request_seconds,
            in_flight,
            booking_transitions,
            payment_events,
        })
    }
}

fn register<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

static METRICS: OnceLock<Option<RentalsMetrics>> = OnceLock::new();

/// `None` when the registry could not be built; metrics are then skipped.
fn metrics() -> Option<&'static RentalsMetrics> {
    METRICS
        .get_or_init(|| {
            RentalsMetrics::build()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

/// Holds the in-flight gauge up until dropped.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    gauge: Option<&'static IntGauge>,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self { gauge }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.gauge {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let code = status_code.to_string();

    metrics
        .requests
        .with_label_values(&[method, route, status_class(status_code), code.as_str()])
        .inc();

    metrics
        .request_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a booking reaching `status` through `operation`.
pub(crate) fn record_booking_transition(operation: &str, status: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .booking_transitions
            .with_label_values(&[operation, status])
            .inc();
    }
}

/// Count a payment `event` (`intent`, `confirm`, `refund`) ending in `status`.
pub(crate) fn record_payment_event(event: &str, status: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .payment_events
            .with_label_values(&[event, status])
            .inc();
    }
}

/// Prometheus text exposition.
#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
        return;
    };

    let encoder = TextEncoder::new();
    let mut body = String::new();

    if let Err(source) = encoder.encode_utf8(&metrics.registry.gather(), &mut body) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(prometheus::TEXT_FORMAT),
    );
    res.render(body);
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn exposition_includes_domain_counters() -> TestResult {
        observe_request("GET", "/api/bookings", 200, 0.042);
        record_booking_transition("cancel", "cancelled");
        record_payment_event("refund", "refunded");

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let body = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        for name in [
            "rentals_http_requests_total",
            "rentals_http_request_duration_seconds",
            "rentals_http_requests_in_flight",
            "rentals_booking_transitions_total",
            "rentals_payment_events_total",
        ] {
            assert!(body.contains(name), "expected {name} in exposition");
        }

        assert!(
            body.contains(r#"operation="cancel",status="cancelled""#),
            "expected the cancel transition to be labelled"
        );

        Ok(())
    }

    #[test]
    fn status_codes_are_grouped() {
        assert_eq!(status_class(204), "2xx");
        assert_eq!(status_class(409), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(42), "other");
    }
}
