//! Request-level logging and request IDs.

mod request_ids;
mod spans;

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::Instrument as _;
use tracing::{error, info, warn};

pub(crate) use request_ids::RequestId;

use super::metrics;

static SLOW_REQUEST_THRESHOLD_MS: AtomicU64 = AtomicU64::new(1_000);

pub(super) fn set_slow_request_threshold(threshold: Duration) {
    let millis = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);

    SLOW_REQUEST_THRESHOLD_MS.store(millis, Ordering::Relaxed);
}

fn slow_request_threshold_ms() -> u128 {
    u128::from(SLOW_REQUEST_THRESHOLD_MS.load(Ordering::Relaxed))
}

/// Log, time and count every request except metric scrapes.
#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.uri().path() == "/metrics" {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let request_id = RequestId::from_request(req);

    request_id.write_header(res);
    depot.inject(request_id.clone());

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let remote_addr = req.remote_addr().to_string();
    let route = spans::route_template(&path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
        path = %path,
        remote_addr = %remote_addr,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let duration = started.elapsed();
    let status = res.status_code.unwrap_or(StatusCode::OK);
    let duration_ms = duration.as_millis();
    let threshold_ms = slow_request_threshold_ms();

    metrics::observe_request(&method, &route, status.as_u16(), duration.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        info!(status = status.as_u16(), duration_ms, "request.completed");

        if status.is_server_error() {
            error!(status = status.as_u16(), %method, %path, "server error response");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), %method, %path, "client error response");
        }

        if duration_ms > threshold_ms {
            warn!(%method, %route, duration_ms, threshold_ms, "slow request");
        }
    });
}

#[cfg(test)]
mod tests {
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::{request_ids::REQUEST_ID_HEADER, *};

    #[handler]
    async fn echo_request_id(depot: &mut Depot, res: &mut Response) {
        let request_id = depot
            .obtain::<RequestId>()
            .map_or_else(|_| "missing".to_string(), |id| id.as_str().to_owned());

        res.render(request_id);
    }

    fn make_service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("ping").get(echo_request_id)),
        )
    }

    fn header(res: &Response) -> Option<String> {
        res.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    #[tokio::test]
    async fn incoming_request_id_is_echoed() -> TestResult {
        let mut res = TestClient::get("http://example.com/ping")
            .add_header(REQUEST_ID_HEADER, "req-123", true)
            .send(&make_service())
            .await;

        assert_eq!(header(&res).as_deref(), Some("req-123"));
        assert_eq!(res.take_string().await?, "req-123");

        Ok(())
    }

    #[tokio::test]
    async fn blank_request_id_is_replaced() -> TestResult {
        let mut res = TestClient::get("http://example.com/ping")
            .add_header(REQUEST_ID_HEADER, "   ", true)
            .send(&make_service())
            .await;

        let body = res.take_string().await?;

        assert_eq!(header(&res).as_deref(), Some(body.as_str()));
        assert!(uuid::Uuid::parse_str(&body).is_ok(), "expected a uuid, got {body}");

        Ok(())
    }

    #[test]
    fn threshold_saturates() {
        set_slow_request_threshold(Duration::from_secs(u64::MAX));

        assert_eq!(slow_request_threshold_ms(), u128::from(u64::MAX));

        set_slow_request_threshold(Duration::from_millis(1_000));
    }
}
