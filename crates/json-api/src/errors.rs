//! API Errors
//!
//! Every failure leaves the server as `{"success": false, "error": {...}}`,
//! whether it came from a handler or from salvo itself.

use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use salvo::{
    http::ResBody,
    oapi::{self, Components, EndpointOutRegister, Operation, ToSchema},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Something went wrong";

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Attach underlying error text to 500 responses.
pub(crate) fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Error Detail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorBody {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Extra context, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error Response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    pub error: ErrorBody,
}

/// A failed request, rendered with its status code and error envelope.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message)
    }

    pub(crate) fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub(crate) fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    pub(crate) fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub(crate) fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    /// Log `error` and hide it behind a generic 500.
    pub(crate) fn internal(context: &str, error: impl Display) -> Self {
        error!("{context}: {error}");

        let mut api_error = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            INTERNAL_MESSAGE,
        );

        if expose_details() {
            api_error.details = Some(Value::String(format!("{context}: {error}")));
        }

        api_error
    }

    #[must_use]
    pub(crate) fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Rewrap an error salvo produced before any handler ran.
    pub(crate) fn from_status(status: StatusCode, brief: Option<String>) -> Self {
        if status.is_server_error() {
            return Self::new(status, "INTERNAL_SERVER_ERROR", INTERNAL_MESSAGE);
        }

        let code = match status {
            StatusCode::BAD_REQUEST
            | StatusCode::UNPROCESSABLE_ENTITY
            | StatusCode::UNSUPPORTED_MEDIA_TYPE => "VALIDATION_ERROR",
            StatusCode::UNAUTHORIZED => "NOT_AUTHENTICATED",
            StatusCode::FORBIDDEN => "ACCESS_DENIED",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
            StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
            _ => "REQUEST_FAILED",
        };

        let message = brief
            .filter(|brief| !brief.trim().is_empty())
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| "Request failed".to_owned());

        Self::new(status, code, message)
    }

    fn into_response(self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code.to_owned(),
                message: self.message,
                details: self.details,
            },
        }
    }
}

#[async_trait]
impl Writer for ApiError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.into_response()));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Bad request"),
            (StatusCode::UNAUTHORIZED, "Unauthorized"),
            (StatusCode::FORBIDDEN, "Forbidden"),
            (StatusCode::NOT_FOUND, "Not found"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        ] {
            operation.responses.insert(
                status.as_str(),
                oapi::Response::new(description)
                    .add_content("application/json", ErrorResponse::to_schema(components)),
            );
        }
    }
}

/// Catcher hoop wrapping framework errors (bad JSON, unknown routes,
/// panics) in the error envelope.
#[handler]
pub(crate) async fn catch_status_errors(res: &mut Response, ctrl: &mut FlowCtrl) {
    let Some(status) = res.status_code else {
        return;
    };

    if !status.is_client_error() && !status.is_server_error() {
        return;
    }

    let brief = match &res.body {
        ResBody::None => None,
        ResBody::Error(error) => Some(error.brief.clone()),
        _ => return,
    };

    res.render(Json(ApiError::from_status(status, brief).into_response()));
    ctrl.skip_rest();
}
