//! Auth middleware.

use std::sync::Arc;

use rentals_app::auth::AuthServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};

use crate::{errors::ApiError, extensions::*, state::State};

/// Verify the bearer credential and attach its principal to the depot.
#[salvo::handler]
pub(crate) async fn authenticate(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        let error = ApiError::unauthorized("NO_TOKEN", "No token provided, authorization denied");

        reject(error, req, depot, res, ctrl).await;

        return;
    };

    let auth = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => Arc::clone(&state.auth),
        Err(error) => {
            reject(error, req, depot, res, ctrl).await;

            return;
        }
    };

    let principal = match auth.authenticate_bearer(&token).await {
        Ok(principal) => principal,
        Err(AuthServiceError::Expired) => {
            let error = ApiError::unauthorized("TOKEN_EXPIRED", "Token has expired");

            reject(error, req, depot, res, ctrl).await;

            return;
        }
        Err(
            AuthServiceError::Malformed(_)
            | AuthServiceError::InvalidSignature
            | AuthServiceError::InvalidExpiry,
        ) => {
            let error = ApiError::unauthorized("INVALID_TOKEN", "Invalid token");

            reject(error, req, depot, res, ctrl).await;

            return;
        }
        Err(AuthServiceError::OpenBao(source)) => {
            let error = ApiError::internal("OpenBao error during credential verification", source);

            reject(error, req, depot, res, ctrl).await;

            return;
        }
    };

    depot.insert_principal(principal);

    ctrl.call_next(req, depot, res).await;
}

/// Reject authenticated callers that are not admins.
#[salvo::handler]
pub(crate) async fn require_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match depot.principal_or_401() {
        Ok(principal) if principal.is_admin() => {
            ctrl.call_next(req, depot, res).await;
        }
        Ok(_) => {
            let error = ApiError::forbidden("INSUFFICIENT_PERMISSIONS", "Admin access required");

            reject(error, req, depot, res, ctrl).await;
        }
        Err(error) => reject(error, req, depot, res, ctrl).await,
    }
}

async fn reject(
    error: ApiError,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    error.write(req, depot, res).await;
    ctrl.skip_rest();
}

fn extract_bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_owned())
}
