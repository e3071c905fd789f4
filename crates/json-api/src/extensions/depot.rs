//! Depot helper extensions.

use std::any::{Any, type_name};

use salvo::prelude::Depot;

use rentals_app::auth::Principal;

use crate::errors::ApiError;

/// Helpers for mapping depot extraction failures to API errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_principal(&mut self, principal: Principal);

    /// The caller verified by the auth middleware.
    fn principal_or_401(&self) -> Result<Principal, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>()
            .map_err(|_ignored| ApiError::internal("missing depot value", type_name::<T>()))
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal_or_401(&self) -> Result<Principal, ApiError> {
        self.obtain::<Principal>().cloned().map_err(|_ignored| {
            ApiError::unauthorized("NOT_AUTHENTICATED", "Authentication required")
        })
    }
}
