//! Auth service errors.

use thiserror::Error;

use crate::auth::{CredentialError, OpenBaoError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("credential is malformed")]
    Malformed(#[from] CredentialError),

    #[error("credential signature is invalid")]
    InvalidSignature,

    #[error("credential has expired")]
    Expired,

    #[error("credential expiry must be in the future")]
    InvalidExpiry,

    #[error("OpenBao error")]
    OpenBao(#[from] OpenBaoError),
}
