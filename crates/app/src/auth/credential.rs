//! Credential formatting, parsing, and signing input construction.
//!
//! A credential looks like `rc_v1_<claims>.<signature>` where `claims` is the
//! unpadded base64url encoding of a JSON [`CredentialClaims`] document and
//! `signature` is the Transit HMAC of [`signing_input`].

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Role;

/// Credential prefix, including the format version.
pub const CREDENTIAL_PREFIX: &str = "rc_v1_";

const SIGNING_DOMAIN: &str = "rc:v1:";

/// Claims carried inside a credential. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct ParsedCredential {
    /// The claims segment exactly as it appeared in the token.
    pub encoded_claims: String,
    pub claims: CredentialClaims,
    pub signature: String,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential format is invalid")]
    InvalidFormat,

    #[error("credential claims encoding is invalid")]
    InvalidEncoding(#[source] base64::DecodeError),

    #[error("credential claims are invalid")]
    InvalidClaims(#[source] serde_json::Error),
}

/// Encode claims into the token's claims segment.
///
/// # Errors
///
/// Returns an error if the claims cannot be serialized.
pub fn encode_claims(claims: &CredentialClaims) -> Result<String, CredentialError> {
    let json = serde_json::to_vec(claims).map_err(CredentialError::InvalidClaims)?;

    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Bytes handed to the signer for a given claims segment.
#[must_use]
pub fn signing_input(encoded_claims: &str) -> Vec<u8> {
    format!("{SIGNING_DOMAIN}{encoded_claims}").into_bytes()
}

#[must_use]
pub fn format_credential(encoded_claims: &str, signature: &str) -> String {
    format!("{CREDENTIAL_PREFIX}{encoded_claims}.{signature}")
}

/// Split a bearer token into its claims and signature.
///
/// This does not verify the signature or the expiry.
///
/// # Errors
///
/// Returns an error when the token is not a well-formed credential.
pub fn parse_credential(token: &str) -> Result<ParsedCredential, CredentialError> {
    let body = token
        .strip_prefix(CREDENTIAL_PREFIX)
        .ok_or(CredentialError::InvalidFormat)?;

    let (encoded_claims, signature) = body.split_once('.').ok_or(CredentialError::InvalidFormat)?;

    if encoded_claims.is_empty() || signature.is_empty() {
        return Err(CredentialError::InvalidFormat);
    }

    let json = URL_SAFE_NO_PAD
        .decode(encoded_claims)
        .map_err(CredentialError::InvalidEncoding)?;

    let claims: CredentialClaims =
        serde_json::from_slice(&json).map_err(CredentialError::InvalidClaims)?;

    Ok(ParsedCredential {
        encoded_claims: encoded_claims.to_string(),
        claims,
        signature: signature.to_string(),
    })
}
