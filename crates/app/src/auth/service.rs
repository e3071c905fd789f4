//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::auth::{
    AuthServiceError, CredentialClaims, CredentialSigner, IssuedCredential, NewCredential,
    Principal, encode_claims, format_credential, parse_credential, signing_input,
};

#[derive(Clone)]
pub struct SignedCredentialAuthService {
    signer: Arc<dyn CredentialSigner>,
}

impl SignedCredentialAuthService {
    #[must_use]
    pub fn new(signer: Arc<dyn CredentialSigner>) -> Self {
        Self { signer }
    }

    /// Issue a signed credential.
    ///
    /// # Errors
    ///
    /// Returns an error when the expiry is not in the future or signing fails.
    pub async fn issue_credential(
        &self,
        credential: NewCredential,
    ) -> Result<IssuedCredential, AuthServiceError> {
        let issued_at = Timestamp::now();

        if credential.expires_at <= issued_at {
            return Err(AuthServiceError::InvalidExpiry);
        }

        let claims = CredentialClaims {
            sub: credential.subject,
            email: credential.email,
            role: credential.role,
            iat: issued_at.as_second(),
            exp: credential.expires_at.as_second(),
        };

        let encoded = encode_claims(&claims)?;
        let signature = self.signer.sign(&signing_input(&encoded)).await?;

        Ok(IssuedCredential {
            token: format_credential(&encoded, &signature),
            principal: Principal {
                uuid: claims.sub,
                email: claims.email,
                role: claims.role,
            },
            issued_at,
            expires_at: credential.expires_at,
        })
    }
}

impl std::fmt::Debug for SignedCredentialAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCredentialAuthService")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthService for SignedCredentialAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed = parse_credential(bearer_token)?;

        let valid = self
            .signer
            .verify(&signing_input(&parsed.encoded_claims), &parsed.signature)
            .await?;

        if !valid {
            return Err(AuthServiceError::InvalidSignature);
        }

        if parsed.claims.exp <= Timestamp::now().as_second() {
            return Err(AuthServiceError::Expired);
        }

        Ok(Principal {
            uuid: parsed.claims.sub,
            email: parsed.claims.email,
            role: parsed.claims.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a bearer credential and return the identity it carries.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}
