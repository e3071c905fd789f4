//! Credential signing seam.

use async_trait::async_trait;
use mockall::automock;

use crate::auth::{OpenBaoClient, OpenBaoError};

/// Produces and checks keyed signatures over credential bytes.
#[automock]
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Sign `input`, returning an opaque signature string.
    async fn sign(&self, input: &[u8]) -> Result<String, OpenBaoError>;

    /// Check `signature` against `input`.
    async fn verify(&self, input: &[u8], signature: &str) -> Result<bool, OpenBaoError>;
}

#[async_trait]
impl CredentialSigner for OpenBaoClient {
    async fn sign(&self, input: &[u8]) -> Result<String, OpenBaoError> {
        self.hmac(input).await
    }

    async fn verify(&self, input: &[u8], signature: &str) -> Result<bool, OpenBaoError> {
        OpenBaoClient::verify(self, input, signature).await
    }
}
