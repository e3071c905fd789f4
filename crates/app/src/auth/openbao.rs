//! OpenBao Transit client.
//!
//! Credentials are signed with the Transit engine's HMAC endpoint, so the key
//! never leaves OpenBao.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Where to find OpenBao and which Transit key signs credentials.
#[derive(Debug, Clone)]
pub struct OpenBaoConfig {
    /// e.g. `http://localhost:8200`
    pub addr: String,
    pub token: String,
    pub transit_key: String,
}

#[derive(Debug, Error)]
pub enum OpenBaoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer, e.g. a sealed vault or a missing key.
    #[error("transit {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from OpenBao: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone)]
pub struct OpenBaoClient {
    config: OpenBaoConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
struct HmacRequest {
    input: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    input: String,
    hmac: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HmacResponse {
    hmac: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
}

impl OpenBaoClient {
    #[must_use]
    pub fn new(config: OpenBaoConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    /// HMAC `input` with the transit key, returning `vault:v1:...`.
    pub async fn hmac(&self, input: &[u8]) -> Result<String, OpenBaoError> {
        let request = HmacRequest {
            input: BASE64.encode(input),
        };

        let response: HmacResponse = self.transit("hmac", &request).await?;

        if response.hmac.is_empty() {
            return Err(OpenBaoError::UnexpectedResponse("empty hmac".to_owned()));
        }

        Ok(response.hmac)
    }

    pub async fn verify(&self, input: &[u8], hmac: &str) -> Result<bool, OpenBaoError> {
        let request = VerifyRequest {
            input: BASE64.encode(input),
            hmac,
        };

        let response: VerifyResponse = self.transit("verify", &request).await?;

        Ok(response.valid)
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/v1/transit/{operation}/{}",
            self.config.addr.trim_end_matches('/'),
            self.config.transit_key
        )
    }

    async fn transit<B, T>(&self, operation: &'static str, body: &B) -> Result<T, OpenBaoError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(operation))
            .header(TOKEN_HEADER, &self.config.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(OpenBaoError::Status {
                operation,
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = OpenBaoClient::new(OpenBaoConfig {
            addr: "http://bao:8200/".to_owned(),
            token: "root".to_owned(),
            transit_key: "rentals".to_owned(),
        });

        assert_eq!(
            client.endpoint("hmac"),
            "http://bao:8200/v1/transit/hmac/rentals"
        );
    }

    #[test]
    fn verify_request_serializes_base64_input() -> Result<(), serde_json::Error> {
        let body = serde_json::to_value(VerifyRequest {
            input: BASE64.encode(b"claims"),
            hmac: "vault:v1:abc",
        })?;

        assert_eq!(
            body,
            serde_json::json!({ "input": "Y2xhaW1z", "hmac": "vault:v1:abc" })
        );

        Ok(())
    }
}
