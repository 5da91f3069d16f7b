use std::time::Duration;

use axum::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Where an encoded payload is sent and how it is labelled.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Invocation URL of the inference endpoint
    pub url: Url,

    /// Content type the endpoint expects the payload in
    pub content_type: &'static str,

    /// Upper bound on a single invocation, connection included
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to build endpoint client: {0}")]
    Configuration(String),

    #[error("Failed to reach endpoint: {0}")]
    Connection(String),

    #[error("Endpoint call timed out")]
    Timeout,

    #[error("Endpoint request failed: {0}")]
    Request(String),

    #[error("Endpoint returned status {status}: {message}")]
    Response { status: u16, message: String },

    #[error("Failed to decode endpoint response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for EndpointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EndpointError::Timeout
        } else if err.is_connect() {
            EndpointError::Connection(err.to_string())
        } else {
            EndpointError::Request(err.to_string())
        }
    }
}

/// A single-attempt call to an inference endpoint.
///
/// The endpoint is opaque: it accepts one content type and answers with a
/// JSON prediction body. Adapters hold this seam so tests can substitute a
/// fake for the remote service.
#[async_trait]
pub trait InvokeEndpoint: Send + Sync {
    async fn invoke(&self, body: Vec<u8>) -> Result<Value, EndpointError>;
}

pub struct HttpEndpoint {
    client: Client,
    config: EndpointConfig,
}

impl HttpEndpoint {
    pub fn new(config: EndpointConfig) -> Result<Self, EndpointError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EndpointError::Configuration(e.to_string()))?;

        Ok(HttpEndpoint { client, config })
    }
}

#[async_trait]
impl InvokeEndpoint for HttpEndpoint {
    async fn invoke(&self, body: Vec<u8>) -> Result<Value, EndpointError> {
        let response = self
            .client
            .post(self.config.url.clone())
            .header(CONTENT_TYPE, self.config.content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(EndpointError::Response {
                status: status.as_u16(),
                message: text,
            });
        }
        debug!("Endpoint response: {text}");

        serde_json::from_str(&text).map_err(|e| EndpointError::Decode(e.to_string()))
    }
}
