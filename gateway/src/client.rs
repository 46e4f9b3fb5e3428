//! reqwest-backed HTTP transport.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::HttpError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};

/// Configuration for [`RestClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Applied when a request does not carry its own timeout.
    pub default_timeout: Duration,
    pub connect_timeout: Duration,
    /// Responses with larger bodies are rejected.
    pub max_response_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Production HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RestClient {
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(config.default_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| HttpError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn map_send_error(e: reqwest::Error) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_builder() || e.is_request() {
            HttpError::InvalidRequest(e.to_string())
        } else {
            HttpError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for RestClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = req;

        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| HttpError::InvalidRequest(format!("invalid method: {method}")))?;

        debug!(method = %method, url = %url, "sending gateway request");

        let mut builder = self.http.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if !body.is_empty() {
            builder = builder.body(body);
        }
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(Self::map_send_error)?;

        let status_code = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        if let Some(len) = response.content_length() {
            if len > self.config.max_response_bytes as u64 {
                return Err(HttpError::ResponseTooLarge {
                    limit: self.config.max_response_bytes,
                });
            }
        }

        let body = response.bytes().await.map_err(Self::map_send_error)?;
        if body.len() > self.config.max_response_bytes {
            return Err(HttpError::ResponseTooLarge {
                limit: self.config.max_response_bytes,
            });
        }

        debug!(status = status_code, bytes = body.len(), "gateway response");

        Ok(HttpResponse {
            status_code,
            headers,
            body: body.to_vec(),
        })
    }
}
