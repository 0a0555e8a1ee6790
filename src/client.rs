//! Bounded HTTP client for the backend API.
//!
//! Every request goes through one [`reqwest::Client`] carrying the configured
//! timeout, so no call can hang past the bounded window — ingest, summarize,
//! qa, and health all behave the same way.
//!
//! # Error Contract
//!
//! | Failure | Error |
//! |---------|-------|
//! | non-2xx from `/ingest` | [`ClientError::Http`] |
//! | request exceeds the timeout | [`ClientError::Timeout`] |
//! | connection/transport failure | [`ClientError::Transport`] |
//! | undecodable response body | [`ClientError::Malformed`] |
//!
//! Non-2xx from `/summarize` and `/qa` is not an error here: the body is
//! decoded leniently and a shape mismatch comes back as a defaulted/empty
//! result, matching how the backend actually misbehaves. Only a body that is
//! not JSON at all is reported as [`ClientError::Malformed`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{
    HealthResponse, IngestRequest, QaRequest, QaResponse, SummarizeRequest, SummaryResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint} failed: HTTP {status}")]
    Http { endpoint: &'static str, status: u16 },

    #[error("{endpoint} timed out after {timeout_secs}s")]
    Timeout {
        endpoint: &'static str,
        timeout_secs: u64,
    },

    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned a malformed body: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let timeout_secs = config.api.timeout_secs;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit document chunks. The response body is not consumed; only the
    /// status matters.
    pub async fn ingest(&self, req: &IngestRequest) -> Result<(), ClientError> {
        let endpoint = "/ingest";
        let resp = self.post(endpoint, req).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    pub async fn summarize(&self, req: &SummarizeRequest) -> Result<SummaryResponse, ClientError> {
        let endpoint = "/summarize";
        let resp = self.post(endpoint, req).await?;
        self.decode(endpoint, resp).await
    }

    pub async fn qa(&self, req: &QaRequest) -> Result<QaResponse, ClientError> {
        let endpoint = "/qa";
        let resp = self.post(endpoint, req).await?;
        self.decode(endpoint, resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let endpoint = "/health";
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, endpoint))
            .send()
            .await
            .map_err(|e| self.map_send_err(endpoint, e))?;
        self.decode(endpoint, resp).await
    }

    async fn post<T: Serialize>(
        &self,
        endpoint: &'static str,
        body: &T,
    ) -> Result<reqwest::Response, ClientError> {
        self.http
            .post(format!("{}{}", self.base_url, endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_err(endpoint, e))
    }

    /// Decode a JSON body regardless of HTTP status. Missing or extra fields
    /// collapse to defaults in the target type; non-JSON is malformed.
    async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        resp.json::<T>()
            .await
            .map_err(|e| self.map_body_err(endpoint, e))
    }

    fn map_send_err(&self, endpoint: &'static str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                endpoint,
                timeout_secs: self.timeout_secs,
            }
        } else {
            ClientError::Transport {
                endpoint,
                source: err,
            }
        }
    }

    fn map_body_err(&self, endpoint: &'static str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                endpoint,
                timeout_secs: self.timeout_secs,
            }
        } else {
            ClientError::Malformed {
                endpoint,
                source: err,
            }
        }
    }
}
