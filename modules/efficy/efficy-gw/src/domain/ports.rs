//! Output ports (interfaces) for domain services.

use async_trait::async_trait;
use bytes::Bytes;
use efficy_sdk::HttpMethod;
use http::HeaderMap;
use thiserror::Error;

/// One fully built upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// What the CRM answered.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// `None` when the response has no body stream at all (e.g. 204).
    pub body: Option<Bytes>,
}

/// Failure to complete the round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection timed out")]
    ConnectTimeout,

    #[error("read timed out")]
    ReadTimeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Port for the HTTP client that talks to the CRM.
///
/// One call, one connection: implementations must not retry.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send `req` and read the full response.
    async fn send(&self, req: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}
