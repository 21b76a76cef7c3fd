//! `reqwest` implementation of the upstream transport port.

use std::time::Duration;

use async_trait::async_trait;
use efficy_sdk::HttpMethod;
use http::StatusCode;
use tracing::{Instrument, info_span};

use crate::config::EfficyConfig;
use crate::domain::ports::{TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};

/// HTTP client for the CRM. Idle connections are not kept between calls.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }

    /// # Errors
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn from_config(cfg: &EfficyConfig) -> Result<Self, reqwest::Error> {
        Self::new(cfg.connect_timeout(), cfg.read_timeout())
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn map_send_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        if e.is_connect() {
            TransportError::ConnectTimeout
        } else {
            TransportError::ReadTimeout
        }
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Statuses that never carry a body stream.
fn has_no_body(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn send(&self, req: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(req.method), &req.url)
            .headers(req.headers);
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .instrument(info_span!("efficy_http_request"))
            .await
            .map_err(|e| map_send_error(&e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = if has_no_body(status) {
            None
        } else {
            Some(response.bytes().await.map_err(|e| map_send_error(&e))?)
        };

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodiless_statuses() {
        assert!(has_no_body(StatusCode::NO_CONTENT));
        assert!(has_no_body(StatusCode::NOT_MODIFIED));
        assert!(!has_no_body(StatusCode::OK));
        assert!(!has_no_body(StatusCode::NOT_FOUND));
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn client_builds_from_defaults() {
        assert!(ReqwestTransport::from_config(&EfficyConfig::default()).is_ok());
    }
}
