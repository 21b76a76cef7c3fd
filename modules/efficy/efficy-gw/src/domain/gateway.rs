//! Gateway proxy: validates a request, builds the upstream URL and forwards it.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use efficy_sdk::models::DEFAULT_CONTENT_TYPE;
use efficy_sdk::{CallerContext, GatewayRequest, GatewayResponse, ResourceType};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use tracing::{info, instrument, warn};

use crate::config::EfficyConfig;

use super::error::DomainError;
use super::ports::{UpstreamRequest, UpstreamTransport};

/// Body reported when the upstream response has no body stream at all.
const MISSING_BODY: &[u8] = b"{}";

/// Upstream URL coordinates, slash-trimmed once at startup.
#[derive(Debug, Clone)]
struct UpstreamTarget {
    server: String,
    app_context: String,
    version: String,
    advanced: String,
    base: String,
    service: String,
}

impl UpstreamTarget {
    fn from_config(cfg: &EfficyConfig) -> Self {
        Self {
            server: cfg.server.trim().trim_end_matches('/').to_owned(),
            app_context: trim_slashes(&cfg.app_context).to_owned(),
            version: trim_slashes(&cfg.version).to_owned(),
            advanced: trim_slashes(&cfg.advanced_resource).to_owned(),
            base: trim_slashes(&cfg.base_resource).to_owned(),
            service: trim_slashes(&cfg.service_resource).to_owned(),
        }
    }

    fn resource_segment(&self, resource_type: ResourceType) -> &str {
        match resource_type {
            ResourceType::Advanced => &self.advanced,
            ResourceType::Base => &self.base,
            ResourceType::Service => &self.service,
        }
    }
}

/// Forwards validated requests to the single configured CRM.
pub struct GatewayService {
    transport: Arc<dyn UpstreamTransport>,
    target: UpstreamTarget,
    identity_header: HeaderName,
}

impl GatewayService {
    /// # Errors
    /// Returns a configuration error when the identity header name is not a valid header.
    pub fn new(cfg: &EfficyConfig, transport: Arc<dyn UpstreamTransport>) -> Result<Self, DomainError> {
        let identity_header = HeaderName::from_bytes(cfg.identity_header.trim().as_bytes())
            .map_err(|e| DomainError::configuration(format!("invalid identity_header: {e}")))?;

        Ok(Self {
            transport,
            target: UpstreamTarget::from_config(cfg),
            identity_header,
        })
    }

    /// `server/appContext/api/resource/version/path[?query]`.
    ///
    /// # Errors
    /// Returns a validation error for an empty path or one containing `..`.
    pub fn build_url(
        &self,
        resource_type: ResourceType,
        path: &str,
        query: Option<&str>,
    ) -> Result<String, DomainError> {
        let path = encode_path(normalize_path(path)?);
        let t = &self.target;
        let mut url = format!(
            "{}/{}/api/{}/{}/{}",
            t.server,
            t.app_context,
            t.resource_segment(resource_type),
            t.version,
            path
        );
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        Ok(url)
    }

    /// Forward one request. Upstream error statuses are returned as `Ok`, untouched.
    ///
    /// # Errors
    /// Returns a validation error before any network call when the path is rejected,
    /// and a transport error when the CRM cannot be reached.
    #[instrument(skip(self, req), fields(
        resource = %req.resource_type,
        method = %req.method,
        target_url,
    ))]
    pub async fn forward(&self, req: GatewayRequest) -> Result<GatewayResponse, DomainError> {
        let start = Instant::now();

        let url = self.build_url(req.resource_type, &req.path, req.query.as_deref())?;
        tracing::Span::current().record("target_url", url.as_str());

        let sends_body = req.method.supports_body() && req.body.is_some();
        let headers = self.build_headers(&req.caller, sends_body)?;
        let body = if sends_body { req.body } else { None };

        let response = self
            .transport
            .send(UpstreamRequest {
                method: req.method,
                url,
                headers,
                body,
            })
            .await
            .inspect_err(|e| warn!(error = %e, "Efficy call failed"))?;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(status = response.status, duration_ms, "Efficy call completed");

        Ok(GatewayResponse {
            status: response.status,
            content_type: response
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned()),
            body: response
                .body
                .unwrap_or_else(|| Bytes::from_static(MISSING_BODY)),
        })
    }

    fn build_headers(
        &self,
        caller: &CallerContext,
        has_body: bool,
    ) -> Result<HeaderMap, DomainError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        if has_body {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut authorization = HeaderValue::from_str(caller.authorization()).map_err(|_| {
            DomainError::configuration("Efficy authorization is not a valid header value")
        })?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);

        if let Some(email) = caller.user_email().filter(|e| !e.is_empty()) {
            match HeaderValue::from_str(email) {
                Ok(value) => {
                    headers.insert(self.identity_header.clone(), value);
                }
                Err(_) => warn!("caller email is not a valid header value, not forwarded"),
            }
        }

        Ok(headers)
    }
}

fn trim_slashes(value: &str) -> &str {
    value.trim().trim_matches('/')
}

fn normalize_path(path: &str) -> Result<&str, DomainError> {
    let normalized = trim_slashes(path);
    if normalized.is_empty() {
        return Err(DomainError::validation("Missing Efficy path"));
    }
    if normalized.contains("..") {
        return Err(DomainError::validation("Efficy path contains invalid segments"));
    }
    Ok(normalized)
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
