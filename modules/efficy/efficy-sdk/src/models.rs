//! Efficy gateway models.
//!
//! Transport-agnostic request/response types shared by the gateway and its callers.
//! Note: NO serde derives here - these are pure domain models.

use std::fmt;

use bytes::Bytes;

/// Content type reported when the CRM omits one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Upstream namespace a request is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Advanced,
    Base,
    Service,
}

impl ResourceType {
    pub const ALL: [Self; 3] = [Self::Advanced, Self::Base, Self::Service];

    /// Name used in the public route (`/advanced/...`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::Base => "base",
            Self::Service => "service",
        }
    }

    /// Parse a route segment, case-insensitively.
    #[must_use]
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(segment.trim()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods the gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Convert to uppercase string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Parse a method name, case-insensitively. Anything outside the four is `None`.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        [Self::Get, Self::Post, Self::Put, Self::Delete]
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method.trim()))
    }

    /// Only POST and PUT carry a request body upstream.
    #[must_use]
    pub fn supports_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is calling: the upstream `Authorization` value and, when known, the login email.
#[derive(Clone, PartialEq, Eq)]
pub struct CallerContext {
    authorization: String,
    user_email: Option<String>,
}

impl CallerContext {
    #[must_use]
    pub fn new(authorization: impl Into<String>, user_email: Option<String>) -> Self {
        Self {
            authorization: authorization.into(),
            user_email,
        }
    }

    #[must_use]
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    #[must_use]
    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }
}

impl fmt::Debug for CallerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerContext")
            .field("authorization", &"[REDACTED]")
            .field("user_email", &self.user_email)
            .finish()
    }
}

/// Request forwarded to one CRM resource namespace.
#[derive(Clone)]
pub struct GatewayRequest {
    pub resource_type: ResourceType,
    /// Caller-supplied path below the namespace, e.g. `Demande/12`.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    pub method: HttpMethod,
    pub body: Option<Bytes>,
    pub caller: CallerContext,
}

impl GatewayRequest {
    #[must_use]
    pub fn new(
        resource_type: ResourceType,
        method: HttpMethod,
        path: impl Into<String>,
        caller: CallerContext,
    ) -> Self {
        Self {
            resource_type,
            path: path.into(),
            query: None,
            method,
            body: None,
            caller,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRequest")
            .field("resource_type", &self.resource_type)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("caller", &self.caller)
            .finish()
    }
}

/// Upstream response, relayed as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

impl GatewayResponse {
    #[must_use]
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// JSON response built locally (not relayed from the CRM).
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, DEFAULT_CONTENT_TYPE, body.to_string())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    /// Returns an error when the body is not valid JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
