//! Domain errors for the Efficy module.

use efficy_sdk::{BusinessRule, EfficyError, GatewayResponse};
use thiserror::Error;

use super::ports::TransportError;

/// Domain-level errors for Efficy operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Caller input rejected before any upstream call.
    #[error("{message}")]
    Validation { message: String },

    /// HTTP method outside GET/POST/PUT/DELETE.
    #[error("unsupported HTTP method: {method}")]
    MethodNotAllowed { method: String },

    /// No person matches the caller email.
    #[error("no Efficy person matches the caller email")]
    IdentityNotFound,

    /// The CRM answered a typed operation with an error status.
    #[error("Efficy returned status {status}")]
    Upstream { status: u16, body: String },

    /// The CRM could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A create/update request broke a domain rule.
    #[error("business rule violated: {0}")]
    BusinessRule(BusinessRule),

    /// The module is misconfigured (e.g. no token to send).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Rejection relayed from a CRM response.
    #[must_use]
    pub fn upstream_response(response: &GatewayResponse) -> Self {
        Self::Upstream {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<EfficyError> for DomainError {
    fn from(e: EfficyError) -> Self {
        match e {
            EfficyError::Validation { message } => Self::Validation { message },
            EfficyError::MethodNotAllowed { method } => Self::MethodNotAllowed { method },
            EfficyError::IdentityNotFound => Self::IdentityNotFound,
            EfficyError::Upstream { status, body } => Self::Upstream { status, body },
            EfficyError::Transport { message } => Self::Transport(TransportError::Request(message)),
            EfficyError::BusinessRule { rule } => Self::BusinessRule(rule),
            EfficyError::Internal { message } => Self::Internal { message },
        }
    }
}

/// Convert DomainError to SDK EfficyError.
impl From<DomainError> for EfficyError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { message } => Self::validation(message),
            DomainError::MethodNotAllowed { method } => Self::method_not_allowed(method),
            DomainError::IdentityNotFound => Self::IdentityNotFound,
            DomainError::Upstream { status, body } => Self::upstream(status, body),
            DomainError::Transport(err) => Self::transport(err.to_string()),
            DomainError::BusinessRule(rule) => Self::BusinessRule { rule },
            DomainError::Configuration { message } | DomainError::Internal { message } => {
                Self::internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_problems_surface_as_internal() {
        let err: EfficyError = DomainError::configuration("token missing").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Unexpected server error");
    }

    #[test]
    fn transport_keeps_its_kind() {
        let err: EfficyError = DomainError::from(TransportError::ConnectTimeout).into();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn sdk_errors_round_trip() {
        let err = DomainError::from(EfficyError::missing_field("DmdDescription"));
        assert!(matches!(err, DomainError::BusinessRule(BusinessRule::MissingField { .. })));
    }
}
