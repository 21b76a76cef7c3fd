//! Efficy error types.
//!
//! Transport-agnostic error definitions for the Efficy bridge. Callers branch on
//! [`ErrorKind`] and map [`BusinessRule`] parameters to localized text; nothing here is a
//! translation key.

use thiserror::Error;

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    MethodNotAllowed,
    IdentityNotFound,
    Upstream,
    Transport,
    BusinessRule,
    Internal,
}

/// A domain rule a create/update request broke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessRule {
    #[error("required field '{field}' is missing")]
    MissingField { field: String },

    #[error("field '{field}' is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl BusinessRule {
    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidValue { field, .. } => field,
        }
    }
}

/// Error type for Efficy operations.
#[derive(Error, Debug, Clone)]
pub enum EfficyError {
    /// Malformed caller input, rejected before any upstream call.
    #[error("{message}")]
    Validation { message: String },

    /// HTTP method outside GET/POST/PUT/DELETE.
    #[error("Unsupported HTTP method: {method}")]
    MethodNotAllowed { method: String },

    /// No CRM person matches the caller email.
    #[error("No Efficy customer found for logged user email")]
    IdentityNotFound,

    /// The CRM answered with an error status.
    #[error("Efficy API returned status {status}")]
    Upstream { status: u16, body: String },

    /// The CRM could not be reached.
    #[error("Efficy API communication failed: {message}")]
    Transport { message: String },

    /// A domain rule rejected the request.
    #[error("business rule violated: {rule}")]
    BusinessRule { rule: BusinessRule },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EfficyError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Create an upstream error.
    #[must_use]
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a missing-field business rule error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::BusinessRule {
            rule: BusinessRule::MissingField {
                field: field.into(),
            },
        }
    }

    /// Create an invalid-value business rule error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BusinessRule {
            rule: BusinessRule::InvalidValue {
                field: field.into(),
                reason: reason.into(),
            },
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::IdentityNotFound => ErrorKind::IdentityNotFound,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::BusinessRule { .. } => ErrorKind::BusinessRule,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// "Not found" is recoverable: render an empty state, not an error page.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IdentityNotFound)
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::MethodNotAllowed { .. } => 405,
            Self::IdentityNotFound => 404,
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } => 502,
            Self::BusinessRule { .. } => 422,
            Self::Internal { .. } => 500,
        }
    }

    /// Short message safe to show to API callers. Internal detail is never included.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MethodNotAllowed { .. } => "Unsupported HTTP method".to_owned(),
            Self::Transport { .. } => "Efficy API communication failed".to_owned(),
            Self::Internal { .. } => "Unexpected server error".to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(EfficyError::validation("bad").status_code(), 400);
        assert_eq!(EfficyError::method_not_allowed("PATCH").status_code(), 405);
        assert_eq!(EfficyError::IdentityNotFound.status_code(), 404);
        assert_eq!(EfficyError::transport("refused").status_code(), 502);
        assert_eq!(EfficyError::internal("boom").status_code(), 500);
        assert_eq!(EfficyError::upstream(409, "{}").status_code(), 409);
        assert_eq!(EfficyError::missing_field("description").status_code(), 422);
    }

    #[test]
    fn public_message_hides_internal_detail() {
        let err = EfficyError::internal("token missing in config");
        assert_eq!(err.public_message(), "Unexpected server error");

        let err = EfficyError::transport("connection refused (os error 111)");
        assert_eq!(err.public_message(), "Efficy API communication failed");

        let err = EfficyError::validation("Missing Efficy path");
        assert_eq!(err.public_message(), "Missing Efficy path");
    }

    #[test]
    fn business_rules_carry_structured_parameters() {
        let err = EfficyError::invalid_value("email", "not an address");
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
        match err {
            EfficyError::BusinessRule { rule } => {
                assert_eq!(rule.field(), "email");
                assert!(matches!(rule, BusinessRule::InvalidValue { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
