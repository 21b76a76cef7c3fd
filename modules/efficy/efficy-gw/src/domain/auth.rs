//! Resolution of the `Authorization` value sent to the CRM.

use crate::secret::SecretString;

use super::error::DomainError;

/// Picks the caller's own `Authorization` header or the configured static token.
#[derive(Debug, Clone)]
pub struct AuthorizationResolver {
    forward_client_authorization: bool,
    token: SecretString,
}

impl AuthorizationResolver {
    #[must_use]
    pub fn new(forward_client_authorization: bool, token: SecretString) -> Self {
        Self {
            forward_client_authorization,
            token,
        }
    }

    /// Value for the upstream `Authorization` header.
    ///
    /// The static token is sent as configured (trimmed), without adding a scheme.
    ///
    /// # Errors
    /// Returns a configuration error when the static token is needed but blank.
    pub fn resolve(&self, client_authorization: Option<&str>) -> Result<String, DomainError> {
        if self.forward_client_authorization
            && let Some(forwarded) = client_authorization
                .map(str::trim)
                .filter(|value| !value.is_empty())
        {
            return Ok(forwarded.to_owned());
        }

        let token = self.token.expose().trim();
        if token.is_empty() {
            return Err(DomainError::configuration("Missing Efficy token configuration"));
        }
        Ok(token.to_owned())
    }
}
