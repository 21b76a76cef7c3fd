use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, header};
use efficy_sdk::CallerContext;

use super::caller::{AuthenticatedUser, resolve_email};
use crate::domain::{AuthorizationResolver, DemandesService, DomainError, GatewayService};

/// Services shared by the REST handlers.
pub struct RestState {
    pub gateway: Arc<GatewayService>,
    pub demandes: Arc<DemandesService>,
    pub authorization: AuthorizationResolver,
    pub identity_header: HeaderName,
}

impl RestState {
    /// Build the caller context of one request.
    ///
    /// # Errors
    /// Returns a configuration error when no `Authorization` value can be sent upstream.
    pub fn caller(
        &self,
        headers: &HeaderMap,
        user: Option<&AuthenticatedUser>,
    ) -> Result<CallerContext, DomainError> {
        let client_authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let authorization = self.authorization.resolve(client_authorization)?;
        let email = resolve_email(user, headers, &self.identity_header);
        Ok(CallerContext::new(authorization, email))
    }
}
