use efficy_bean::Bean;
use efficy_sdk::{CallerContext, GatewayRequest, GatewayResponse, HttpMethod, ResourceType};
use tracing::warn;

use super::error::DomainError;

/// GET request below `resource_type`.
#[must_use]
pub fn get_request(
    resource_type: ResourceType,
    path: impl Into<String>,
    query: Option<String>,
    caller: &CallerContext,
) -> GatewayRequest {
    let req = GatewayRequest::new(resource_type, HttpMethod::Get, path, caller.clone());
    match query {
        Some(query) => req.with_query(query),
        None => req,
    }
}

/// `{{[field,=,value]}}`, the CRM's single-clause filter syntax.
#[must_use]
pub fn equals_filter(field: &str, value: &str) -> String {
    format!("{{{{[{field},=,{value}]}}}}")
}

/// `{a,b,c}` for the `restrict_to` parameter.
#[must_use]
pub fn restrict_to(fields: &[&str]) -> String {
    format!("{{{}}}", fields.join(","))
}

/// Beans of a successful response. An error status becomes `DomainError::Upstream`.
///
/// # Errors
/// `Upstream` for a status >= 400, `Internal` for a body that is not JSON.
pub fn read_beans(response: &GatewayResponse) -> Result<Vec<Bean>, DomainError> {
    if response.is_error() {
        return Err(DomainError::upstream_response(response));
    }
    let body = response.json_body().map_err(|e| {
        warn!(error = %e, status = response.status, "unreadable Efficy response");
        DomainError::internal("Efficy returned a body that is not JSON")
    })?;
    Ok(Bean::list_from_response(&body))
}
