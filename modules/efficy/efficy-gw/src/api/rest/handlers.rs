//! REST handlers for the Efficy bridge.
//!
//! Handlers are thin: build the caller context, call the domain service, relay the result.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use efficy_sdk::models::DEFAULT_CONTENT_TYPE;
use efficy_sdk::{GatewayRequest, GatewayResponse, HttpMethod, ResourceType};

use super::caller::AuthenticatedUser;
use super::dto::{DemandesQuery, HealthResponse};
use super::error::{ApiResult, json_error};
use super::state::RestState;
use crate::domain::DomainError;

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// GET /me/person - Person record of the caller (id only).
#[tracing::instrument(skip_all)]
pub async fn current_person(
    Extension(state): Extension<Arc<RestState>>,
    headers: HeaderMap,
    extensions: Extensions,
) -> ApiResult<Response> {
    let caller = state.caller(&headers, extensions.get::<AuthenticatedUser>())?;
    let response = state.demandes.fetch_current_person(&caller).await?;
    Ok(relay(response))
}

/// GET /me/demandes?pageSize=n - Demandes of the caller.
#[tracing::instrument(skip_all, fields(page_size = query.page_size.as_deref()))]
pub async fn my_demandes(
    Extension(state): Extension<Arc<RestState>>,
    Query(query): Query<DemandesQuery>,
    headers: HeaderMap,
    extensions: Extensions,
) -> ApiResult<Response> {
    let page_size = state.demandes.paging().parse(query.page_size.as_deref());
    let caller = state.caller(&headers, extensions.get::<AuthenticatedUser>())?;
    let response = state
        .demandes
        .fetch_demandes_for_current_user(&caller, page_size)
        .await?;
    Ok(relay(response))
}

/// {GET,POST,PUT,DELETE} /{advanced,base,service}/{*path} - Passthrough to one CRM namespace.
///
/// The namespace comes from the route. A bare `/advanced/` reaches the gateway with an
/// empty path and is rejected there.
#[tracing::instrument(skip_all, fields(resource = %resource_type, method = %parts.method))]
pub async fn proxy(
    Extension(state): Extension<Arc<RestState>>,
    Extension(resource_type): Extension<ResourceType>,
    path: Option<Path<String>>,
    parts: Parts,
    body: Bytes,
) -> ApiResult<Response> {
    let method = HttpMethod::parse(parts.method.as_str()).ok_or_else(|| {
        DomainError::MethodNotAllowed {
            method: parts.method.to_string(),
        }
    })?;
    let path = path.map(|Path(path)| path).unwrap_or_default();

    let caller = state.caller(&parts.headers, parts.extensions.get::<AuthenticatedUser>())?;
    let mut req = GatewayRequest::new(resource_type, method, path, caller)
        .with_query(parts.uri.query().unwrap_or_default());
    if method.supports_body() {
        req = req.with_body(body);
    }

    let response = state.gateway.forward(req).await?;
    Ok(relay(response))
}

/// Fallback for every other route and method.
pub async fn unknown_endpoint() -> Response {
    json_error(StatusCode::NOT_FOUND, "Unknown endpoint")
}

/// Re-emit a CRM response with its status, content type and body untouched.
fn relay(response: GatewayResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = HeaderValue::from_str(&response.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    (status, [(header::CONTENT_TYPE, content_type)], response.body).into_response()
}
