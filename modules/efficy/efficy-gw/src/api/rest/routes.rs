//! REST route registration.

use std::sync::Arc;

use axum::routing::{MethodRouter, any, get};
use axum::{Extension, Router};
use efficy_sdk::ResourceType;

use super::handlers;
use super::state::RestState;

/// All Efficy routes, relative to the configured base path.
pub fn router(state: Arc<RestState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/me/person", get(handlers::current_person))
        .route("/me/demandes", get(handlers::my_demandes))
        .route("/advanced/", proxy(ResourceType::Advanced))
        .route("/advanced/{*path}", proxy(ResourceType::Advanced))
        .route("/base/", proxy(ResourceType::Base))
        .route("/base/{*path}", proxy(ResourceType::Base))
        .route("/service/", proxy(ResourceType::Service))
        .route("/service/{*path}", proxy(ResourceType::Service))
        .fallback(handlers::unknown_endpoint)
        .method_not_allowed_fallback(handlers::unknown_endpoint)
        .layer(Extension(state))
}

/// Passthrough for one namespace; every method lands in the handler, which rejects PATCH and
/// the like with 405.
fn proxy(resource_type: ResourceType) -> MethodRouter {
    any(handlers::proxy).layer(Extension(resource_type))
}
