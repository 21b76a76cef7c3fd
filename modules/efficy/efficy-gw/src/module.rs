//! Efficy module wiring.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderName;
use tracing::info;

use crate::api::rest::{self, RestState};
use crate::config::EfficyConfig;
use crate::domain::ports::UpstreamTransport;
use crate::domain::{
    AuthorizationResolver, CrmRecordsService, DemandesService, GatewayService, PageLimits,
    ReferentialCache,
};
use crate::infra::ReqwestTransport;
use crate::local_client::EfficyLocalClient;

/// The Efficy bridge: one gateway and one identity chain, shared by every caller.
///
/// Referential caches are not shared: each [`EfficyModule::session_client`] owns its own.
pub struct EfficyModule {
    rest: Arc<RestState>,
    gateway: Arc<GatewayService>,
    demandes: Arc<DemandesService>,
    referential_path: String,
}

impl EfficyModule {
    /// Validate `cfg` and build the module over a `reqwest` transport.
    ///
    /// # Errors
    /// Returns an error for an incomplete configuration or a client that cannot be built.
    pub fn from_config(cfg: &EfficyConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let transport =
            ReqwestTransport::from_config(cfg).context("failed to build the Efficy HTTP client")?;
        Self::with_transport(cfg, Arc::new(transport))
    }

    /// Build the module over any transport.
    ///
    /// # Errors
    /// Returns an error when the identity header name is invalid.
    pub fn with_transport(
        cfg: &EfficyConfig,
        transport: Arc<dyn UpstreamTransport>,
    ) -> anyhow::Result<Self> {
        let identity_header = HeaderName::from_bytes(cfg.identity_header.trim().as_bytes())
            .with_context(|| format!("invalid identity_header '{}'", cfg.identity_header))?;

        let gateway = Arc::new(GatewayService::new(cfg, transport)?);
        let demandes = Arc::new(DemandesService::new(
            gateway.clone(),
            PageLimits::from_config(cfg),
        ));

        let rest = Arc::new(RestState {
            gateway: gateway.clone(),
            demandes: demandes.clone(),
            authorization: AuthorizationResolver::new(
                cfg.forward_client_authorization,
                cfg.token.clone(),
            ),
            identity_header,
        });

        info!(
            server = %cfg.server,
            forward_client_authorization = cfg.forward_client_authorization,
            "Efficy module initialized"
        );
        Ok(Self {
            rest,
            gateway,
            demandes,
            referential_path: cfg.referential_path.clone(),
        })
    }

    /// REST routes, to be nested under the public base path.
    #[must_use]
    pub fn router(&self) -> Router {
        rest::router(self.rest.clone())
    }

    /// In-process client for one caller session.
    ///
    /// Reference tables and entity lookups fetched through it are cached for the life of
    /// the returned client, under that session's credentials. Never share it between callers.
    #[must_use]
    pub fn session_client(&self) -> Arc<EfficyLocalClient> {
        let referential = Arc::new(ReferentialCache::new(
            self.gateway.clone(),
            &self.referential_path,
        ));
        let records = Arc::new(CrmRecordsService::new(
            self.gateway.clone(),
            self.demandes.clone(),
            referential,
        ));
        Arc::new(EfficyLocalClient::new(
            self.gateway.clone(),
            self.demandes.clone(),
            records,
        ))
    }
}
