#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for the Efficy integration tests.

use std::sync::Arc;

use efficy_gw::domain::GatewayService;
use efficy_gw::infra::ReqwestTransport;
use efficy_gw::{CallerContext, EfficyConfig, EfficyModule, SecretString};
use httpmock::MockServer;

pub const TOKEN: &str = "Basic c3RhdGljOnRva2Vu";
pub const EMAIL: &str = "a@b.com";

/// Upstream path prefix for a namespace, e.g. `/crm/api/advanced/v1`.
pub fn api(resource: &str) -> String {
    format!("/crm/api/{resource}/v1")
}

pub fn config(server: &MockServer) -> EfficyConfig {
    EfficyConfig {
        server: server.base_url(),
        app_context: "crm".to_owned(),
        version: "v1".to_owned(),
        token: SecretString::new(TOKEN),
        advanced_resource: "advanced".to_owned(),
        base_resource: "base".to_owned(),
        service_resource: "service".to_owned(),
        max_page_size: 50,
        ..EfficyConfig::default()
    }
}

pub fn module(server: &MockServer) -> EfficyModule {
    EfficyModule::from_config(&config(server)).unwrap()
}

pub fn gateway(cfg: &EfficyConfig) -> Arc<GatewayService> {
    let transport = ReqwestTransport::from_config(cfg).unwrap();
    Arc::new(GatewayService::new(cfg, Arc::new(transport)).unwrap())
}

pub fn caller() -> CallerContext {
    CallerContext::new(TOKEN, Some(EMAIL.to_owned()))
}
