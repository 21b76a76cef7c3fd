#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Gateway passthrough against a mock CRM.

mod common;

use std::sync::Arc;

use efficy_gw::domain::{DomainError, GatewayService};
use efficy_gw::infra::ReqwestTransport;
use efficy_gw::{EfficyGatewayApi, GatewayRequest, HttpMethod, ResourceType};
use httpmock::prelude::*;

use common::{EMAIL, TOKEN, api, caller, config, gateway, module};

#[tokio::test]
async fn upstream_status_and_body_are_relayed_verbatim() {
    let server = MockServer::start();
    let cases = [
        (200, "application/json", r#"{"data":[{"DmdID":"1"}]}"#),
        (404, "application/json", r#"{"error":"no such record"}"#),
        (500, "text/plain", "boom"),
        (418, "text/html", "<b>teapot</b>"),
    ];

    let client = module(&server).session_client();
    for (status, content_type, body) in cases {
        let path = format!("{}/Thing/{status}", api("base"));
        let mut mock = server.mock(|when, then| {
            when.method(GET).path(path.as_str());
            then.status(status)
                .header("content-type", content_type)
                .body(body);
        });

        let req = GatewayRequest::new(
            ResourceType::Base,
            HttpMethod::Get,
            format!("Thing/{status}"),
            caller(),
        );
        let resp = client.forward(req).await.unwrap();

        assert_eq!(resp.status, status);
        assert_eq!(resp.content_type, content_type);
        assert_eq!(resp.body, body.as_bytes());
        mock.assert_calls(1);
        mock.delete();
    }
}

#[tokio::test]
async fn upstream_headers_and_query_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path(format!("{}/Demande/12", api("advanced")))
            .query_param("lang", "fr")
            .header("authorization", TOKEN)
            .header("accept", "application/json")
            .header("accept-charset", "utf-8")
            .header("accept-encoding", "identity")
            .header("content-type", "application/json")
            .header("x-user-email", EMAIL)
            .body(r#"{"DmdDescription":"x"}"#);
        then.status(200).body("{}");
    });

    let req = GatewayRequest::new(
        ResourceType::Advanced,
        HttpMethod::Put,
        "/Demande/12/",
        caller(),
    )
    .with_query("lang=fr")
    .with_body(r#"{"DmdDescription":"x"}"#);
    let resp = module(&server).session_client().forward(req).await.unwrap();

    assert_eq!(resp.status, 200);
    mock.assert_calls(1);
}

#[tokio::test]
async fn traversal_is_rejected_before_any_call() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let gw = gateway(&config(&server));
    for resource in ResourceType::ALL {
        for path in ["../secrets", "Demande/../../admin", "a/..", ""] {
            let req = GatewayRequest::new(resource, HttpMethod::Get, path, caller());
            let err = gw.forward(req).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }));
        }
    }
    mock.assert_calls(0);
}

#[tokio::test]
async fn no_content_becomes_empty_object() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path(format!("{}/Faq/3", api("base")));
        then.status(204);
    });

    let req = GatewayRequest::new(ResourceType::Base, HttpMethod::Delete, "Faq/3", caller());
    let resp = gateway(&config(&server)).forward(req).await.unwrap();

    assert_eq!(resp.status, 204);
    assert_eq!(resp.body, "{}".as_bytes());
    assert_eq!(resp.content_type, "application/json;charset=UTF-8");
}

#[tokio::test]
async fn unreachable_crm_is_a_transport_error() {
    let server = MockServer::start();
    let mut cfg = config(&server);
    // Nothing listens on the discard port.
    cfg.server = "http://127.0.0.1:9".to_owned();
    cfg.connect_timeout_ms = 500;

    let transport = Arc::new(ReqwestTransport::from_config(&cfg).unwrap());
    let gw = GatewayService::new(&cfg, transport).unwrap();
    let req = GatewayRequest::new(ResourceType::Service, HttpMethod::Get, "ping", caller());

    let err = gw.forward(req).await.unwrap_err();
    assert!(matches!(err, DomainError::Transport(_)));

    let sdk_err: efficy_gw::EfficyError = err.into();
    assert_eq!(sdk_err.status_code(), 502);
    assert_eq!(sdk_err.public_message(), "Efficy API communication failed");
}
