#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Typed records: referential labels, profiles, attachments and demande creation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use efficy_gw::domain::ReferentialCache;
use efficy_gw::{
    CallerContext, EfficyError, EfficyRecordsApi, NewAttachment, NewDemande, UserProfilePatch,
};
use httpmock::prelude::*;
use serde_json::json;

use common::{api, caller, config, gateway, module};

fn mock_person_lookup<'a>(server: &'a MockServer, person_id: &str) -> httpmock::Mock<'a> {
    let body = json!([{ "PerID": person_id }]);
    server.mock(move |when, then| {
        when.method(GET).path(format!("{}/Person", api("advanced")));
        then.status(200).json_body(body);
    })
}

#[tokio::test]
async fn concurrent_referential_misses_share_one_fetch() {
    let server = MockServer::start();
    let table = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/referential/DmdStatus", api("base")));
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(json!([{"id": "1", "label": "Open", "value": "1"}]));
    });

    let cache = Arc::new(ReferentialCache::new(gateway(&config(&server)), "referential"));
    let caller = caller();
    let (a, b, c) = tokio::join!(
        cache.get_referential_map(&caller, "DmdStatus"),
        cache.get_referential_map(&caller, "DmdStatus"),
        cache.get_label(&caller, "DmdStatus", "1"),
    );

    assert_eq!(a.unwrap()["1"].label, "Open");
    assert!(Arc::ptr_eq(&b.unwrap(), &cache.get_referential_map(&caller, "DmdStatus").await.unwrap()));
    assert_eq!(c.unwrap(), "Open");
    assert_eq!(cache.get_label(&caller, "DmdStatus", "404").await.unwrap(), "");
    table.assert_calls(1);
}

#[tokio::test]
async fn failed_referential_fetch_is_retried() {
    let server = MockServer::start();
    let mut broken = server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/DmdPriority", api("base")));
        then.status(503).body("maintenance");
    });

    let cache = ReferentialCache::new(gateway(&config(&server)), "referential");
    let err = cache
        .get_numeric_value(&caller(), "DmdPriority", "2")
        .await
        .unwrap_err();
    assert_eq!(EfficyError::from(err).status_code(), 503);
    broken.assert_calls(1);
    broken.delete();

    let fixed = server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/DmdPriority", api("base")));
        then.status(200)
            .json_body(json!({"data": [{"id": "2", "label": "High", "value": "2,5"}]}));
    });
    let weight = cache
        .get_numeric_value(&caller(), "DmdPriority", "2")
        .await
        .unwrap();
    assert!((weight - 2.5).abs() < f64::EPSILON);
    fixed.assert_calls(1);
}

#[tokio::test]
async fn demandes_get_referential_labels() {
    let server = MockServer::start();
    mock_person_lookup(&server, "42");
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/Demande", api("advanced")));
        then.status(200).json_body(json!({"data": [{
            "DmdID": "7",
            "DmdStatus": {"raw_value": "1", "label": "stale"},
            "DmdPriority": "2",
            "DmdQualifID": {"raw_value": "Q9", "label": "Billing"},
            "DmdAttID": "A1;A2",
        }]}));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/DmdStatus", api("base")));
        then.status(200).json_body(json!([{"id": "1", "label": "Open"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/DmdPriority", api("base")));
        then.status(200)
            .json_body(json!([{"id": "2", "label": "High", "value": "3"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/DmdQualifID", api("base")));
        then.status(500);
    });

    let demandes = module(&server)
        .session_client()
        .list_demandes(&caller(), 10)
        .await
        .unwrap();

    assert_eq!(demandes.len(), 1);
    let demande = &demandes[0];
    assert_eq!(demande.id, "7");
    assert_eq!(demande.status, "Open");
    assert_eq!(demande.priority, "High");
    assert!((demande.priority_weight - 3.0).abs() < f64::EPSILON);
    // table unavailable, the record's own label stays
    assert_eq!(demande.qualification, "Billing");
    assert_eq!(demande.attachment_ids, vec!["A1", "A2"]);
}

#[tokio::test]
async fn each_session_fetches_its_own_reference_tables() {
    let server = MockServer::start();
    mock_person_lookup(&server, "42");
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/Demande", api("advanced")));
        then.status(200)
            .json_body(json!([{"DmdID": "7", "DmdStatus": "1"}]));
    });
    let french = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/referential/DmdStatus", api("base")))
            .header("authorization", "Bearer alice");
        then.status(200).json_body(json!([{"id": "1", "label": "Ouvert"}]));
    });
    let english = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/referential/DmdStatus", api("base")))
            .header("authorization", "Bearer bob");
        then.status(200).json_body(json!([{"id": "1", "label": "Open"}]));
    });

    let module = module(&server);
    let alice = CallerContext::new("Bearer alice", Some("alice@b.com".to_owned()));
    let bob = CallerContext::new("Bearer bob", Some("bob@b.com".to_owned()));
    let alice_client = module.session_client();
    let bob_client = module.session_client();

    let first = alice_client.list_demandes(&alice, 10).await.unwrap();
    let second = bob_client.list_demandes(&bob, 10).await.unwrap();
    let again = alice_client.list_demandes(&alice, 10).await.unwrap();

    assert_eq!(first[0].status, "Ouvert");
    assert_eq!(second[0].status, "Open");
    assert_eq!(again[0].status, "Ouvert");
    french.assert_calls(1);
    english.assert_calls(1);
}

#[tokio::test]
async fn profile_update_refreshes_the_cached_profile() {
    let server = MockServer::start();
    mock_person_lookup(&server, "42");
    let mut person = server.mock(|when, then| {
        when.method(GET).path(format!("{}/Person/42", api("advanced")));
        then.status(200).json_body(json!([{
            "PerID": "42", "PerFirstName": "Ann", "PerName": "Lee", "PerEntID": "E1",
        }]));
    });
    let enterprise = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/Enterprise/E1", api("advanced")))
            .query_param("restrict_to", "{EntName}");
        then.status(200).json_body(json!([{"EntName": "Acme"}]));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path(format!("{}/Person/42", api("advanced")))
            .json_body(json!({"PerFirstName": "Anna", "PerPhone": "+32 2"}));
        then.status(200).json_body(json!({}));
    });

    let client = module(&server).session_client();
    let before = client.get_user_profile(&caller()).await.unwrap();
    assert_eq!(before.first_name, "Ann");
    assert_eq!(before.enterprise_name, "Acme");
    person.assert_calls(1);
    person.delete();

    let person = server.mock(|when, then| {
        when.method(GET).path(format!("{}/Person/42", api("advanced")));
        then.status(200).json_body(json!([{
            "PerID": "42", "PerFirstName": "Anna", "PerName": "Lee", "PerEntID": "E1",
        }]));
    });
    let patch = UserProfilePatch {
        first_name: Some(" Anna ".to_owned()),
        phone: Some("+32 2".to_owned()),
        ..UserProfilePatch::default()
    };
    let after = client
        .update_user_profile(&caller(), "42", patch)
        .await
        .unwrap();

    assert_eq!(after.first_name, "Anna");
    assert_eq!(after.enterprise_name, "Acme");
    update.assert_calls(1);
    person.assert_calls(1);
    enterprise.assert_calls(1);
}

#[tokio::test]
async fn invalid_profile_patch_sends_nothing() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let client = module(&server).session_client();
    let err = client
        .update_user_profile(&caller(), "42", UserProfilePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EfficyError::BusinessRule { .. }));

    let patch = UserProfilePatch {
        phone: Some("1".to_owned()),
        ..UserProfilePatch::default()
    };
    let err = client
        .update_user_profile(&caller(), "../1", patch)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid PerID value");
    any.assert_calls(0);
}

#[tokio::test]
async fn unreadable_attachments_are_skipped() {
    let server = MockServer::start();
    let base64 = "A".repeat(1000);
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/Attachment/A1", api("advanced")));
        then.status(200).json_body(json!([{
            "AttName": "scan.pdf", "AttMime": "application/pdf", "AttContent": base64,
        }]));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/Attachment/A2", api("advanced")));
        then.status(200)
            .json_body(json!([{"AttID": "A2", "AttContent": "***not base64***"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/Attachment/A3", api("advanced")));
        then.status(404).body("gone");
    });
    let sized = server.mock(|when, then| {
        when.method(GET).path(format!("{}/Attachment/A4", api("advanced")));
        then.status(200).json_body(json!([{
            "AttID": "A4", "AttName": "a.txt", "AttSize": "3", "AttContent": [104, 105, 33],
        }]));
    });

    let ids: Vec<String> = ["A1", " A4 ", "A2", "A3", "A4", "", "bad/id"]
        .iter()
        .map(|id| (*id).to_owned())
        .collect();
    let attachments = module(&server)
        .session_client()
        .list_attachments(&caller(), &ids)
        .await
        .unwrap();

    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0].id, "A1");
    assert_eq!(attachments[0].size, 750);
    assert!(attachments[0].size_estimated);
    assert_eq!(attachments[0].content.len(), 750);
    assert_eq!(attachments[1].id, "A4");
    assert_eq!(attachments[1].content, b"hi!");
    assert!(!attachments[1].size_estimated);
    sized.assert_calls(1);
}

#[tokio::test]
async fn demande_is_created_for_the_caller() {
    let server = MockServer::start();
    mock_person_lookup(&server, "42");
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{}/Demande", api("advanced")))
            .header("content-type", "application/json")
            .json_body(json!({
                "DmdPerID": "42",
                "DmdDescription": "Printer on fire",
                "DmdQualifID": "Q1",
                "attachments": [{"AttName": "p.txt", "AttMime": "text/plain", "AttContent": "aGk="}],
            }));
        then.status(201)
            .json_body(json!({"data": {"DmdID": {"raw_value": "D-100", "label": "#100"}}}));
    });

    let demande = NewDemande {
        description: " Printer on fire ".to_owned(),
        qualification_id: "Q1".to_owned(),
        priority_id: Some("  ".to_owned()),
        attachments: vec![NewAttachment {
            name: "p.txt".to_owned(),
            mime_type: "text/plain".to_owned(),
            bytes: b"hi".to_vec(),
        }],
    };
    let id = module(&server)
        .session_client()
        .create_demande(&caller(), demande)
        .await
        .unwrap();

    assert_eq!(id, "D-100");
    create.assert_calls(1);
}

#[tokio::test]
async fn incomplete_demande_is_rejected_locally() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let err = module(&server)
        .session_client()
        .create_demande(
            &caller(),
            NewDemande {
                description: "x".to_owned(),
                ..NewDemande::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 422);
    assert!(err.to_string().contains("DmdQualifID"));
    any.assert_calls(0);
}

#[tokio::test]
async fn broker_opportunities_fill_enterprise_names() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/Opportunity", api("advanced")))
            .query_param("filter", "{{[OppBrokerPerID,=,42]}}");
        then.status(200).json_body(json!([
            {"OppID": "O1", "OppEntID": "E1", "OppAmount": "1.000,50", "OppStatus": "S"},
            {"OppID": "O2", "OppEntID": {"raw_value": "E2", "label": "Named"}},
        ]));
    });
    let enterprise = server.mock(|when, then| {
        when.method(GET).path(format!("{}/Enterprise/E1", api("advanced")));
        then.status(200).json_body(json!({"EntName": "Acme &amp; Co"}));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/referential/OppStatus", api("base")));
        then.status(200).json_body(json!([{"id": "S", "label": "Signed"}]));
    });

    let opportunities = module(&server)
        .session_client()
        .list_broker_opportunities(&caller(), "42")
        .await
        .unwrap();

    assert_eq!(opportunities.len(), 2);
    assert_eq!(opportunities[0].enterprise_name, "Acme & Co");
    assert_eq!(opportunities[0].status, "Signed");
    assert!((opportunities[0].amount - 1000.5).abs() < 1e-9);
    assert_eq!(opportunities[1].enterprise_name, "Named");
    listing.assert_calls(1);
    enterprise.assert_calls(1);
}

#[tokio::test]
async fn faqs_are_listed_from_the_base_namespace() {
    let server = MockServer::start();
    let faqs = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/Faq", api("base")))
            .query_param("restrict_to", "{FaqID,FaqQuestion,FaqAnswer,FaqCategory,FaqTags}");
        then.status(200).json_body(json!({"items": [
            {"FaqID": "1", "FaqQuestion": "Why?", "FaqAnswer": "Because", "FaqTags": "a;b"},
        ]}));
    });

    let list = module(&server).session_client().list_faqs(&caller()).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].question, "Why?");
    assert_eq!(list[0].tags, vec!["a", "b"]);
    faqs.assert_calls(1);
}
