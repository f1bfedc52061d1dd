//! Pact contract tests for the b3scale admin API
//!
//! These tests define the contract between the b3scale operator and the b3scale
//! `/api/v1/frontends` endpoints. Requests are issued by the real REST client
//! against a Pact mock server.

mod common;

use b3scale_operator::provider::{
    ApiError, ApiFrontendSettings, B3ScaleREST, FrontendApi, FrontendKeys, FrontendState,
    NewFrontend,
};
use common::init_rustls;
use pact_consumer::prelude::*;
use serde_json::json;
use std::time::Duration;

const CONSUMER: &str = "b3scale-operator";
const PROVIDER: &str = "b3scale-api";
const TOKEN: &str = "test-token";
const SECRET: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

fn client(mock_url: String) -> B3ScaleREST {
    // mock_server.url() ends with a slash; the client trims it
    B3ScaleREST::new(mock_url, TOKEN, Duration::from_secs(5))
        .expect("Failed to build b3scale client")
}

fn frontend_body(id: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "active": true,
        "frontend": { "key": "room1", "secret": SECRET },
        "settings": { "required_tags": tags }
    })
}

fn entity(id: &str) -> FrontendState {
    FrontendState {
        id: id.to_string(),
        active: true,
        frontend: FrontendKeys {
            key: "room1".into(),
            secret: SECRET.into(),
        },
        settings: ApiFrontendSettings::default(),
    }
}

#[tokio::test]
async fn test_create_frontend_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("create a frontend", "", |mut i| {
        i.given("no frontend with key room1 exists");
        i.request
            .method("POST")
            .path("/api/v1/frontends")
            .header("authorization", "Bearer test-token")
            .header("idempotency-key", "6d0c1f6b-5c0e-5b0e-9d55-0e9a3f1f6a10")
            .json_body(json!({
                "active": true,
                "frontend": { "key": "room1", "secret": SECRET },
                "settings": { "required_tags": ["hd"] }
            }));
        i.response
            .status(201)
            .header("content-type", "application/json")
            .json_body(frontend_body("fe-1", &["hd"]));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let desired = NewFrontend {
        active: true,
        frontend: FrontendKeys {
            key: "room1".into(),
            secret: SECRET.into(),
        },
        settings: ApiFrontendSettings {
            required_tags: vec!["hd".into()],
            ..ApiFrontendSettings::default()
        },
    };
    let created = api
        .create(&desired, "6d0c1f6b-5c0e-5b0e-9d55-0e9a3f1f6a10")
        .await
        .expect("Failed to create frontend");

    assert_eq!(created.id, "fe-1");
    assert_eq!(created.frontend.key, "room1");
    assert_eq!(created.settings.required_tags, vec!["hd"]);
}

#[tokio::test]
async fn test_retrieve_frontend_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("retrieve a frontend", "", |mut i| {
        i.given("frontend fe-1 exists");
        i.request
            .method("GET")
            .path("/api/v1/frontends/fe-1")
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": "fe-1",
                "active": true,
                "frontend": { "key": "room1", "secret": SECRET },
                "settings": null
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let retrieved = api.retrieve("fe-1").await.expect("Failed to retrieve frontend");

    assert_eq!(retrieved.id, "fe-1");
    assert!(retrieved.active);
    assert!(retrieved.settings.required_tags.is_empty());
}

#[tokio::test]
async fn test_retrieve_missing_frontend_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("retrieve a frontend that does not exist", "", |mut i| {
        i.given("frontend fe-404 does not exist");
        i.request
            .method("GET")
            .path("/api/v1/frontends/fe-404")
            .header("authorization", "Bearer test-token");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({ "error": "not_found", "message": "frontend not found" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let result = api.retrieve("fe-404").await;

    assert!(matches!(result, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn test_find_frontends_by_key_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("list frontends with a key", "", |mut i| {
        i.given("frontend fe-1 with key room1 exists");
        i.request
            .method("GET")
            .path("/api/v1/frontends")
            .query_param("key", "room1")
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!([frontend_body("fe-1", &[])]));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let found = api.find_by_key("room1").await.expect("Failed to list frontends");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "fe-1");
}

#[tokio::test]
async fn test_update_settings_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("update the settings of a frontend", "", |mut i| {
        i.given("frontend fe-1 exists");
        i.request
            .method("PATCH")
            .path("/api/v1/frontends/fe-1")
            .header("authorization", "Bearer test-token")
            .json_body(json!({
                "settings": {
                    "required_tags": ["hd", "record"],
                    "default_presentation": null,
                    "create_default_params": null,
                    "create_override_params": { "maxParticipants": "50" }
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(frontend_body("fe-1", &["hd", "record"]));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let settings = ApiFrontendSettings {
        required_tags: vec!["hd".into(), "record".into()],
        create_override_params: Some([("maxParticipants".to_string(), "50".to_string())].into()),
        ..ApiFrontendSettings::default()
    };
    api.update_settings("fe-1", &settings)
        .await
        .expect("Failed to update settings");
}

#[tokio::test]
async fn test_delete_frontend_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("delete a frontend", "", |mut i| {
        i.given("frontend fe-1 exists");
        i.request
            .method("DELETE")
            .path("/api/v1/frontends/fe-1")
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(frontend_body("fe-1", &[]));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    api.delete(&entity("fe-1"))
        .await
        .expect("Failed to delete frontend");
}

#[tokio::test]
async fn test_server_error_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("b3scale fails to store a frontend", "", |mut i| {
        i.given("the b3scale database is unavailable");
        i.request
            .method("DELETE")
            .path("/api/v1/frontends/fe-1")
            .header("authorization", "Bearer test-token");
        i.response
            .status(503)
            .header("content-type", "application/json")
            .json_body(json!({ "error": "unavailable", "message": "database unavailable" }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let api = client(mock_server.url().to_string());

    let err = api.delete(&entity("fe-1")).await.unwrap_err();

    let ApiError::Status { status, body } = err else {
        panic!("expected status error, got {err:?}");
    };
    assert_eq!(status, 503);
    assert!(body.contains("database unavailable"));
}
