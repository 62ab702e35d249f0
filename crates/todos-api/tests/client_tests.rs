// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::time::Duration;
use todos_api::Client;
use todos_app::UserId;
use todos_testkit::{
    MockEndpoint, MockResponse, UNREACHABLE_BASE_URL, sample_todos, sample_user, todos_json,
};

#[test]
fn fetch_todos_decodes_served_collection_in_order() -> Result<()> {
    let endpoint = MockEndpoint::serve(vec![MockResponse::json(todos_json(&sample_todos())?)])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let todos = client.fetch_todos()?;
    assert_eq!(todos, sample_todos());

    let requests = endpoint.finish()?;
    assert_eq!(requests, vec!["/api/todos.json".to_owned()]);
    Ok(())
}

#[test]
fn fetch_todos_accepts_records_without_owner() -> Result<()> {
    let endpoint = MockEndpoint::serve(vec![MockResponse::json(
        r#"[{"id":10,"title":"solo","completed":false}]"#,
    )])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let todos = client.fetch_todos()?;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].user_id, None);

    endpoint.finish()?;
    Ok(())
}

#[test]
fn fetch_todos_reports_non_success_status_as_load_failure() -> Result<()> {
    let endpoint = MockEndpoint::serve(vec![MockResponse::status(503, "Service Unavailable")])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let failure = client
        .fetch_todos()
        .expect_err("503 should surface as a load failure");
    assert!(
        failure.cause().contains("503"),
        "unexpected cause: {}",
        failure.cause()
    );
    assert!(failure.to_string().starts_with("Could not load the todos"));

    endpoint.finish()?;
    Ok(())
}

#[test]
fn fetch_todos_reports_malformed_payload_as_load_failure() -> Result<()> {
    let endpoint = MockEndpoint::serve(vec![MockResponse::json(r#"{"todos":"nope"}"#)])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let failure = client
        .fetch_todos()
        .expect_err("object payload should not decode as a list");
    assert!(
        failure.cause().contains("decode todo list"),
        "unexpected cause: {}",
        failure.cause()
    );

    endpoint.finish()?;
    Ok(())
}

#[test]
fn fetch_todos_reports_unreachable_host_with_remediation() -> Result<()> {
    let client = Client::new(UNREACHABLE_BASE_URL, Duration::from_millis(200))?;
    let failure = client
        .fetch_todos()
        .expect_err("unreachable endpoint should fail");
    assert!(failure.cause().contains("cannot reach"));
    assert!(failure.cause().contains("[api].base_url"));
    Ok(())
}

#[test]
fn fetch_user_hits_user_document() -> Result<()> {
    let body = r#"{"id":1,"name":"Leanne Graham","email":"Sincere@april.biz","phone":null}"#;
    let endpoint = MockEndpoint::serve(vec![MockResponse::json(body)])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let user = client.fetch_user(UserId::new(1))?;
    assert_eq!(user, sample_user());

    let requests = endpoint.finish()?;
    assert_eq!(requests, vec!["/api/users/1.json".to_owned()]);
    Ok(())
}

#[test]
fn fetch_user_surfaces_missing_user() -> Result<()> {
    let endpoint = MockEndpoint::serve(vec![MockResponse::status(404, "Not Found")])?;

    let client = Client::new(endpoint.base_url(), Duration::from_secs(1))?;
    let error = client
        .fetch_user(UserId::new(99))
        .expect_err("404 should fail");
    assert!(error.to_string().contains("404"));

    endpoint.finish()?;
    Ok(())
}
