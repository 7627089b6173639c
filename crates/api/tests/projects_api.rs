//! Profiles, projects and project trades over HTTP.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sitelink_core::roles::ProfileRole;

#[tokio::test]
async fn profile_role_comes_from_token() {
    let app = build_test_app();
    let trade = trade_token();
    let response = post_json(
        &app,
        "/api/v1/profiles",
        &trade,
        json!({
            "company_name": "Bright Sparks",
            "owner_name": "Dana",
            "trade_category": "electrical",
            "trade_tags": ["residential"],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "trade");
    assert_eq!(json["data"]["trade_category"], "electrical");

    let me = body_json(get(&app, "/api/v1/profiles/me", Some(&trade)).await).await;
    assert_eq!(me["data"]["company_name"], "Bright Sparks");
}

#[tokio::test]
async fn profile_required_before_profile_routes() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/profiles/me", Some(&gc_token())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn blank_company_name_is_rejected() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/profiles",
        &gc_token(),
        json!({ "company_name": "  ", "owner_name": "Pat" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_my_profile() {
    let app = build_test_app();
    let gc = gc_token();
    onboard(&app, &gc, "Acme Builders").await;

    let response = put_json(
        &app,
        "/api/v1/profiles/me",
        &gc,
        json!({ "company_name": "Acme Construction" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["company_name"], "Acme Construction");
}

#[tokio::test]
async fn trades_cannot_create_projects() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/projects",
        &trade_token(),
        json!({ "name": "Nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn project_dates_must_be_ordered() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/projects",
        &gc_token(),
        json!({ "name": "Backwards", "start_date": "2026-05-01", "end_date": "2026-04-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn new_project_defaults_to_planning() {
    let app = build_test_app();
    let gc = gc_token();
    let id = create_project(&app, &gc, "Kitchen Remodel").await;

    let json = body_json(get(&app, &format!("/api/v1/projects/{id}"), Some(&gc)).await).await;
    assert_eq!(json["data"]["name"], "Kitchen Remodel");
    assert_eq!(json["data"]["status"], "planning");
    assert_eq!(json["data"]["created_by"], GC_USER);
}

#[tokio::test]
async fn missing_project_is_404() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/projects/999999", Some(&gc_token())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_gc_cannot_see_project() {
    let app = build_test_app();
    let id = create_project(&app, &gc_token(), "Private").await;
    let other = token(999, ProfileRole::GeneralContractor);

    let response = get(&app, &format!("/api/v1/projects/{id}"), Some(&other)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn attachments_are_replaced_by_owner() {
    let app = build_test_app();
    let gc = gc_token();
    let id = create_project(&app, &gc, "Deck").await;

    let response = put_json(
        &app,
        &format!("/api/v1/projects/{id}/attachments"),
        &gc,
        json!({
            "description_photos": ["https://cdn.example.com/a.jpg"],
            "description_files": [{ "name": "plan.pdf", "url": "https://cdn.example.com/plan.pdf", "size": 2048 }],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["description_photos"][0], "https://cdn.example.com/a.jpg");
    assert_eq!(json["data"]["description_files"][0]["name"], "plan.pdf");

    let response = put_json(
        &app,
        &format!("/api/v1/projects/{id}/attachments"),
        &gc,
        json!({ "description_files": [{ "name": "", "url": "x", "size": 1 }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn adding_a_trade_links_it_and_opens_a_thread() {
    let app = build_test_app();
    let gc = gc_token();
    let trade = trade_token();
    onboard(&app, &gc, "Acme Builders").await;
    let trade_profile = onboard(&app, &trade, "Bright Sparks").await;
    let project = create_project(&app, &gc, "Office Fit-out").await;

    let response = post_json(
        &app,
        &format!("/api/v1/projects/{project}/trades"),
        &gc,
        json!({ "trade_profile_id": trade_profile }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["link"]["trade_profile_id"], trade_profile);
    assert_eq!(json["data"]["thread"]["thread_type"], "project");
    assert!(json["invalidates"].as_array().is_some_and(|tags| !tags.is_empty()));

    let trades = body_json(
        get(&app, &format!("/api/v1/projects/{project}/trades"), Some(&gc)).await,
    )
    .await;
    assert_eq!(trades["data"].as_array().map(Vec::len), Some(1));

    // The linked trade now sees the project.
    let projects = body_json(get(&app, "/api/v1/projects", Some(&trade)).await).await;
    assert_eq!(projects["data"][0]["id"], project);
    let response = get(&app, &format!("/api/v1/projects/{project}"), Some(&trade)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn only_owner_adds_trades() {
    let app = build_test_app();
    let trade = trade_token();
    let trade_profile = onboard(&app, &trade, "Bright Sparks").await;
    let project = create_project(&app, &gc_token(), "Office").await;
    let other = token(999, ProfileRole::GeneralContractor);

    let response = post_json(
        &app,
        &format!("/api/v1/projects/{project}/trades"),
        &other,
        json!({ "trade_profile_id": trade_profile }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn trade_profiles_are_listed() {
    let app = build_test_app();
    let gc = gc_token();
    onboard(&app, &gc, "Acme Builders").await;
    onboard(&app, &trade_token(), "Bright Sparks").await;
    onboard(&app, &token(OTHER_TRADE_USER, ProfileRole::Trade), "Pipe Dreams").await;

    let json = body_json(get(&app, "/api/v1/profiles/trades", Some(&gc)).await).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["company_name"].as_str())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Bright Sparks"));
    assert!(names.contains(&"Pipe Dreams"));
}
