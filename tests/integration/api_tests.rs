//! API integration tests
//!
//! Tests the API endpoints with real HTTP requests against a test router.

use crate::common::TestApp;

fn event_ids(json: &serde_json::Value) -> Vec<String> {
    json["events"]
        .as_array()
        .expect("events array")
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new();
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new();
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert!(json.get("status").is_some());
    assert!(json["components"].get("event_store").is_some());
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();
    app.get("/api/v1/health/live").await.assert_ok();
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new();
    app.get("/api/v1/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_list_without_filters_returns_all_events_in_order() {
    let app = TestApp::new();
    let response = app.get("/api/v1/audit-logs").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["1", "2", "3", "4", "30"]);
    assert_eq!(json["has_more"], false);
}

#[tokio::test]
async fn test_filter_by_organization_returns_org_events_in_order() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?organization_id=org-1")
        .await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["1", "30"]);
}

#[tokio::test]
async fn test_filter_by_entity_type() {
    let app = TestApp::new();
    let response = app.get("/api/v1/audit-logs?entity_type=lab").await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["1"]);
}

#[tokio::test]
async fn test_combined_filters_are_anded() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?organization_id=org-1&action_type=assign")
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["30"]);
}

#[tokio::test]
async fn test_search_matches_entity_or_user_name_case_insensitively() {
    let app = TestApp::new();

    // "ahmed" appears only as a user name
    let response = app.get("/api/v1/audit-logs?search=ahmed").await;
    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["1", "30"]);

    // "gateway" appears only as an entity name
    let response = app.get("/api/v1/audit-logs?search=GATEWAY").await;
    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["4"]);
}

#[tokio::test]
async fn test_empty_filter_params_are_ignored() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?organization_id=&entity_type=&action_type=&search=&date_start=&date_end=")
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json).len(), 5);
}

#[tokio::test]
async fn test_date_range_bounds_are_inclusive() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?date_start=2024-03-15T09:00:00Z&date_end=2024-03-15T13:45:00Z")
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(event_ids(&json), vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_bare_end_date_is_midnight_and_excludes_later_events_that_day() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?date_start=2024-03-15&date_end=2024-03-16")
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    // Event 30 happens at 17:00 on the 16th, after the midnight bound.
    assert_eq!(event_ids(&json), vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_unknown_entity_type_returns_bad_request() {
    let app = TestApp::new();
    let response = app.get("/api/v1/audit-logs?entity_type=starship").await;

    response.assert_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_unparseable_date_returns_bad_request() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/audit-logs?date_start=last-tuesday")
        .await;

    response.assert_bad_request();
}

#[tokio::test]
async fn test_detail_returns_full_event() {
    let app = TestApp::new();
    let response = app.get("/api/v1/audit-logs/3").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["id"], "3");
    assert_eq!(json["entity_name"], "Rotterdam Port Facility");
    assert_eq!(json["changes"].as_array().unwrap().len(), 2);
    assert_eq!(json["changes"][0]["field"], "capacity");
}

#[tokio::test]
async fn test_detail_unknown_id_returns_404() {
    let app = TestApp::new();
    let response = app.get("/api/v1/audit-logs/999").await;

    response.assert_not_found();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_organizations_are_derived_from_events_and_name_sorted() {
    let app = TestApp::new();
    let response = app.get("/api/v1/organizations").await;

    response.assert_ok();

    let json: Vec<serde_json::Value> = response.json();
    let names: Vec<&str> = json.iter().map(|o| o["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Camin Cargo", "KIPIC", "Petrobras", "SGS"]);

    let ids: Vec<&str> = json.iter().map(|o| o["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["org-3", "org-1", "org-2", "org-4"]);
}

#[tokio::test]
async fn test_not_found_returns_404() {
    let app = TestApp::new();
    let response = app.get("/api/v1/nonexistent").await;

    response.assert_not_found();
}
