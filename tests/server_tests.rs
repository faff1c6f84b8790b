//! Router tests: dashboard views and JSON API against a scratch kitchen.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use kitchen::server::{router, AppState};
use kitchen::{AppConfig, KitchenRepo};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Test Setup Helpers
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn copy_dir(src: &Path, dst: &Path) {
    std::fs::create_dir_all(dst).unwrap();
    for entry in std::fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Config pointing at a copy of the fixture under `<tmp>/kitchen`.
fn test_config(build_data_bag: bool) -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&Path::new(FIXTURES_DIR).join("kitchen"), &dir.path().join("kitchen"));

    let mut config = AppConfig::builder()
        .base_path(dir.path())
        .repo_name("kitchen")
        .build();
    config.repo.syncdate_file = dir.path().join("syncdate");

    if build_data_bag {
        KitchenRepo::new(&config.repo).build_node_data_bag().unwrap();
    }
    (dir, config)
}

fn create_test_router(config: AppConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_main_view_default_filters() {
    let (_dir, config) = test_config(true);
    let (status, html) = get(create_test_router(config), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Kitchen</title>"));
    assert!(html.contains("Environment"));
    assert!(html.contains("Roles"));
    assert!(html.contains("<table id=\"nodes\">"));
    assert!(html.contains("<td>testnode1</td>"));
    assert!(html.contains("<td>testnode5</td>"));
    // Hosts and other environments are filtered out by default
    assert!(!html.contains("<td>testnode4</td>"));
    assert!(!html.contains("<td>testnode3.mydomain.com</td>"));
    assert!(html.contains("Showing 4 nodes"));
}

#[tokio::test]
async fn test_main_view_host_filter() {
    let (_dir, config) = test_config(true);
    let (_, html) = get(create_test_router(config), "/?env=production&virt=host").await;
    assert!(html.contains("<td>testnode4</td>"));
    assert!(!html.contains("<td>testnode1</td>"));
}

#[tokio::test]
async fn test_main_view_tag_buttons() {
    let (_dir, config) = test_config(true);
    let (_, html) = get(create_test_router(config), "/").await;
    assert!(html.contains("<a class=\"btn btn-custom btn-danger disabled\">WIP</a>"));
    assert!(html.contains("<a class=\"btn btn-custom  disabled\">ATest</a>"));
    assert!(html.contains("<a class=\"btn btn-custom btn-danger disabled\">dummy</a>"));
}

#[tokio::test]
async fn test_main_view_no_matching_nodes() {
    let (_dir, config) = test_config(true);
    let (status, html) = get(
        create_test_router(config),
        "/?env=staging&roles=dbserver&virt=guest",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("There are no nodes that fit the supplied criteria."));
    assert!(html.contains("No nodes to display"));
}

#[tokio::test]
async fn test_main_view_repo_error_is_a_message() {
    let (_dir, config) = test_config(false);
    let (status, html) = get(create_test_router(config), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("alert-error"));
    assert!(html.contains("The &#x27;node&#x27; data bag has not yet been built"));
    assert!(!html.contains("<table id=\"nodes\">"));
}

#[tokio::test]
async fn test_main_view_open_row_and_search() {
    let (_dir, config) = test_config(true);
    let (_, html) = get(create_test_router(config), "/?open=testnode2&search=loadbalancer").await;
    assert!(html.contains("<td class=\"details\""));
    assert!(html.contains("<span class=\"key\">\"recipes\":</span>"));
    assert!(html.contains("value=\"loadbalancer\""));
    assert!(html.contains("Showing 1 nodes (filtering from 4 total)"));
}

#[tokio::test]
async fn test_main_view_plugins_add_links() {
    let (_dir, mut config) = test_config(true);
    config.plugins.enabled = vec!["haproxy".to_string()];
    let (_, html) = get(create_test_router(config), "/").await;
    assert!(html.contains("href=\"http://testnode2.mydomain.com:22002\""));
}

#[tokio::test]
async fn test_virt_view_groups_guests() {
    let (_dir, config) = test_config(true);
    let (status, html) = get(create_test_router(config), "/virt/").await;
    assert_eq!(status, StatusCode::OK);

    let header = html.find("id=\"host_grouper\">testnode4</td>").unwrap();
    let guest5 = html.find("<td>testnode5</td>").unwrap();
    let guest6 = html.find("<td>testnode6</td>").unwrap();
    assert!(header < guest5 && guest5 < guest6);
}

#[tokio::test]
async fn test_virt_view_disabled() {
    let (_dir, mut config) = test_config(true);
    config.dashboard.show_virt_view = false;
    let (status, _) = get(create_test_router(config), "/virt/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_graph_view() {
    let (_dir, config) = test_config(true);
    let (status, html) = get(create_test_router(config), "/graph/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<pre id=\"node_map\">digraph G {"));
    assert!(html.contains("&quot;testnode2&quot; -&gt; &quot;testnode1&quot;"));
}

#[tokio::test]
async fn test_graph_view_requires_environment() {
    let (_dir, config) = test_config(true);
    let (status, html) = get(create_test_router(config), "/graph/?env=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Please select an environment"));
    assert!(!html.contains("node_map"));
}

// ============================================================================
// API
// ============================================================================

#[tokio::test]
async fn test_api_nodes() {
    let (_dir, config) = test_config(true);
    let app = create_test_router(config);

    let (status, nodes) = get_json(app.clone(), "/api/nodes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nodes.as_array().unwrap().len(), 7);

    let (_, nodes) = get_json(app.clone(), "/api/nodes?env=production").await;
    assert_eq!(nodes.as_array().unwrap().len(), 5);

    let (_, nodes) = get_json(app, "/api/nodes?extended=true&virt=host").await;
    let nodes = nodes.as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["name"], "testnode4");
    assert!(nodes[0].get("role").is_some());
}

#[tokio::test]
async fn test_api_nodes_rejects_post() {
    let (_dir, config) = test_config(true);
    let response = create_test_router(config)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/nodes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_api_single_node() {
    let (_dir, config) = test_config(true);
    let app = create_test_router(config);

    let (status, node) = get_json(app.clone(), "/api/nodes/testnode2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node["name"], "testnode2");
    assert!(node.get("roles").is_none());

    let (status, _) = get(app, "/api/nodes/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_node_rejects_paths_outside_kitchen() {
    let (dir, config) = test_config(true);
    std::fs::write(dir.path().join("secret.json"), r#"{"password": "hunter2"}"#).unwrap();
    let app = create_test_router(config);

    for uri in [
        "/api/nodes/..%2F..%2Fsecret",
        "/api/nodes/..%2Fsecret",
        "/api/nodes/..%5C..%5Csecret",
    ] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!body.contains("hunter2"));
    }
}

#[tokio::test]
async fn test_api_node_details() {
    let (_dir, config) = test_config(true);
    let app = create_test_router(config);

    let (status, html) = get(app.clone(), "/api/nodes/testnode3/details").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.starts_with("<pre>"));
    assert!(html.contains("testnode3.mydomain.com"));

    let (_, html) = get(app, "/api/nodes/nonexistent/details").await;
    assert!(html.starts_with("<pre class=\"not-found\">"));
}

#[tokio::test]
async fn test_api_roles() {
    let (_dir, config) = test_config(true);
    let (status, roles) = get_json(create_test_router(config), "/api/roles").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = roles
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["dbserver", "env_production", "loadbalancer", "webserver"]);
}

#[tokio::test]
async fn test_api_error_when_kitchen_missing() {
    let (_dir, mut config) = test_config(true);
    config.repo.name = "missing".to_string();
    let (status, body) = get_json(create_test_router(config), "/api/roles").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Repo dir doesn't exist"));
}
