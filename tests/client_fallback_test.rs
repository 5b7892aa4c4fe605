mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{test_config, unreachable_url, TestApp};
use inventory_api::{
    client::{ClientConfig, ClientError, InventoryClient},
    config::InstanceRole,
    db::{self, DbConfig},
    models::NewItem,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client(primary: &str, fallback: Option<&str>) -> InventoryClient {
    InventoryClient::new(ClientConfig {
        primary_url: primary.to_string(),
        fallback_url: fallback.map(str::to_string),
        timeout: Duration::from_secs(2),
    })
    .expect("client config")
}

#[tokio::test]
async fn count_uses_fallback_when_primary_is_down() {
    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 7})))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client(&unreachable_url(), Some(&fallback.uri()));
    assert_eq!(client.count_items().await.unwrap(), 7);
}

#[tokio::test]
async fn clear_uses_fallback_on_server_error() {
    let primary = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/clear-list"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&primary)
        .await;

    let fallback = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/clear-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "2 items cleared from the list.",
            "deleted_count": 2
        })))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client(&primary.uri(), Some(&fallback.uri()));
    let response = client.clear_list().await.unwrap();
    assert_eq!(response.deleted_count, 2);
}

#[tokio::test]
async fn stats_total_survives_a_failing_count() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path("/view-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [
            {"id": "a", "name": "Widget", "quantity": 2, "category": "Parts",
             "description": null, "price": "1.50", "created_at": "2025-01-01T10:00:00Z"},
            {"id": "b", "name": "Hammer", "quantity": 9, "category": "Tools",
             "description": "Claw", "price": null, "created_at": "2025-01-02T10:00:00Z"}
        ]})))
        .expect(1)
        .mount(&primary)
        .await;

    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 2})))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client(&primary.uri(), Some(&fallback.uri()));
    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.total_quantity, 11);
    assert_eq!(stats.categories, vec!["Parts", "Tools"]);
    assert_eq!(stats.low_stock.len(), 1);
    assert_eq!(stats.low_stock[0].id, "a");
    assert_eq!(stats.recent[0].id, "b");
}

#[tokio::test]
async fn stats_needs_the_primary_for_the_item_list() {
    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 4})))
        .mount(&fallback)
        .await;
    Mock::given(method("GET"))
        .and(path("/view-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&fallback)
        .await;

    let client = client(&unreachable_url(), Some(&fallback.uri()));
    assert_matches!(
        client.stats().await,
        Err(ClientError::Transport { .. })
    );
}

#[tokio::test]
async fn add_item_never_touches_fallback() {
    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fallback)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&fallback)
        .await;

    let client = client(&unreachable_url(), Some(&fallback.uri()));
    let err = client
        .add_item(NewItem::new("Widget", 3))
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Transport { .. });
}

#[tokio::test]
async fn primary_errors_surface_for_other_operations() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/view-list"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Service Unavailable",
            "message": "Service unavailable: maintenance",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .mount(&primary)
        .await;

    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&fallback)
        .await;

    let client = client(&primary.uri(), Some(&fallback.uri()));
    let err = client.view_list().await.unwrap_err();
    assert_matches!(
        err,
        ClientError::Http { status: 503, ref message, .. } if message == "Service unavailable: maintenance"
    );
}

#[tokio::test]
async fn fallback_error_is_surfaced_when_both_fail() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&primary)
        .await;

    let fallback = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/count-items"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&fallback)
        .await;

    let client = client(&primary.uri(), Some(&fallback.uri()));
    let err = client.count_items().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn client_round_trip_against_live_instances() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("items.db").display());
    let pool = Arc::new(
        db::establish_connection_with_config(&DbConfig {
            url,
            max_connections: 2,
            ..Default::default()
        })
        .await
        .expect("file-backed sqlite"),
    );
    db::run_migrations(&pool).await.expect("migrations");

    let primary = TestApp::from_pool(pool.clone(), test_config(InstanceRole::Primary));
    let fallback = TestApp::from_pool(pool, test_config(InstanceRole::Fallback));
    let primary_url = primary.spawn().await;
    let fallback_url = fallback.spawn().await;

    let client = client(&primary_url, Some(&fallback_url));
    let added = client
        .add_item(NewItem::new("Widget", 3))
        .await
        .expect("add item");
    assert_eq!(added.message, "Item added successfully");

    let items = client.view_list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, added.item_id);
    assert_eq!(items[0].category, "Uncategorized");

    let found = client.search_items("widg").await.unwrap();
    assert_eq!(found.len(), 1);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.categories, vec!["Uncategorized"]);
    assert_eq!(stats.low_stock.len(), 1);

    // A client whose primary is gone still counts through the fallback instance.
    let degraded = client_with_dead_primary(&fallback_url);
    assert_eq!(degraded.count_items().await.unwrap(), 1);

    let cleared = degraded.clear_list().await.unwrap();
    assert_eq!(cleared.deleted_count, 1);
    assert_eq!(client.count_items().await.unwrap(), 0);

    let err = client.delete_item(&added.item_id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

fn client_with_dead_primary(fallback_url: &str) -> InventoryClient {
    client(&unreachable_url(), Some(fallback_url))
}
