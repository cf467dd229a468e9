use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockfinder_api::app::{self, services::AppServices};
use stockfinder_catalog::{InventoryRecord, Item, Seller};
use stockfinder_core::{InventoryRecordId, ItemId, Money, SellerId, UserId};
use stockfinder_infra::AppConfig;

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, bound to an ephemeral port.
        let services = Arc::new(AppServices::in_memory(AppConfig::default()));
        let app = app::build_app(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Seed one item at one seller; returns the record id.
    fn stock(&self, item: &str, seller: &str, rating: f64, cents: u64, quantity: u32) -> InventoryRecordId {
        let catalog = &self.services.catalog;
        let item = Item::named(ItemId::new(), item);
        let seller = Seller::new(SellerId::new(), seller, "1 Main St", "555-0100", rating, 10).unwrap();
        let record = InventoryRecord {
            id: InventoryRecordId::new(),
            item_id: item.id,
            seller_id: seller.id,
            unit_price: Money::from_cents(cents),
            quantity,
        };
        let id = record.id;
        catalog.insert_item(item).unwrap();
        catalog.insert_seller(seller).unwrap();
        catalog.insert_record(record).unwrap();
        id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn search(client: &reqwest::Client, srv: &TestServer, params: &[(&str, &str)]) -> reqwest::Response {
    client
        .get(srv.url("/search"))
        .query(params)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_classifies_filters_and_ranks() {
    let srv = TestServer::spawn().await;
    srv.stock("Acetaminophen 500mg", "City Pharmacy", 4.5, 450, 12);
    srv.stock("Acetaminophen 500mg", "Corner Drugs", 3.0, 399, 3);
    srv.stock("Ibuprofen", "City Pharmacy", 4.5, 700, 12);

    let client = reqwest::Client::new();
    let res = search(&client, &srv, &[("q", "acet")]).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "applied");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["unit_price"], "3.99");
    assert_eq!(results[0]["stock_state"], "low_stock");
    assert_eq!(results[1]["unit_price"], "4.50");
    assert_eq!(results[1]["stock_label"], "In Stock");

    let res = search(&client, &srv, &[("q", "acet"), ("filter", "in_stock")]).await;
    let body: serde_json::Value = res.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["seller_name"], "City Pharmacy");

    let res = search(&client, &srv, &[("q", "acet"), ("sort", "rating")]).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["results"][0]["rating"], 4.5);
}

#[tokio::test]
async fn blank_query_is_skipped_and_bad_tokens_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = search(&client, &srv, &[("q", "   ")]).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "skipped");

    let res = search(&client, &srv, &[("q", "acet"), ("filter", "some")]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_filter");

    let res = search(&client, &srv, &[("q", "acet"), ("sort", "random")]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_search_reports_and_keeps_visible_results() {
    let srv = TestServer::spawn().await;
    srv.stock("Acetaminophen", "City Pharmacy", 4.5, 450, 12);
    let user = UserId::new().to_string();
    let client = reqwest::Client::new();

    let res = search(&client, &srv, &[("q", "acet"), ("user_id", user.as_str())]).await;
    assert_eq!(res.status(), StatusCode::OK);

    srv.services.catalog.set_available(false);
    let res = search(&client, &srv, &[("q", "acetaminophen"), ("user_id", user.as_str())]).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "search_failed");
    srv.services.catalog.set_available(true);

    let res = client
        .get(srv.url("/search/visible"))
        .query(&[("user_id", &user)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["generation"], 1);
    assert_eq!(body["query"]["text"], "acet");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn identified_searches_show_up_in_history() {
    let srv = TestServer::spawn().await;
    let user = UserId::new().to_string();
    let client = reqwest::Client::new();

    for q in ["aspirin", "acet", "ibu"] {
        search(&client, &srv, &[("q", q), ("user_id", user.as_str())]).await;
    }
    search(&client, &srv, &[("q", "anonymous")]).await;

    // History writes land in the background; wait for all three.
    let all = get_history_eventually(&client, &srv, &user, 3).await;
    assert_eq!(all.len(), 3);

    let res = client
        .get(srv.url(&format!("/users/{user}/history")))
        .query(&[("limit", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history_queries(&body), vec!["ibu", "acet"]);
}

fn history_queries(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| e["query"].as_str().unwrap().to_string())
        .collect()
}

async fn get_history_eventually(
    client: &reqwest::Client,
    srv: &TestServer,
    user: &str,
    expected: usize,
) -> Vec<String> {
    for _ in 0..50 {
        let res = client
            .get(srv.url(&format!("/users/{user}/history")))
            .send()
            .await
            .unwrap();
        if res.status() == StatusCode::OK {
            let body: serde_json::Value = res.json().await.unwrap();
            let queries = history_queries(&body);
            if queries.len() >= expected {
                return queries;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("history for {user} never reached {expected} entries");
}

#[tokio::test]
async fn reservation_lifecycle_over_http() {
    let srv = TestServer::spawn().await;
    let record_id = srv.stock("Acetaminophen", "City Pharmacy", 4.5, 450, 3);
    let user = UserId::new().to_string();
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/reservations"))
        .json(&json!({"user_id": user, "record_id": record_id.to_string(), "quantity": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["total_price"], "13.50");
    let id = created["id"].as_str().unwrap().to_string();

    // Everything is held now.
    let body: serde_json::Value = search(&client, &srv, &[("q", "acet")]).await.json().await.unwrap();
    assert_eq!(body["results"][0]["stock_state"], "out_of_stock");

    let res = client
        .post(srv.url("/reservations"))
        .json(&json!({"user_id": user, "record_id": record_id.to_string(), "quantity": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    let res = client
        .post(srv.url(&format!("/reservations/{id}/complete")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");

    let res = client
        .post(srv.url(&format!("/reservations/{id}/cancel")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "cancelled");

    let body: serde_json::Value = search(&client, &srv, &[("q", "acet")]).await.json().await.unwrap();
    assert_eq!(body["results"][0]["quantity"], 3);
    assert_eq!(body["results"][0]["stock_state"], "low_stock");

    let res = client
        .get(srv.url(&format!("/users/{user}/reservations")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list: serde_json::Value = res.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["status"], "cancelled");
    assert_eq!(list[0]["item_name"], "Acetaminophen");
    assert_eq!(list[0]["seller_address"], "1 Main St");
}

#[tokio::test]
async fn confirm_then_complete() {
    let srv = TestServer::spawn().await;
    let record_id = srv.stock("Amoxicillin", "City Pharmacy", 4.5, 1200, 10);
    let user = UserId::new().to_string();
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(srv.url("/reservations"))
        .json(&json!({"user_id": user, "record_id": record_id.to_string(), "quantity": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    for (action, status) in [("confirm", "confirmed"), ("complete", "completed")] {
        let res = client
            .post(srv.url(&format!("/reservations/{id}/{action}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["status"], status);
    }

    let res = client.get(srv.url(&format!("/reservations/{id}"))).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["total_price"], "24.00");
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/reservations/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url(&format!("/reservations/{}/confirm", UserId::new())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/reservations"))
        .json(&json!({
            "user_id": UserId::new().to_string(),
            "record_id": InventoryRecordId::new().to_string(),
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url("/search/visible"))
        .query(&[("user_id", UserId::new().to_string())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_quantity_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let record_id = srv.stock("Acetaminophen", "City Pharmacy", 4.5, 450, 3);
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/reservations"))
        .json(&json!({
            "user_id": UserId::new().to_string(),
            "record_id": record_id.to_string(),
            "quantity": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
