use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use userbase_infra::InMemoryUserStore;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, fresh in-memory store, ephemeral port.
        let app = userbase_api::app::build_app(Arc::new(InMemoryUserStore::new()));
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
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/users"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn create_ok(&self, body: Value) -> Value {
        let res = self.create(body).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn list(&self) -> Vec<Value> {
        let res = self.client.get(self.url("/users")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn get(&self, id: &str) -> reqwest::Response {
        self.client
            .get(self.url(&format!("/users/{id}")))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_user() -> Value {
    json!({
        "name": "Test User",
        "username": "testuser",
        "email": "test@example.com",
        "phone": "1234567890",
    })
}

#[tokio::test]
async fn create_user_returns_201_with_body() {
    let srv = TestServer::spawn().await;

    let body = srv.create_ok(test_user()).await;

    assert_eq!(body["name"], "Test User");
    assert_eq!(body["username"], "testuser");
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["phone"], "1234567890");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn create_user_missing_fields_returns_400_and_adds_nothing() {
    let srv = TestServer::spawn().await;

    let res = srv.create(json!({ "name": "Incomplete User" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    for field in ["name", "username", "email"] {
        let mut input = test_user();
        input[field] = json!("");
        let res = srv.create(input).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "empty {field}");
    }

    assert!(srv.list().await.is_empty());
}

#[tokio::test]
async fn get_unknown_well_formed_id_returns_404() {
    let srv = TestServer::spawn().await;

    // Mongo-style ObjectId: well-formed elsewhere, never a stored id here.
    let res = srv.get("507f1f77bcf86cd799439011").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.get("0190f3a4-5b6c-7d8e-9f01-23456789abcd").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_return_404_on_every_id_route() {
    let srv = TestServer::spawn().await;
    let url = srv.url("/users/not-a-valid-id");

    let res = srv.client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .put(&url)
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_changes_only_supplied_fields() {
    let srv = TestServer::spawn().await;
    let created = srv.create_ok(test_user()).await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/users/{id}")))
        .json(&json!({ "name": "Updated Name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Updated Name");

    let res = srv.get(id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["name"], "Updated Name");
    assert_eq!(fetched["username"], created["username"]);
    assert_eq!(fetched["email"], created["email"]);
    assert_eq!(fetched["phone"], created["phone"]);
}

#[tokio::test]
async fn update_unknown_id_returns_404() {
    let srv = TestServer::spawn().await;
    let created = srv.create_ok(test_user()).await;
    let id = created["id"].as_str().unwrap();

    srv.client
        .delete(srv.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();

    let res = srv
        .client
        .put(srv.url(&format!("/users/{id}")))
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_then_get_returns_404() {
    let srv = TestServer::spawn().await;
    let created = srv.create_ok(test_user()).await;
    let id = created["id"].as_str().unwrap();

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.get(id).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(srv.list().await.is_empty());
}

#[tokio::test]
async fn list_on_empty_store_is_empty_array() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_counts_every_successful_create_and_round_trips_ids() {
    let srv = TestServer::spawn().await;

    let mut created = Vec::new();
    for n in 0..5 {
        created.push(
            srv.create_ok(json!({
                "name": format!("User {n}"),
                "username": format!("user{n}"),
                "email": format!("user{n}@example.com"),
            }))
            .await,
        );
    }

    let listed = srv.list().await;
    assert_eq!(listed.len(), created.len());

    for user in &created {
        let res = srv.get(user["id"].as_str().unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let fetched: Value = res.json().await.unwrap();
        assert_eq!(&fetched, user);
        assert!(fetched["phone"].is_null());
    }
}
