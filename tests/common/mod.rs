//! Shared test helpers: an in-process mock of the identity + database
//! provider, plus fixtures for building clients and dashboard state.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use paid_admin::{AppState, ProviderClient, ProviderConfig, UserConfig};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "s3cret";

/// Handle to a running mock provider. `records` is the live `paid_users`
/// store; tests seed and inspect it directly.
#[derive(Clone)]
pub struct MockProvider {
    pub identity_url: String,
    pub database_url: String,
    pub records: Arc<Mutex<HashMap<String, Value>>>,
}

#[derive(Clone)]
struct MockState {
    accounts: Arc<Vec<Value>>,
    records: Arc<Mutex<HashMap<String, Value>>>,
}

/// Spawn a mock provider serving the given identity accounts and an empty
/// paid-record store. The listener is bound before the task is spawned, so
/// the endpoint is connectable as soon as this returns.
pub async fn spawn_mock_provider(accounts: Vec<Value>) -> MockProvider {
    let records: Arc<Mutex<HashMap<String, Value>>> = Arc::new(Mutex::new(HashMap::new()));
    let state = MockState {
        accounts: Arc::new(accounts),
        records: records.clone(),
    };

    let app = Router::new()
        .route("/v1/accounts:batchGet", get(batch_get))
        .route("/v1/accounts:lookup", post(lookup))
        .route("/db/{*path}", get(db_get).patch(db_patch))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind mock provider listener");
    let addr = listener.local_addr().expect("should read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock provider server failed");
    });

    MockProvider {
        identity_url: format!("http://{addr}/v1"),
        database_url: format!("http://{addr}/db"),
        records,
    }
}

/// Build an identity account fixture in the provider's wire format.
pub fn account(uid: &str, email: &str, created_ms: i64, login_ms: i64) -> Value {
    json!({
        "localId": uid,
        "email": email,
        "providerUserInfo": [{"providerId": "password"}],
        "createdAt": created_ms.to_string(),
        "lastLoginAt": login_ms.to_string(),
    })
}

/// Build a provider client pointed at the mock.
pub fn provider_client(mock: &MockProvider, page_size: u32) -> ProviderClient {
    ProviderClient::new(ProviderConfig {
        identity_url: mock.identity_url.clone(),
        database_url: mock.database_url.clone(),
        access_token: "test-token".to_string(),
        timeout: Duration::from_secs(5),
        page_size,
    })
    .expect("should build provider client")
}

/// Dashboard state with the test basic-auth credentials.
pub fn dashboard_state(mock: &MockProvider, page_size: u32) -> AppState {
    let mut config = UserConfig::default();
    config.dashboard.username = TEST_USERNAME.to_string();
    config.dashboard.password = TEST_PASSWORD.to_string();
    AppState::new(provider_client(mock, page_size), config)
}

/// `Authorization` header value for the given basic-auth credentials.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

async fn batch_get(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page_size: usize = params
        .get("maxResults")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(100);
    let offset: usize = params
        .get("nextPageToken")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0);

    let end = (offset + page_size).min(state.accounts.len());
    let users: Vec<Value> = state.accounts[offset..end].to_vec();

    let mut response = json!({ "users": users });
    if end < state.accounts.len() {
        response["nextPageToken"] = json!(end.to_string());
    }
    Json(response)
}

async fn lookup(State(state): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    let matches = |account: &&Value| {
        if let Some(email) = body["email"][0].as_str() {
            account["email"].as_str() == Some(email)
        } else if let Some(uid) = body["localId"][0].as_str() {
            account["localId"].as_str() == Some(uid)
        } else {
            false
        }
    };

    match state.accounts.iter().find(matches) {
        Some(account) => Json(json!({ "users": [account] })),
        None => Json(json!({})),
    }
}

async fn db_get(State(state): State<MockState>, Path(path): Path<String>) -> Json<Value> {
    let records = state.records.lock().expect("records lock poisoned");

    if path == "paid_users.json" {
        if records.is_empty() {
            return Json(Value::Null);
        }
        let all: serde_json::Map<String, Value> =
            records.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        return Json(Value::Object(all));
    }

    let uid = path
        .strip_prefix("paid_users/")
        .and_then(|rest| rest.strip_suffix(".json"));
    match uid.and_then(|uid| records.get(uid)) {
        Some(record) => Json(record.clone()),
        None => Json(Value::Null),
    }
}

async fn db_patch(
    State(state): State<MockState>,
    Path(path): Path<String>,
    Json(patch): Json<Value>,
) -> Json<Value> {
    let uid = path
        .strip_prefix("paid_users/")
        .and_then(|rest| rest.strip_suffix(".json"))
        .expect("patch path should target a single record");

    let mut records = state.records.lock().expect("records lock poisoned");
    let entry = records.entry(uid.to_string()).or_insert_with(|| json!({}));

    // Merge-upsert: fields absent from the patch keep their stored value.
    if let (Some(target), Some(fields)) = (entry.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }

    Json(entry.clone())
}
