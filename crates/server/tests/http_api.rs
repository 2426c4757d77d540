use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chatroom_server::chat::presence::sweep_at;
use chatroom_server::core::store::ChatStore;
use chatroom_server::core::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt; // for `oneshot`

struct TestApp {
    _dir: TempDir,
    url: String,
    store: Arc<ChatStore>,
    app: Router,
}

async fn test_app() -> TestApp {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("chat.sqlite").display());
    let store = Arc::new(ChatStore::connect(&url).await.unwrap());
    let state = AppState::new(store.clone());
    TestApp {
        _dir: dir,
        url,
        store,
        app: chatroom_server::app(state),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn register(name: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/participants")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap()
}

fn post_message(user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/messages")
        .header("Content-Type", "application/json")
        .header("user", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_messages(user: &str, query: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/messages{}", query))
        .header("user", user)
        .body(Body::empty())
        .unwrap()
}

fn heartbeat(user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/status");
    if let Some(user) = user {
        builder = builder.header("user", user);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_register_conflict_and_list() {
    let t = test_app().await;

    let (status, _) = send(&t.app, register(json!("Ana"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&t.app, register(json!("Ana"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"].is_string());

    let (status, body) = send(
        &t.app,
        Request::builder()
            .uri("/participants")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Ana");
    assert!(list[0]["lastSeen"].is_i64());
}

#[tokio::test]
async fn test_register_rejects_invalid_names() {
    let t = test_app().await;

    for name in [json!(""), json!(42), json!(null)] {
        let (status, _) = send(&t.app, register(name)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    // Malformed JSON is a validation error too, not a 400.
    let (status, _) = send(
        &t.app,
        Request::builder()
            .method("POST")
            .uri("/participants")
            .header("Content-Type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(t.store.list_participants().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_message_flow_and_visibility() {
    let t = test_app().await;
    for name in ["Ana", "Bia", "Caio"] {
        let (status, _) = send(&t.app, register(json!(name))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &t.app,
        post_message("Ana", json!({"to": "Todos", "text": "oi", "kind": "broadcast"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &t.app,
        post_message("Ana", json!({"to": "Bia", "text": "segredo", "kind": "directed"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&t.app, get_messages("Caio", "")).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["joined", "joined", "joined", "oi"]);

    let (_, body) = send(&t.app, get_messages("Bia", "?limit=2")).await;
    let last = body.as_array().unwrap();
    assert_eq!(last.len(), 2);
    assert_eq!(last[0]["text"], "oi");
    assert_eq!(last[1]["text"], "segredo");
    assert_eq!(last[1]["from"], "Ana");
    assert_eq!(last[1]["to"], "Bia");
    assert_eq!(last[1]["kind"], "directed");
}

#[tokio::test]
async fn test_post_message_rejections() {
    let t = test_app().await;
    send(&t.app, register(json!("Ana"))).await;
    let before = t.store.list_messages().await.unwrap().len();

    let cases = [
        post_message("ghost", json!({"to": "Todos", "text": "oi", "kind": "broadcast"})),
        post_message("Ana", json!({"to": "Todos", "text": "oi", "kind": "status"})),
        post_message("Ana", json!({"to": "Todos", "kind": "broadcast"})),
        post_message("Ana", json!({"to": "", "text": "oi", "kind": "broadcast"})),
    ];
    for request in cases {
        let (status, _) = send(&t.app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (status, _) = send(
        &t.app,
        Request::builder()
            .method("POST")
            .uri("/messages")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"to": "Todos", "text": "oi", "kind": "broadcast"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(t.store.list_messages().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_invalid_limit() {
    let t = test_app().await;
    send(&t.app, register(json!("Ana"))).await;

    for query in ["?limit=0", "?limit=-1", "?limit=abc", "?limit=1&limit=2"] {
        let (status, body) = send(&t.app, get_messages("Ana", query)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", query);
        assert!(body["error"]["message"].is_string(), "{}", query);
    }
}

#[tokio::test]
async fn test_heartbeat_and_eviction() {
    let t = test_app().await;

    let (status, _) = send(&t.app, heartbeat(Some("Ana"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&t.app, heartbeat(None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&t.app, register(json!("Ana"))).await;
    send(&t.app, register(json!("Bia"))).await;

    let (status, _) = send(&t.app, heartbeat(Some("Ana"))).await;
    assert_eq!(status, StatusCode::OK);

    let later = chrono::Utc::now() + chrono::Duration::seconds(20);
    let mut evicted = sweep_at(&t.store, later).await.unwrap();
    evicted.sort();
    assert_eq!(evicted, vec!["Ana", "Bia"]);

    let (_, body) = send(&t.app, get_messages("Someone", "")).await;
    let left: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["text"] == "left")
        .collect();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|m| m["to"] == "Todos" && m["kind"] == "status"));

    let (status, _) = send(&t.app, heartbeat(Some("Ana"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_join_announcement_answers_500() {
    let t = test_app().await;

    // Break the message log behind the server's back.
    let pool = sqlx::SqlitePool::connect(&t.url).await.unwrap();
    sqlx::query("DROP TABLE messages").execute(&pool).await.unwrap();
    pool.close().await;

    let (status, body) = send(&t.app, register(json!("Ana"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"].is_string());

    assert!(t.store.participant_exists("Ana").await.unwrap());
    let (status, _) = send(&t.app, register(json!("Ana"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

fn health() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_reports_store_reachability() {
    let t = test_app().await;

    let response = t.app.clone().oneshot(health()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    t.store.close().await;
    let (status, body) = send(&t.app, health()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_unreadable_user_header() {
    let t = test_app().await;
    send(&t.app, register(json!("Ana"))).await;
    let latin1 = axum::http::HeaderValue::from_bytes(b"Jo\xe3o").unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/status")
        .header("user", latin1.clone())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri("/messages")
        .header("user", latin1)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
