//! GraphQL client against an in-process mock of the remote API.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use mfg_gateway::remote::{
    EntityKind, GraphqlEntityClient, ListOptions, RemoteEntityClient, RemoteError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Default)]
struct Recorded {
    requests: Mutex<Vec<(Option<String>, Value)>>,
}

/// Answers by looking at the query text
async fn graphql(
    State(recorded): State<Arc<Recorded>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    recorded.requests.lock().push((auth, body.clone()));

    let query = body["query"].as_str().unwrap_or_default();
    let id = body["variables"]["id"].as_str().unwrap_or_default();

    if id == "explode" {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    if id == "forbidden" {
        return Json(json!({"data": null, "errors": [{"message": "not allowed"}]})).into_response();
    }
    if query.contains("createOrder") {
        let mut order = body["variables"]["input"].clone();
        order["id"] = json!("o-100");
        return Json(json!({"data": {"createOrder": order}})).into_response();
    }
    if query.contains("updatePart") {
        let mut part = body["variables"]["input"].clone();
        part["id"] = json!(id);
        return Json(json!({"data": {"updatePart": part}})).into_response();
    }
    if query.contains("parts(") {
        return Json(json!({"data": {"parts": [{"id": "p-1"}, {"id": "p-2"}]}})).into_response();
    }
    if id == "missing" {
        return Json(json!({"data": {"part": null}})).into_response();
    }
    Json(json!({"data": {"part": {"id": id, "name": "bracket"}}})).into_response()
}

async fn start_mock() -> (GraphqlEntityClient, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(Arc::clone(&recorded));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = GraphqlEntityClient::new(
        &format!("http://{}/", addr),
        "secret-token".to_string(),
        Duration::from_secs(2),
        Duration::from_secs(5),
    )
    .unwrap();
    (client, recorded)
}

#[tokio::test]
async fn test_get_sends_bearer_token_and_id() {
    let (client, recorded) = start_mock().await;

    let part = client.get(EntityKind::Part, "p-5").await.unwrap();
    assert_eq!(part["name"], json!("bracket"));

    let requests = recorded.requests.lock();
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
    assert_eq!(body["variables"]["id"], json!("p-5"));
    assert!(body["query"].as_str().unwrap().contains("part(id: $id)"));
}

#[tokio::test]
async fn test_error_mapping() {
    let (client, _) = start_mock().await;

    match client.get(EntityKind::Part, "missing").await {
        Err(RemoteError::NotFound { kind, id }) => {
            assert_eq!(kind, EntityKind::Part);
            assert_eq!(id, "missing");
        }
        other => panic!("expected not found, got {:?}", other),
    }

    match client.get(EntityKind::Part, "explode").await {
        Err(RemoteError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected status error, got {:?}", other),
    }

    match client.get(EntityKind::Part, "forbidden").await {
        Err(RemoteError::GraphQl(message)) => assert_eq!(message, "not allowed"),
        other => panic!("expected GraphQL error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_and_list() {
    let (client, recorded) = start_mock().await;

    let payload = json!({"customer_id": "c-1", "items": [{"part_id": "p-1", "quantity": 1}]});
    let created = client
        .create(EntityKind::Order, payload.as_object().cloned().unwrap())
        .await
        .unwrap();
    assert_eq!(created["id"], json!("o-100"));
    assert_eq!(created["customer_id"], json!("c-1"));

    let mut options = ListOptions::default();
    options.filters.insert("status".to_string(), json!("active"));
    let parts = client.list(EntityKind::Part, &options).await.unwrap();
    assert_eq!(parts.len(), 2);

    let requests = recorded.requests.lock();
    let (_, list_body) = requests.last().unwrap();
    assert_eq!(list_body["variables"]["status"], json!("active"));
    assert_eq!(list_body["variables"]["perPage"], json!(30));
    assert!(list_body["query"].as_str().unwrap().contains("$status: String"));
}

#[tokio::test]
async fn test_update_sends_id_and_input() {
    let (client, recorded) = start_mock().await;

    let payload = json!({"status": "obsolete"});
    let updated = client
        .update(EntityKind::Part, "p-9", payload.as_object().cloned().unwrap())
        .await
        .unwrap();
    assert_eq!(updated["id"], json!("p-9"));
    assert_eq!(updated["status"], json!("obsolete"));

    let requests = recorded.requests.lock();
    let (_, body) = &requests[0];
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("mutation UpdatePart($id: ID!, $input: UpdatePartInput!)"));
    assert!(query.contains("updatePart(id: $id, input: $input)"));
    assert_eq!(body["variables"]["id"], json!("p-9"));
    assert_eq!(body["variables"]["input"], payload);
}

#[tokio::test]
async fn test_list_rejects_unsafe_filter_names_before_sending() {
    let (client, recorded) = start_mock().await;

    let mut reserved = ListOptions::default();
    reserved.filters.insert("page".to_string(), json!(7));
    match client.list(EntityKind::Part, &reserved).await {
        Err(RemoteError::InvalidRequest(message)) => assert!(message.contains("page")),
        other => panic!("expected invalid request, got {:?}", other),
    }

    let mut injected = ListOptions::default();
    injected
        .filters
        .insert("status: $x) { __typename } #".to_string(), json!("a"));
    match client.list(EntityKind::Part, &injected).await {
        Err(RemoteError::InvalidRequest(message)) => assert!(message.contains("GraphQL name")),
        other => panic!("expected invalid request, got {:?}", other),
    }

    assert!(recorded.requests.lock().is_empty());
}
