use std::sync::{Arc, Mutex};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::post,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use quarry_config::EmbeddingProviderConfig;
use quarry_providers::{EmbeddingClient, Error};

#[derive(Clone)]
struct FakeProvider {
	reply: Arc<(StatusCode, Value)>,
	seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}
impl FakeProvider {
	fn new(status: StatusCode, reply: Value) -> Self {
		Self { reply: Arc::new((status, reply)), seen: Arc::new(Mutex::new(Vec::new())) }
	}

	fn seen(&self) -> Vec<(Option<String>, Value)> {
		self.seen.lock().expect("Fake provider lock poisoned.").clone()
	}
}

async fn embeddings(
	State(fake): State<FakeProvider>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Response {
	let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_string);

	fake.seen.lock().expect("Fake provider lock poisoned.").push((auth, body));

	let (status, reply) = fake.reply.as_ref();

	(*status, Json(reply.clone())).into_response()
}

async fn spawn_provider(fake: FakeProvider) -> String {
	let router = Router::new().route("/v1/embeddings", post(embeddings)).with_state(fake);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind fake provider.");
	let addr = listener.local_addr().expect("Failed to read fake provider address.");

	tokio::spawn(async move {
		axum::serve(listener, router).await.expect("Fake provider stopped.");
	});

	format!("http://{addr}")
}

fn provider_config(api_base: String) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base,
		api_key: "test-key".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "text-embedding-ada-002".to_string(),
		dimensions: None,
		timeout_ms: Some(5_000),
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		quarry_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut defaults = Map::new();

	defaults.insert("X-Retries".to_string(), Value::from(3));

	let err = quarry_providers::auth_headers("secret", &defaults)
		.expect_err("Expected invalid config error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn embed_posts_model_and_single_input() {
	let fake = FakeProvider::new(
		StatusCode::OK,
		serde_json::json!({ "data": [{ "index": 0, "embedding": [0.25, -0.5] }] }),
	);
	let api_base = spawn_provider(fake.clone()).await;
	let client = EmbeddingClient::new(provider_config(api_base)).expect("Failed to build client.");
	let vector = client.embed("cats").await.expect("Embedding failed.");

	assert_eq!(vector, vec![0.25, -0.5]);

	let seen = fake.seen();

	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].0.as_deref(), Some("Bearer test-key"));
	assert_eq!(seen[0].1["model"], "text-embedding-ada-002");
	assert_eq!(seen[0].1["input"], serde_json::json!(["cats"]));
	assert!(seen[0].1.get("dimensions").is_none());
}

#[tokio::test]
async fn embed_sends_dimensions_when_configured() {
	let fake = FakeProvider::new(
		StatusCode::OK,
		serde_json::json!({ "data": [{ "index": 0, "embedding": [1.0, 2.0, 3.0] }] }),
	);
	let api_base = spawn_provider(fake.clone()).await;
	let mut cfg = provider_config(api_base);

	cfg.dimensions = Some(3);

	let client = EmbeddingClient::new(cfg).expect("Failed to build client.");

	client.embed("dogs").await.expect("Embedding failed.");

	assert_eq!(fake.seen()[0].1["dimensions"], 3);
}

#[tokio::test]
async fn embed_reports_provider_status() {
	let fake = FakeProvider::new(
		StatusCode::UNAUTHORIZED,
		serde_json::json!({ "error": { "message": "Incorrect API key provided." } }),
	);
	let api_base = spawn_provider(fake).await;
	let client = EmbeddingClient::new(provider_config(api_base)).expect("Failed to build client.");
	let err = client.embed("cats").await.expect_err("Expected status error.");

	match err {
		Error::Status { status, body } => {
			assert_eq!(status, StatusCode::UNAUTHORIZED);
			assert!(body.contains("Incorrect API key"), "Unexpected body: {body}");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn embed_without_vectors_is_invalid_response() {
	let fake = FakeProvider::new(StatusCode::OK, serde_json::json!({ "data": [] }));
	let api_base = spawn_provider(fake).await;
	let client = EmbeddingClient::new(provider_config(api_base)).expect("Failed to build client.");
	let err = client.embed("cats").await.expect_err("Expected invalid response error.");

	assert_eq!(err.to_string(), "Embedding provider returned no vectors.");
}
