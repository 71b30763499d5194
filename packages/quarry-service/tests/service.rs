use serde_json::{Map, Value};

use quarry_service::{Error, QuarryService, SearchRequest};
use quarry_testkit::{SpyEmbedding, SpySearch};

fn service_with(
	embedding: SpyEmbedding,
	search: SpySearch,
) -> (QuarryService, SpyEmbedding, SpySearch) {
	let (providers, embedding, search) = quarry_testkit::spy_providers(embedding, search);
	let service = QuarryService::with_providers(quarry_testkit::test_config(), providers);

	(service, embedding, search)
}

fn request(query: Option<&str>, filter: Option<&str>) -> SearchRequest {
	SearchRequest { query: query.map(str::to_string), filter: filter.map(str::to_string) }
}

fn sample_rows() -> Value {
	serde_json::json!([
		{ "id": 1, "content": "Cats purr.", "similarity": 0.93 },
		{ "id": 2, "content": "Kittens nap.", "similarity": 0.88 }
	])
}

#[tokio::test]
async fn search_embeds_query_and_passes_rows_through() {
	let (service, embedding, search) = service_with(
		SpyEmbedding::returning(vec![0.1, 0.2, 0.3]),
		SpySearch::returning(sample_rows()),
	);
	let rows = service.search(request(Some("cats"), None)).await.expect("Search failed.");

	assert_eq!(rows, sample_rows());
	assert_eq!(embedding.calls(), vec!["cats".to_string()]);

	let calls = search.calls();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].embedding, vec![0.1, 0.2, 0.3]);
	assert_eq!(calls[0].match_count, 7);
	assert_eq!(calls[0].filter, Map::new());
}

#[tokio::test]
async fn search_forwards_parsed_filter() {
	let (service, _, search) =
		service_with(SpyEmbedding::returning(vec![1.0]), SpySearch::returning(sample_rows()));

	service
		.search(request(Some("cats"), Some(r#"{"source":"wiki"}"#)))
		.await
		.expect("Search failed.");

	let filter = &search.calls()[0].filter;

	assert_eq!(filter.get("source"), Some(&Value::from("wiki")));
}

#[tokio::test]
async fn missing_query_makes_no_downstream_calls() {
	let (service, embedding, search) =
		service_with(SpyEmbedding::returning(vec![1.0]), SpySearch::returning(sample_rows()));

	for query in [None, Some("")] {
		let err = service.search(request(query, None)).await.expect_err("Expected client error.");

		assert!(matches!(err, Error::InvalidRequest { .. }), "Unexpected error: {err:?}");
	}

	assert_eq!(embedding.count(), 0);
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn malformed_filter_makes_no_downstream_calls() {
	let (service, embedding, search) =
		service_with(SpyEmbedding::returning(vec![1.0]), SpySearch::returning(sample_rows()));
	let err = service
		.search(request(Some("cats"), Some("not json")))
		.await
		.expect_err("Expected client error.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "Unexpected error: {err:?}");
	assert_eq!(embedding.count(), 0);
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn whitespace_filter_makes_no_downstream_calls() {
	let (service, embedding, search) =
		service_with(SpyEmbedding::returning(vec![1.0]), SpySearch::returning(sample_rows()));
	let err = service
		.search(request(Some("cats"), Some("   ")))
		.await
		.expect_err("Expected client error.");

	assert!(
		matches!(&err, Error::InvalidRequest { field, .. } if field == "$.filter"),
		"Unexpected error: {err:?}"
	);
	assert_eq!(embedding.count(), 0);
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn whitespace_query_is_embedded_as_sent() {
	let (service, embedding, search) =
		service_with(SpyEmbedding::returning(vec![1.0]), SpySearch::returning(sample_rows()));
	let rows = service.search(request(Some("   "), None)).await.expect("Search failed.");

	assert_eq!(rows, sample_rows());
	assert_eq!(embedding.calls(), vec!["   ".to_string()]);
	assert_eq!(search.count(), 1);
}

#[tokio::test]
async fn embedding_failure_skips_search() {
	let (service, embedding, search) =
		service_with(SpyEmbedding::failing("quota exceeded"), SpySearch::returning(sample_rows()));
	let err = service.search(request(Some("cats"), None)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Provider { .. }), "Unexpected error: {err:?}");
	assert_eq!(embedding.count(), 1);
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn empty_embedding_skips_search() {
	let (service, _, search) =
		service_with(SpyEmbedding::returning(Vec::new()), SpySearch::returning(sample_rows()));
	let err = service.search(request(Some("cats"), None)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Provider { .. }), "Unexpected error: {err:?}");
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn dimension_mismatch_skips_search() {
	let (providers, _, search) = quarry_testkit::spy_providers(
		SpyEmbedding::returning(vec![0.5, 0.5]),
		SpySearch::returning(sample_rows()),
	);
	let mut cfg = quarry_testkit::test_config();

	cfg.providers.embedding.dimensions = Some(1_536);

	let service = QuarryService::with_providers(cfg, providers);
	let err = service.search(request(Some("cats"), None)).await.expect_err("Expected failure.");

	assert_eq!(err.to_string(), "Provider error: Embedding vector dimension mismatch.");
	assert_eq!(search.count(), 0);
}

#[tokio::test]
async fn search_failure_is_a_storage_error() {
	let (service, _, search) = service_with(
		SpyEmbedding::returning(vec![1.0]),
		SpySearch::failing("function match_documents does not exist"),
	);
	let err = service.search(request(Some("cats"), None)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Storage { .. }), "Unexpected error: {err:?}");
	assert_eq!(search.count(), 1);
}

#[tokio::test]
async fn match_count_follows_config() {
	let (providers, _, search) = quarry_testkit::spy_providers(
		SpyEmbedding::returning(vec![1.0]),
		SpySearch::returning(Value::Array(Vec::new())),
	);
	let mut cfg = quarry_testkit::test_config();

	cfg.search.match_count = 3;

	let service = QuarryService::with_providers(cfg, providers);
	let rows = service.search(request(Some("cats"), None)).await.expect("Search failed.");

	assert_eq!(rows, Value::Array(Vec::new()));
	assert_eq!(search.calls()[0].match_count, 3);
}

#[test]
fn builds_real_clients_from_config() {
	let service = QuarryService::new(quarry_testkit::test_config());

	assert!(service.is_ok());
}
