//! Recording doubles for the search providers and a ready-made test configuration.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use quarry_config::{
	Config, EmbeddingProviderConfig, ProcedureConfig, Providers, Search, Security, Service,
	Storage,
};
use quarry_service::{BoxFuture, EmbeddingProvider, Error, Result, SimilaritySearch};

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "text-embedding-ada-002".to_string(),
				dimensions: None,
				timeout_ms: Some(1_000),
				default_headers: Map::new(),
			},
		},
		storage: Storage {
			procedure: ProcedureConfig {
				url: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				rpc_path: "/rest/v1/rpc".to_string(),
				name: "match_documents".to_string(),
				timeout_ms: Some(1_000),
				default_headers: Map::new(),
			},
		},
		search: Search { match_count: 7 },
		security: Security { api_key: TEST_API_KEY.to_string() },
	}
}

#[derive(Debug, Clone)]
enum EmbeddingReply {
	Vector(Vec<f32>),
	Fail(String),
}

/// Embedding provider that records every text it is asked to embed.
#[derive(Debug, Clone)]
pub struct SpyEmbedding {
	reply: EmbeddingReply,
	calls: Arc<Mutex<Vec<String>>>,
}
impl SpyEmbedding {
	pub fn returning(vector: Vec<f32>) -> Self {
		Self { reply: EmbeddingReply::Vector(vector), calls: Default::default() }
	}

	pub fn failing(message: impl Into<String>) -> Self {
		Self { reply: EmbeddingReply::Fail(message.into()), calls: Default::default() }
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn count(&self) -> usize {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
impl EmbeddingProvider for SpyEmbedding {
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let reply = match &self.reply {
			EmbeddingReply::Vector(vector) => Ok(vector.clone()),
			EmbeddingReply::Fail(message) => Err(Error::Provider { message: message.clone() }),
		};

		Box::pin(async move { reply })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
	pub embedding: Vec<f32>,
	pub match_count: u32,
	pub filter: Map<String, Value>,
}

/// Similarity search that records its arguments and answers with a fixed result.
#[derive(Debug, Clone)]
pub struct SpySearch {
	reply: std::result::Result<Value, String>,
	calls: Arc<Mutex<Vec<SearchCall>>>,
}
impl SpySearch {
	pub fn returning(rows: Value) -> Self {
		Self { reply: Ok(rows), calls: Default::default() }
	}

	pub fn failing(message: impl Into<String>) -> Self {
		Self { reply: Err(message.into()), calls: Default::default() }
	}

	pub fn calls(&self) -> Vec<SearchCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn count(&self) -> usize {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
impl SimilaritySearch for SpySearch {
	fn search<'a>(
		&'a self,
		embedding: &'a [f32],
		match_count: u32,
		filter: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Value>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(SearchCall {
			embedding: embedding.to_vec(),
			match_count,
			filter: filter.clone(),
		});

		let reply = self.reply.clone().map_err(|message| Error::Storage { message });

		Box::pin(async move { reply })
	}
}

/// Wires the doubles into a provider set, keeping handles for assertions.
pub fn spy_providers(
	embedding: SpyEmbedding,
	search: SpySearch,
) -> (quarry_service::Providers, SpyEmbedding, SpySearch) {
	let providers =
		quarry_service::Providers::new(Arc::new(embedding.clone()), Arc::new(search.clone()));

	(providers, embedding, search)
}
