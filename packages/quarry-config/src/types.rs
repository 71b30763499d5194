use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_HTTP_PORT: u16 = 3_000;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_MATCH_COUNT: u32 = 7;
pub const DEFAULT_PROCEDURE: &str = "match_documents";
pub const DEFAULT_RPC_PATH: &str = "/rest/v1/rpc";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub providers: Providers,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_http_bind")]
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { http_bind: default_http_bind(), log_level: default_log_level() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	#[serde(default = "default_provider_id")]
	pub provider_id: String,
	#[serde(default = "default_embedding_api_base")]
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_embedding_path")]
	pub path: String,
	#[serde(default = "default_embedding_model")]
	pub model: String,
	/// Sent to the provider and checked against the returned vector when set. Leave unset for
	/// models that reject the parameter, such as `text-embedding-ada-002`.
	pub dimensions: Option<u32>,
	/// No client-side timeout when unset.
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub procedure: ProcedureConfig,
}

/// Remote similarity-search procedure exposed over a PostgREST-style RPC endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcedureConfig {
	pub url: String,
	pub api_key: String,
	#[serde(default = "default_rpc_path")]
	pub rpc_path: String,
	#[serde(default = "default_procedure")]
	pub name: String,
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_match_count")]
	pub match_count: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { match_count: default_match_count() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	/// Shared secret expected in the `X-API-KEY` request header.
	pub api_key: String,
}

pub(crate) fn default_http_bind() -> String {
	format!("0.0.0.0:{DEFAULT_HTTP_PORT}")
}

pub(crate) fn default_log_level() -> String {
	"info".to_string()
}

pub(crate) fn default_provider_id() -> String {
	"openai".to_string()
}

pub(crate) fn default_embedding_api_base() -> String {
	"https://api.openai.com".to_string()
}

pub(crate) fn default_embedding_path() -> String {
	"/v1/embeddings".to_string()
}

pub(crate) fn default_embedding_model() -> String {
	DEFAULT_EMBEDDING_MODEL.to_string()
}

pub(crate) fn default_rpc_path() -> String {
	DEFAULT_RPC_PATH.to_string()
}

pub(crate) fn default_procedure() -> String {
	DEFAULT_PROCEDURE.to_string()
}

fn default_match_count() -> u32 {
	DEFAULT_MATCH_COUNT
}
