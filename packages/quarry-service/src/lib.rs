pub mod access;
pub mod search;

mod error;

pub use access::{CredentialVerifier, StaticKeyVerifier};
pub use error::{Error, Result};
pub use search::SearchRequest;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};

use quarry_config::Config;
use quarry_providers::EmbeddingClient;
use quarry_storage::procedure::ProcedureClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait SimilaritySearch
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		embedding: &'a [f32],
		match_count: u32,
		filter: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub search: Arc<dyn SimilaritySearch>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, search: Arc<dyn SimilaritySearch>) -> Self {
		Self { embedding, search }
	}

	/// Builds the HTTP clients described by `cfg`.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let embedding = EmbeddingClient::new(cfg.providers.embedding.clone())?;
		let search = ProcedureClient::new(cfg.storage.procedure.clone())?;

		Ok(Self::new(Arc::new(embedding), Arc::new(search)))
	}
}

pub struct QuarryService {
	pub cfg: Config,
	pub providers: Providers,
}
impl QuarryService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self { cfg, providers })
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

impl EmbeddingProvider for EmbeddingClient {
	fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(EmbeddingClient::embed(self, text).await?) })
	}
}

impl SimilaritySearch for ProcedureClient {
	fn search<'a>(
		&'a self,
		embedding: &'a [f32],
		match_count: u32,
		filter: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(self.match_documents(embedding, match_count, filter).await?) })
	}
}
