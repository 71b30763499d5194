use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

use crate::{Error, Result};
use quarry_config::EmbeddingProviderConfig;

/// OpenAI-compatible embeddings client. Build once and share; the inner client pools
/// connections.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
	cfg: EmbeddingProviderConfig,
	client: Client,
	headers: HeaderMap,
}
impl EmbeddingClient {
	pub fn new(cfg: EmbeddingProviderConfig) -> Result<Self> {
		let mut builder = Client::builder();

		if let Some(timeout_ms) = cfg.timeout_ms {
			builder = builder.timeout(Duration::from_millis(timeout_ms));
		}

		let client = builder.build()?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self { cfg, client, headers })
	}

	/// Embeds a single text and returns its vector.
	pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
		let vectors = self.embed_batch(&[text.to_string()]).await?;

		vectors.into_iter().next().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding provider returned no vectors.".to_string(),
		})
	}

	async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let url = format!("{}{}", self.cfg.api_base, self.cfg.path);
		let mut body = serde_json::json!({
			"model": self.cfg.model,
			"input": texts,
		});

		if let Some(dimensions) = self.cfg.dimensions {
			body["dimensions"] = Value::from(dimensions);
		}

		let res = self.client.post(url).headers(self.headers.clone()).json(&body).send().await?;
		let status = res.status();

		if !status.is_success() {
			let body = res.text().await.unwrap_or_default();

			return Err(Error::Status { status, body });
		}

		let json: Value = res.json().await?;
		let vectors = parse_embedding_response(json)?;

		tracing::debug!(
			provider_id = %self.cfg.provider_id,
			model = %self.cfg.model,
			count = vectors.len(),
			"Embedding response received."
		);

		Ok(vectors)
	}
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
