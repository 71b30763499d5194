use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::{Error, QuarryService, Result};

/// Raw search parameters as they arrive in the URL query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
	pub query: Option<String>,
	/// JSON text. Must decode to an object when present.
	pub filter: Option<String>,
}

impl QuarryService {
	/// Embeds the query and returns the rows of the match procedure unchanged.
	pub async fn search(&self, req: SearchRequest) -> Result<Value> {
		let span = tracing::info_span!("search", request_id = %Uuid::new_v4());

		self.search_inner(req).instrument(span).await
	}

	async fn search_inner(&self, req: SearchRequest) -> Result<Value> {
		let query = validate_query(req.query.as_deref())?;
		let filter = parse_filter(req.filter.as_deref())?;

		tracing::info!(
			query_chars = query.chars().count(),
			filter_keys = filter.len(),
			"Received search query."
		);
		tracing::debug!(query, "Search query text.");

		let embedding = self
			.providers
			.embedding
			.embed(query)
			.await
			.inspect_err(|err| tracing::error!(error = %err, "Embedding provider failed."))?;

		if embedding.is_empty() {
			tracing::error!("Embedding provider returned an empty vector.");

			return Err(Error::Provider {
				message: "Embedding provider returned an empty vector.".to_string(),
			});
		}
		if let Some(dimensions) = self.cfg.providers.embedding.dimensions
			&& embedding.len() != dimensions as usize
		{
			tracing::error!(
				expected = dimensions,
				actual = embedding.len(),
				"Embedding vector dimension mismatch."
			);

			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		tracing::debug!(dimensions = embedding.len(), "Embedding generated.");

		let rows = self
			.providers
			.search
			.search(&embedding, self.cfg.search.match_count, &filter)
			.await
			.inspect_err(|err| tracing::error!(error = %err, "Similarity search failed."))?;

		tracing::info!(rows = ?rows.as_array().map(Vec::len), "Similarity search completed.");

		Ok(rows)
	}
}

fn validate_query(query: Option<&str>) -> Result<&str> {
	match query {
		Some(query) if !query.is_empty() => Ok(query),
		_ => Err(Error::invalid("$.query", "Query parameter is required.")),
	}
}

/// An absent or empty filter means "no constraints" and becomes an empty object. Any other
/// text, whitespace included, must parse as a JSON object.
fn parse_filter(raw: Option<&str>) -> Result<Map<String, Value>> {
	let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
		return Ok(Map::new());
	};
	let value: Value = serde_json::from_str(raw)
		.map_err(|_| Error::invalid("$.filter", "Filter must be valid JSON."))?;

	match value {
		Value::Object(map) => Ok(map),
		_ => Err(Error::invalid("$.filter", "Filter must be a JSON object.")),
	}
}
