use std::time::Duration;

use reqwest::{
	Client,
	header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
	Error, Result,
	models::{MatchArgs, ProcedureErrorBody},
};
use quarry_config::ProcedureConfig;

const HEADER_API_KEY: &str = "apikey";

/// Client for a remote database procedure invoked as `POST {url}{rpc_path}/{name}`.
#[derive(Debug, Clone)]
pub struct ProcedureClient {
	cfg: ProcedureConfig,
	client: Client,
	headers: HeaderMap,
	endpoint: String,
}
impl ProcedureClient {
	pub fn new(cfg: ProcedureConfig) -> Result<Self> {
		let mut builder = Client::builder();

		if let Some(timeout_ms) = cfg.timeout_ms {
			builder = builder.timeout(Duration::from_millis(timeout_ms));
		}

		let client = builder.build()?;
		let headers = procedure_headers(&cfg.api_key, &cfg.default_headers)?;
		let endpoint = format!("{}{}/{}", cfg.url, cfg.rpc_path, cfg.name);

		Ok(Self { cfg, client, headers, endpoint })
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub async fn match_documents(
		&self,
		query_embedding: &[f32],
		match_count: u32,
		filter: &Map<String, Value>,
	) -> Result<Value> {
		self.call(&MatchArgs { query_embedding, match_count, filter }).await
	}

	async fn call<A>(&self, args: &A) -> Result<Value>
	where
		A: Serialize + ?Sized,
	{
		let res = self
			.client
			.post(self.endpoint.as_str())
			.headers(self.headers.clone())
			.json(args)
			.send()
			.await?;
		let status = res.status();
		let bytes = res.bytes().await?;

		if !status.is_success() {
			let body: ProcedureErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();

			tracing::debug!(
				procedure = %self.cfg.name,
				%status,
				details = ?body.details,
				hint = ?body.hint,
				"Procedure call rejected."
			);

			return Err(Error::Procedure {
				procedure: self.cfg.name.clone(),
				status,
				code: body.code,
				message: body
					.message
					.unwrap_or_else(|| String::from_utf8_lossy(&bytes).trim().to_string()),
			});
		}
		if bytes.is_empty() {
			return Ok(Value::Null);
		}

		Ok(serde_json::from_slice(&bytes)?)
	}
}

/// PostgREST wants the key twice: as `apikey` and as a bearer token.
fn procedure_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = quarry_providers::auth_headers(api_key, default_headers)?;

	headers.insert(HeaderName::from_static(HEADER_API_KEY), HeaderValue::from_str(api_key)?);

	Ok(headers)
}
