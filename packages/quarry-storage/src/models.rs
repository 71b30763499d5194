use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named arguments of the vector match procedure.
#[derive(Debug, Serialize)]
pub struct MatchArgs<'a> {
	pub query_embedding: &'a [f32],
	pub match_count: u32,
	pub filter: &'a Map<String, Value>,
}

/// Error object returned by PostgREST for failed RPC calls.
#[derive(Debug, Default, Deserialize)]
pub struct ProcedureErrorBody {
	pub code: Option<String>,
	pub message: Option<String>,
	pub details: Option<String>,
	pub hint: Option<String>,
}
