use axum::{
	Json, Router,
	body::Body,
	extract::{Query, State, rejection::QueryRejection},
	http::{HeaderValue, Request, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;
use quarry_service::{Error as ServiceError, SearchRequest};

pub const HEADER_API_KEY: &str = "X-API-KEY";

const UNAUTHORIZED_BODY: &str = "Invalid API Key";
const UPSTREAM_ERROR_MESSAGE: &str = "An error occurred.";

pub fn router(state: AppState) -> Router {
	let gated = Router::new()
		.route("/search", get(search))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	Router::new().route("/health", get(health)).merge(gated).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	params: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(payload) = params.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	})?;
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

async fn require_api_key(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
	let presented = req.headers().get(HEADER_API_KEY).map(HeaderValue::as_bytes);

	if !state.verifier.verify(presented) {
		tracing::warn!(key_present = presented.is_some(), "Rejected request with invalid API key.");

		return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response();
	}

	next.run(req).await
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { field, message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, Some(vec![field])),
			// Details are logged by the service and never returned.
			ServiceError::Provider { .. } | ServiceError::Storage { .. } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"UPSTREAM_ERROR",
				UPSTREAM_ERROR_MESSAGE,
				None,
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
