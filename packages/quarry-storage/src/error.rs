pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error(transparent)]
	Headers(#[from] quarry_providers::Error),
	#[error("Procedure {procedure} failed with {status}: {message}")]
	Procedure {
		procedure: String,
		status: reqwest::StatusCode,
		code: Option<String>,
		message: String,
	},
}
