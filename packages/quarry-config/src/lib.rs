mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_EMBEDDING_MODEL, DEFAULT_HTTP_PORT, DEFAULT_MATCH_COUNT, DEFAULT_PROCEDURE,
	DEFAULT_RPC_PATH, EmbeddingProviderConfig, ProcedureConfig, Providers, Search, Security,
	Service, Storage,
};

use std::{env, fs, net::SocketAddr, path::Path};

use serde_json::{Map, Value};

pub const ENV_PROCEDURE_URL: &str = "SUPABASE_URL";
pub const ENV_PROCEDURE_KEY: &str = "SUPABASE_KEY";
pub const ENV_EMBEDDING_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_KEY: &str = "MY_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Builds the configuration from process environment variables.
pub fn from_env() -> Result<Config> {
	from_lookup(|name| env::var(name).ok())
}

/// Builds the configuration from an arbitrary variable source. Blank values count as unset.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
	let required = |name: &'static str| lookup(name).ok_or(Error::MissingEnv { name });
	let port = match lookup(ENV_PORT) {
		Some(raw) => raw
			.trim()
			.parse::<u16>()
			.map_err(|err| Error::InvalidEnv { name: ENV_PORT, message: err.to_string() })?,
		None => DEFAULT_HTTP_PORT,
	};
	let mut cfg = Config {
		service: Service {
			http_bind: format!("0.0.0.0:{port}"),
			log_level: lookup(ENV_LOG_LEVEL).unwrap_or_else(types::default_log_level),
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: types::default_provider_id(),
				api_base: types::default_embedding_api_base(),
				api_key: required(ENV_EMBEDDING_KEY)?,
				path: types::default_embedding_path(),
				model: types::default_embedding_model(),
				dimensions: None,
				timeout_ms: None,
				default_headers: Map::new(),
			},
		},
		storage: Storage {
			procedure: ProcedureConfig {
				url: required(ENV_PROCEDURE_URL)?,
				api_key: required(ENV_PROCEDURE_KEY)?,
				rpc_path: types::default_rpc_path(),
				name: types::default_procedure(),
				timeout_ms: None,
				default_headers: Map::new(),
			},
		},
		search: Search::default(),
		security: Security { api_key: required(ENV_API_KEY)? },
	};

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a valid socket address.".to_string(),
		});
	}

	let embedding = &cfg.providers.embedding;

	validate_base_url("providers.embedding.api_base", &embedding.api_base)?;

	if embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if embedding.dimensions == Some(0) {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.timeout_ms == Some(0) {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_default_headers("providers.embedding.default_headers", &embedding.default_headers)?;

	let procedure = &cfg.storage.procedure;

	validate_base_url("storage.procedure.url", &procedure.url)?;

	if procedure.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.procedure.api_key must be non-empty.".to_string(),
		});
	}
	if procedure.name.is_empty()
		|| !procedure.name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
	{
		return Err(Error::Validation {
			message: "storage.procedure.name must be a non-empty identifier of letters, digits, or underscores."
				.to_string(),
		});
	}
	if procedure.timeout_ms == Some(0) {
		return Err(Error::Validation {
			message: "storage.procedure.timeout_ms must be greater than zero.".to_string(),
		});
	}

	validate_default_headers("storage.procedure.default_headers", &procedure.default_headers)?;

	if cfg.search.match_count == 0 {
		return Err(Error::Validation {
			message: "search.match_count must be greater than zero.".to_string(),
		});
	}
	if cfg.security.api_key.is_empty() {
		return Err(Error::Validation {
			message: "security.api_key must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn validate_base_url(label: &str, url: &str) -> Result<()> {
	let Some(host) = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://")) else {
		return Err(Error::Validation {
			message: format!("{label} must start with http:// or https://."),
		});
	};

	if host.is_empty() {
		return Err(Error::Validation { message: format!("{label} must include a host.") });
	}

	Ok(())
}

fn validate_default_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("{label}.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let embedding = &mut cfg.providers.embedding;

	embedding.api_base = embedding.api_base.trim().trim_end_matches('/').to_string();
	embedding.path = normalize_path(&embedding.path);

	let procedure = &mut cfg.storage.procedure;

	procedure.url = procedure.url.trim().trim_end_matches('/').to_string();
	procedure.rpc_path = normalize_path(&procedure.rpc_path).trim_end_matches('/').to_string();
	procedure.name = procedure.name.trim().to_string();
}

fn normalize_path(raw: &str) -> String {
	let trimmed = raw.trim();

	if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{trimmed}") }
}
