use std::sync::Arc;

use quarry_service::{CredentialVerifier, QuarryService, StaticKeyVerifier};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<QuarryService>,
	pub verifier: Arc<dyn CredentialVerifier>,
}
impl AppState {
	pub fn new(config: quarry_config::Config) -> color_eyre::Result<Self> {
		let verifier = Arc::new(StaticKeyVerifier::new(config.security.api_key.clone()));
		let service = QuarryService::new(config)?;

		Ok(Self::with_parts(service, verifier))
	}

	pub fn with_parts(service: QuarryService, verifier: Arc<dyn CredentialVerifier>) -> Self {
		Self { service: Arc::new(service), verifier }
	}
}
