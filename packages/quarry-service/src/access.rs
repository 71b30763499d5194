/// Decides whether a caller-supplied credential grants access.
pub trait CredentialVerifier
where
	Self: Send + Sync,
{
	/// `presented` is `None` when the caller sent no credential at all.
	fn verify(&self, presented: Option<&[u8]>) -> bool;
}

/// Single shared secret compared byte for byte. Every holder of the secret is treated alike.
#[derive(Clone)]
pub struct StaticKeyVerifier {
	expected: Vec<u8>,
}
impl StaticKeyVerifier {
	pub fn new(expected: impl Into<Vec<u8>>) -> Self {
		Self { expected: expected.into() }
	}
}

impl std::fmt::Debug for StaticKeyVerifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StaticKeyVerifier").field("expected", &"<redacted>").finish()
	}
}

impl CredentialVerifier for StaticKeyVerifier {
	fn verify(&self, presented: Option<&[u8]>) -> bool {
		match presented {
			Some(presented) => !self.expected.is_empty() && presented == self.expected.as_slice(),
			None => false,
		}
	}
}
