use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub const ABOUT: &str = "Authenticated semantic search over a remote vector match procedure.";

/// Shown under `--help`. Lists the variables read when no config file is given.
pub const ENV_HELP: &str = "\
Environment (used when --config is omitted):
  SUPABASE_URL     Base URL of the vector store
  SUPABASE_KEY     Service key sent as apikey and bearer token
  OPENAI_API_KEY   Embedding provider key
  MY_API_KEY       Secret expected in the X-API-KEY header
  PORT             HTTP port [default: 3000]
  RUST_LOG         Log filter [default: info]";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Magenta.on_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_starts_with_package_version() {
		assert!(VERSION.starts_with(concat!(env!("CARGO_PKG_VERSION"), "-")));
	}

	#[test]
	fn env_help_names_every_variable() {
		for name in ["SUPABASE_URL", "SUPABASE_KEY", "OPENAI_API_KEY", "MY_API_KEY", "PORT", "RUST_LOG"]
		{
			assert!(ENV_HELP.contains(name), "Missing {name} in help text.");
		}
	}
}
