//! Environment variable secret provider

use super::{SecretError, SecretProvider, SecretResult, SecretString};
use async_trait::async_trait;
use std::env;

/// Default prefix for secret environment variables
pub const DEFAULT_SECRET_PREFIX: &str = "BAZAAR_";

/// Environment variable secret provider
///
/// Reads secrets from environment variables with a configurable prefix.
/// With prefix `"BAZAAR_"`, the key `"csrf_secret"` is looked up as
/// `BAZAAR_CSRF_SECRET`.
pub struct EnvSecretProvider {
	prefix: String,
}

impl EnvSecretProvider {
	/// Create a new environment secret provider with a prefix
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Create a new environment secret provider without a prefix
	pub fn without_prefix() -> Self {
		Self {
			prefix: String::new(),
		}
	}

	/// Name of the environment variable backing `key`
	pub fn env_var_name(&self, key: &str) -> String {
		format!("{}{}", self.prefix, key.to_uppercase())
	}
}

impl Default for EnvSecretProvider {
	fn default() -> Self {
		Self::new(DEFAULT_SECRET_PREFIX)
	}
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
	async fn get_secret(&self, key: &str) -> SecretResult<SecretString> {
		let env_var = self.env_var_name(key);
		match env::var(&env_var) {
			Ok(value) => Ok(SecretString::new(value)),
			Err(env::VarError::NotPresent) => Err(SecretError::NotFound(format!(
				"Environment variable: {}",
				env_var
			))),
			Err(env::VarError::NotUnicode(_)) => Err(SecretError::Provider(format!(
				"Environment variable {} is not valid UTF-8",
				env_var
			))),
		}
	}

	fn exists(&self, key: &str) -> bool {
		env::var_os(self.env_var_name(key)).is_some()
	}

	fn name(&self) -> &str {
		"env"
	}
}
