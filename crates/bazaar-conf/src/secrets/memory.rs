//! In-memory secret provider for testing and embedding

use super::{SecretError, SecretProvider, SecretResult, SecretString};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory secret provider
pub struct MemorySecretProvider {
	secrets: RwLock<HashMap<String, SecretString>>,
}

impl MemorySecretProvider {
	/// Create an empty provider
	pub fn new() -> Self {
		Self {
			secrets: RwLock::new(HashMap::new()),
		}
	}

	/// Builder-style insert
	pub fn with_secret(self, key: impl Into<String>, value: impl Into<SecretString>) -> Self {
		self.secrets.write().insert(key.into(), value.into());
		self
	}

	/// Insert or replace a secret
	pub fn insert(&self, key: impl Into<String>, value: impl Into<SecretString>) {
		self.secrets.write().insert(key.into(), value.into());
	}
}

impl Default for MemorySecretProvider {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SecretProvider for MemorySecretProvider {
	async fn get_secret(&self, key: &str) -> SecretResult<SecretString> {
		self.secrets
			.read()
			.get(key)
			.cloned()
			.ok_or_else(|| SecretError::NotFound(key.to_string()))
	}

	fn exists(&self, key: &str) -> bool {
		self.secrets.read().contains_key(key)
	}

	fn name(&self) -> &str {
		"memory"
	}
}
