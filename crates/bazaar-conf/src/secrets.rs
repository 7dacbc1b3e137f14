//! Secret values and the providers they are loaded from
//!
//! Secrets are read once at process start and then shared immutably.
//! [`SecretString`] never prints its contents through `Debug` or `Display`,
//! so a secret that ends up in a log line or an error message stays hidden.

pub mod env;
pub mod memory;

pub use env::EnvSecretProvider;
pub use memory::MemorySecretProvider;

use async_trait::async_trait;
use std::fmt;

/// Marker printed in place of secret contents
pub const REDACTED: &str = "[REDACTED]";

/// Result type for secret provider operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Errors raised by secret providers
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
	/// The requested secret does not exist in the provider
	#[error("Secret not found: {0}")]
	NotFound(String),

	/// The provider could not be queried
	#[error("Secret provider error: {0}")]
	Provider(String),
}

/// A string that must never be shown to clients or written to logs.
///
/// The only way to read the value is [`SecretString::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
	/// Wrap a secret value
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::secrets::SecretString;
	///
	/// let secret = SecretString::new("s3cr3t");
	/// assert_eq!(secret.expose_secret(), "s3cr3t");
	/// assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
	/// ```
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Access the raw secret value
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Returns true when the secret is empty or only whitespace
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Source of secrets available at startup
#[async_trait]
pub trait SecretProvider: Send + Sync {
	/// Fetch a secret by key
	async fn get_secret(&self, key: &str) -> SecretResult<SecretString>;

	/// Check whether a secret exists without reading it
	fn exists(&self, key: &str) -> bool;

	/// Provider name used in diagnostics
	fn name(&self) -> &str;
}
