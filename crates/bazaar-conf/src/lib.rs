//! # Bazaar Conf
//!
//! Configuration for the Bazaar marketplace: settings loaded from the
//! environment or a file, and the server-only secrets that back CSRF
//! protection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bazaar_conf::{load_csrf_secret, secrets::EnvSecretProvider, Settings};
//!
//! # async fn run() -> Result<(), bazaar_conf::SettingsError> {
//! let settings = Settings::from_env()?;
//! settings.validate()?;
//!
//! // Refuse to start without a secret.
//! let secret = load_csrf_secret(&EnvSecretProvider::default(), &settings.csrf.secret_key_name).await?;
//! # let _ = secret;
//! # Ok(())
//! # }
//! ```

pub mod secrets;
pub mod settings;

pub use secrets::{SecretError, SecretProvider, SecretString};
pub use settings::{CsrfSettings, SameSite, Settings, SettingsError, is_valid_cookie_name};

/// Load the CSRF secret once at startup.
///
/// An absent or blank secret is an error; callers treat it as fatal, since
/// serving requests without a secret would silently disable CSRF protection.
///
/// # Examples
///
/// ```
/// use bazaar_conf::{load_csrf_secret, secrets::MemorySecretProvider};
///
/// # tokio_test::block_on(async {
/// let provider = MemorySecretProvider::new().with_secret("csrf_secret", "s3cr3t");
/// let secret = load_csrf_secret(&provider, "csrf_secret").await.unwrap();
/// assert_eq!(secret.expose_secret(), "s3cr3t");
///
/// let empty = MemorySecretProvider::new();
/// assert!(load_csrf_secret(&empty, "csrf_secret").await.is_err());
/// # });
/// ```
pub async fn load_csrf_secret(
	provider: &dyn SecretProvider,
	key: &str,
) -> Result<SecretString, SettingsError> {
	let secret = provider.get_secret(key).await.map_err(|e| match e {
		SecretError::NotFound(_) => SettingsError::MissingSecret(format!(
			"CSRF secret {:?} not found in {} provider",
			key,
			provider.name()
		)),
		SecretError::Provider(reason) => SettingsError::MissingSecret(format!(
			"CSRF secret {:?} could not be read from {} provider: {}",
			key,
			provider.name(),
			reason
		)),
	})?;

	if secret.is_blank() {
		return Err(SettingsError::MissingSecret(format!(
			"CSRF secret {:?} is empty",
			key
		)));
	}

	tracing::debug!(provider = provider.name(), key, "Loaded CSRF secret");
	Ok(secret)
}
