//! Application settings
//!
//! Settings can be loaded from environment variables, a TOML or JSON file, or
//! built in code. The CSRF secret is deliberately not part of [`Settings`]:
//! it comes from a [`SecretProvider`](crate::secrets::SecretProvider) so it can
//! never be serialized back out with the rest of the configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "BAZAAR_";

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
	/// Cookie only sent in first-party context
	Strict,
	/// Cookie sent with top-level navigation
	#[default]
	Lax,
	/// Cookie sent in all contexts (requires Secure)
	None,
}

impl SameSite {
	/// Attribute value as written in a `Set-Cookie` header
	pub fn as_str(&self) -> &'static str {
		match self {
			SameSite::Strict => "Strict",
			SameSite::Lax => "Lax",
			SameSite::None => "None",
		}
	}
}

/// CSRF cookie and header configuration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfSettings {
	/// Name of the cookie carrying the token hash
	pub cookie_name: String,
	/// Request header the client echoes the raw token in
	pub header_name: String,
	/// Key looked up in the secret provider
	pub secret_key_name: String,
	/// The cookie only carries a hash, so scripts never need to read it
	pub cookie_httponly: bool,
	/// Cookie should be Secure in production (HTTPS only)
	pub cookie_secure: bool,
	pub cookie_samesite: SameSite,
	/// Cookie domain (None = current domain only)
	pub cookie_domain: Option<String>,
	pub cookie_path: String,
	/// Cookie max age in seconds (None = session cookie)
	pub cookie_max_age: Option<i64>,
	/// Paths exempt from CSRF verification
	pub exempt_paths: HashSet<String>,
}

impl Default for CsrfSettings {
	fn default() -> Self {
		Self {
			cookie_name: "csrftoken".to_string(),
			header_name: "X-CSRFToken".to_string(),
			secret_key_name: "csrf_secret".to_string(),
			cookie_httponly: true,
			cookie_secure: false,
			cookie_samesite: SameSite::Lax,
			cookie_domain: None,
			cookie_path: "/".to_string(),
			cookie_max_age: None,
			exempt_paths: HashSet::new(),
		}
	}
}

impl CsrfSettings {
	/// Production-ready configuration with security hardening
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::settings::{CsrfSettings, SameSite};
	///
	/// let csrf = CsrfSettings::production();
	/// assert!(csrf.cookie_secure);
	/// assert_eq!(csrf.cookie_samesite, SameSite::Strict);
	/// ```
	pub fn production() -> Self {
		Self {
			cookie_secure: true,
			cookie_samesite: SameSite::Strict,
			cookie_max_age: Some(31449600), // 1 year
			..Self::default()
		}
	}

	/// Add an exempt path
	pub fn add_exempt_path(mut self, path: impl Into<String>) -> Self {
		self.exempt_paths.insert(path.into());
		self
	}
}

/// Main application settings
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
	/// Debug mode relaxes production-only checks
	#[serde(default)]
	pub debug: bool,

	#[serde(default)]
	pub csrf: CsrfSettings,
}

impl Settings {
	/// Create new settings with defaults
	pub fn new() -> Self {
		Self::default()
	}

	/// Load settings from environment variables on top of the defaults
	pub fn from_env() -> Result<Self, SettingsError> {
		let mut settings = Self::default();

		if let Some(debug) = env_var("DEBUG") {
			settings.debug = parse_bool("DEBUG", &debug)?;
		}
		if let Some(name) = env_var("CSRF_COOKIE_NAME") {
			settings.csrf.cookie_name = name;
		}
		if let Some(name) = env_var("CSRF_HEADER_NAME") {
			settings.csrf.header_name = name;
		}
		if let Some(secure) = env_var("CSRF_COOKIE_SECURE") {
			settings.csrf.cookie_secure = parse_bool("CSRF_COOKIE_SECURE", &secure)?;
		}
		if let Some(domain) = env_var("CSRF_COOKIE_DOMAIN") {
			settings.csrf.cookie_domain = Some(domain).filter(|d| !d.is_empty());
		}
		if let Some(paths) = env_var("CSRF_EXEMPT_PATHS") {
			settings.csrf.exempt_paths = paths
				.split(',')
				.map(str::trim)
				.filter(|p| !p.is_empty())
				.map(str::to_string)
				.collect();
		}

		Ok(settings)
	}

	/// Load settings from a `.toml` or `.json` file
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e))),
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e))),
			_ => Err(SettingsError::UnsupportedFormat(
				"Supported formats: .toml, .json".to_string(),
			)),
		}
	}

	/// Validate settings
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !is_valid_cookie_name(&self.csrf.cookie_name) {
			return Err(SettingsError::ValidationError(format!(
				"CSRF cookie name {:?} is not a valid cookie name",
				self.csrf.cookie_name
			)));
		}

		if http::HeaderName::from_bytes(self.csrf.header_name.as_bytes()).is_err() {
			return Err(SettingsError::ValidationError(format!(
				"CSRF header name {:?} is not a valid HTTP header name",
				self.csrf.header_name
			)));
		}

		if !is_valid_cookie_attribute(&self.csrf.cookie_path) {
			return Err(SettingsError::ValidationError(format!(
				"CSRF cookie path {:?} is not a valid cookie attribute value",
				self.csrf.cookie_path
			)));
		}

		if let Some(domain) = &self.csrf.cookie_domain
			&& !is_valid_cookie_attribute(domain)
		{
			return Err(SettingsError::ValidationError(format!(
				"CSRF cookie domain {:?} is not a valid cookie attribute value",
				domain
			)));
		}

		if self.csrf.secret_key_name.trim().is_empty() {
			return Err(SettingsError::ValidationError(
				"CSRF secret key name must not be empty".to_string(),
			));
		}

		if self.csrf.cookie_samesite == SameSite::None && !self.csrf.cookie_secure {
			return Err(SettingsError::ValidationError(
				"SameSite=None requires a Secure CSRF cookie".to_string(),
			));
		}

		if !self.debug && !self.csrf.cookie_secure {
			return Err(SettingsError::ValidationError(
				"CSRF cookie must be Secure in production".to_string(),
			));
		}

		Ok(())
	}
}

/// Validate a cookie name per RFC 6265.
///
/// Cookie names must be non-empty visible ASCII without separators.
pub fn is_valid_cookie_name(name: &str) -> bool {
	!name.is_empty()
		&& name.chars().all(|c| {
			let code = c as u32;
			(0x21..=0x7E).contains(&code)
				&& !matches!(
					c,
					'(' | ')'
						| '<' | '>' | '@' | ','
						| ';' | ':' | '\\' | '"'
						| '/' | '[' | ']' | '?'
						| '=' | '{' | '}'
				)
		})
}

/// Cookie attribute values are spliced into `Set-Cookie` verbatim, so they
/// must not contain `;` or control characters.
fn is_valid_cookie_attribute(value: &str) -> bool {
	!value.is_empty() && !value.chars().any(|c| c == ';' || c.is_control())
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

fn parse_bool(name: &str, value: &str) -> Result<bool, SettingsError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		other => Err(SettingsError::ParseError(format!(
			"{}{} must be a boolean, got {:?}",
			ENV_PREFIX, name, other
		))),
	}
}

/// Settings error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	FileError(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// The CSRF secret is absent or blank; the process must not serve requests
	#[error("Missing secret: {0}")]
	MissingSecret(String),
}
