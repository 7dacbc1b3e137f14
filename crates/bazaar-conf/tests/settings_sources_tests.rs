//! Settings loading from files and environment, and fail-fast secret loading

use bazaar_conf::secrets::{EnvSecretProvider, MemorySecretProvider};
use bazaar_conf::{SameSite, Settings, SettingsError, load_csrf_secret};
use rstest::rstest;
use serial_test::serial;
use std::io::Write;

const ENV_KEYS: &[&str] = &[
	"BAZAAR_DEBUG",
	"BAZAAR_CSRF_COOKIE_NAME",
	"BAZAAR_CSRF_HEADER_NAME",
	"BAZAAR_CSRF_COOKIE_SECURE",
	"BAZAAR_CSRF_COOKIE_DOMAIN",
	"BAZAAR_CSRF_EXEMPT_PATHS",
];

fn clear_env() {
	for key in ENV_KEYS {
		unsafe {
			std::env::remove_var(key);
		}
	}
}

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
	let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[rstest]
#[serial]
fn test_from_env_defaults_when_unset() {
	// Arrange
	clear_env();

	// Act
	let settings = Settings::from_env().unwrap();

	// Assert
	assert_eq!(settings, Settings::default());
}

#[rstest]
#[serial]
fn test_from_env_overrides() {
	// Arrange
	clear_env();
	unsafe {
		std::env::set_var("BAZAAR_DEBUG", "true");
		std::env::set_var("BAZAAR_CSRF_COOKIE_NAME", "market_csrf");
		std::env::set_var("BAZAAR_CSRF_HEADER_NAME", "X-Market-CSRF");
		std::env::set_var("BAZAAR_CSRF_COOKIE_SECURE", "1");
		std::env::set_var("BAZAAR_CSRF_COOKIE_DOMAIN", "example.com");
		std::env::set_var("BAZAAR_CSRF_EXEMPT_PATHS", "/api/webhook, /health,,");
	}

	// Act
	let settings = Settings::from_env().unwrap();
	clear_env();

	// Assert
	assert!(settings.debug);
	assert_eq!(settings.csrf.cookie_name, "market_csrf");
	assert_eq!(settings.csrf.header_name, "X-Market-CSRF");
	assert!(settings.csrf.cookie_secure);
	assert_eq!(settings.csrf.cookie_domain.as_deref(), Some("example.com"));
	assert_eq!(settings.csrf.exempt_paths.len(), 2);
	assert!(settings.csrf.exempt_paths.contains("/api/webhook"));
	assert!(settings.csrf.exempt_paths.contains("/health"));
}

#[rstest]
#[serial]
fn test_from_env_rejects_non_boolean() {
	clear_env();
	unsafe {
		std::env::set_var("BAZAAR_CSRF_COOKIE_SECURE", "sometimes");
	}

	let result = Settings::from_env();
	clear_env();

	assert!(matches!(result, Err(SettingsError::ParseError(_))));
}

#[rstest]
fn test_from_toml_file() {
	// Arrange
	let file = write_temp(
		".toml",
		r#"
debug = false

[csrf]
cookie_name = "market_csrf"
cookie_secure = true
cookie_samesite = "Strict"
exempt_paths = ["/api/webhook"]
"#,
	);

	// Act
	let settings = Settings::from_file(file.path()).unwrap();

	// Assert
	assert_eq!(settings.csrf.cookie_name, "market_csrf");
	assert_eq!(settings.csrf.header_name, "X-CSRFToken");
	assert_eq!(settings.csrf.cookie_samesite, SameSite::Strict);
	assert!(settings.csrf.exempt_paths.contains("/api/webhook"));
	assert!(settings.validate().is_ok());
}

#[rstest]
fn test_from_json_file() {
	let file = write_temp(
		".json",
		r#"{ "debug": true, "csrf": { "header_name": "X-Market-CSRF" } }"#,
	);

	let settings = Settings::from_file(file.path()).unwrap();

	assert!(settings.debug);
	assert_eq!(settings.csrf.header_name, "X-Market-CSRF");
	assert_eq!(settings.csrf.cookie_name, "csrftoken");
}

#[rstest]
fn test_from_file_unsupported_extension() {
	let file = write_temp(".yaml", "debug: true");

	let result = Settings::from_file(file.path());

	assert!(matches!(result, Err(SettingsError::UnsupportedFormat(_))));
}

#[rstest]
fn test_from_file_missing() {
	let result = Settings::from_file("/nonexistent/bazaar/settings.toml");
	assert!(matches!(result, Err(SettingsError::FileError(_))));
}

#[rstest]
fn test_from_file_malformed_toml() {
	let file = write_temp(".toml", "[csrf\ncookie_name = ");

	let result = Settings::from_file(file.path());

	assert!(matches!(result, Err(SettingsError::ParseError(_))));
}

#[rstest]
#[tokio::test]
async fn test_load_csrf_secret_missing_is_fatal() {
	let provider = MemorySecretProvider::new();

	let result = load_csrf_secret(&provider, "csrf_secret").await;

	assert!(matches!(result, Err(SettingsError::MissingSecret(_))));
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn test_load_csrf_secret_blank_is_fatal(#[case] value: &str) {
	let provider = MemorySecretProvider::new().with_secret("csrf_secret", value);

	let result = load_csrf_secret(&provider, "csrf_secret").await;

	assert!(matches!(result, Err(SettingsError::MissingSecret(_))));
}

#[rstest]
#[tokio::test]
async fn test_load_csrf_secret_returns_redacted_value() {
	let provider = MemorySecretProvider::new().with_secret("csrf_secret", "s3cr3t");

	let secret = load_csrf_secret(&provider, "csrf_secret").await.unwrap();

	assert_eq!(secret.expose_secret(), "s3cr3t");
	assert!(!format!("{:?}", secret).contains("s3cr3t"));
}

#[rstest]
#[serial]
#[tokio::test]
async fn test_load_csrf_secret_from_env() {
	// Arrange
	unsafe {
		std::env::set_var("BAZAAR_TEST_CSRF_SECRET", "env-secret");
	}
	let provider = EnvSecretProvider::new("BAZAAR_TEST_");

	// Act
	let secret = load_csrf_secret(&provider, "csrf_secret").await;
	unsafe {
		std::env::remove_var("BAZAAR_TEST_CSRF_SECRET");
	}

	// Assert
	assert_eq!(secret.unwrap().expose_secret(), "env-secret");
}
