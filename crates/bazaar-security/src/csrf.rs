//! CSRF (Cross-Site Request Forgery) protection
//!
//! Double-submit tokens: the client receives a random raw token it can read,
//! and a cookie holding `SHA-256(token || secret)`. On state-changing requests
//! the client echoes the raw token back in a header; the server recomputes the
//! hash with its secret and compares it to the cookie.
//!
//! The cookie value is `<prefix>|<hex hash>`. Only the segment after the last
//! `|` matters for verification. Cookies issued here carry the raw token as
//! the prefix, so a later page load can hand the same token out again instead
//! of invalidating forms that are already open.

use crate::cookie::CookieStore;
use bazaar_conf::SecretString;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Number of random bytes in a raw token
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Raw token length once hex encoded
pub const CSRF_TOKEN_LENGTH: usize = CSRF_TOKEN_BYTES * 2;

/// Hex length of a SHA-256 digest
pub const CSRF_HASH_LENGTH: usize = 64;

/// Separator between the opaque prefix and the hash in the cookie value
pub const CSRF_VALUE_SEPARATOR: char = '|';

/// Default CSRF cookie name
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Compute the token hash: lowercase hex SHA-256 over the token then the secret.
///
/// # Examples
///
/// ```
/// use bazaar_conf::SecretString;
/// use bazaar_security::csrf::hash_token;
///
/// let secret = SecretString::new("s3cr3t");
/// let hash = hash_token("abc", &secret);
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_token("abc", &secret));
/// ```
pub fn hash_token(candidate: &str, secret: &SecretString) -> String {
	let mut hasher = Sha256::new();
	hasher.update(candidate.as_bytes());
	hasher.update(secret.expose_secret().as_bytes());
	hex::encode(hasher.finalize())
}

/// Generate a fresh raw token from the thread CSPRNG
pub fn generate_token() -> String {
	let mut bytes = [0u8; CSRF_TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	hex::encode(bytes)
}

/// Compare two strings without short-circuiting on the first differing byte
fn constant_time_eq(a: &str, b: &str) -> bool {
	a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// The cookie-stored half of a token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCsrfValue {
	/// Opaque to verification
	pub prefix: Option<String>,
	pub hash: String,
}

impl StoredCsrfValue {
	pub fn new(prefix: Option<String>, hash: impl Into<String>) -> Self {
		Self {
			prefix,
			hash: hash.into(),
		}
	}

	/// Split a raw cookie value on the last separator.
	///
	/// A value without a separator is a bare hash. Parsing never fails;
	/// whether the hash is well formed is decided by comparison.
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_security::csrf::StoredCsrfValue;
	///
	/// let value = StoredCsrfValue::parse("meta|with|pipes|abc123");
	/// assert_eq!(value.prefix.as_deref(), Some("meta|with|pipes"));
	/// assert_eq!(value.hash, "abc123");
	///
	/// let bare = StoredCsrfValue::parse("abc123");
	/// assert_eq!(bare.prefix, None);
	/// ```
	pub fn parse(raw: &str) -> Self {
		match raw.rsplit_once(CSRF_VALUE_SEPARATOR) {
			Some((prefix, hash)) => Self::new(Some(prefix.to_string()), hash),
			None => Self::new(None, raw),
		}
	}

	/// Hash segment of a raw cookie value, without allocating
	pub fn hash_segment(raw: &str) -> &str {
		raw.rsplit_once(CSRF_VALUE_SEPARATOR).map_or(raw, |(_, hash)| hash)
	}
}

impl fmt::Display for StoredCsrfValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.prefix {
			Some(prefix) => write!(f, "{}{}{}", prefix, CSRF_VALUE_SEPARATOR, self.hash),
			None => f.write_str(&self.hash),
		}
	}
}

/// Raw CSRF token as exposed to request handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
	pub fn new(token: String) -> Self {
		Self(token)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A freshly issued token pair
#[derive(Debug, Clone)]
pub struct IssuedCsrfToken {
	/// Raw token delivered to the client for echoing back
	pub token: CsrfToken,
	/// Value to store in the CSRF cookie
	pub cookie_value: StoredCsrfValue,
}

/// Verifies client-echoed tokens against the CSRF cookie.
///
/// Holds the secret and the configured cookie name; each call is independent
/// and side-effect free, so one verifier can be shared across requests.
#[derive(Debug, Clone)]
pub struct CsrfVerifier {
	secret: Arc<SecretString>,
	cookie_name: String,
}

impl CsrfVerifier {
	/// Create a verifier for the given secret and cookie name
	pub fn new(secret: Arc<SecretString>, cookie_name: impl Into<String>) -> Self {
		Self {
			secret,
			cookie_name: cookie_name.into(),
		}
	}

	/// Verifier using the default cookie name
	pub fn with_secret(secret: Arc<SecretString>) -> Self {
		Self::new(secret, CSRF_COOKIE_NAME)
	}

	pub fn cookie_name(&self) -> &str {
		&self.cookie_name
	}

	/// Check the client token against the cookie-stored hash.
	///
	/// Returns `false` when the cookie is absent, malformed or does not match.
	/// The three cases are deliberately indistinguishable to the caller.
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::SecretString;
	/// use bazaar_security::cookie::CookieJar;
	/// use bazaar_security::csrf::{CsrfVerifier, hash_token};
	/// use std::sync::Arc;
	///
	/// let secret = Arc::new(SecretString::new("s3cr3t"));
	/// let verifier = CsrfVerifier::with_secret(secret.clone());
	///
	/// let jar = CookieJar::parse(&format!("csrftoken={}", hash_token("abc", &secret)));
	/// assert!(verifier.verify(&jar, "abc"));
	/// assert!(!verifier.verify(&jar, "abcd"));
	/// assert!(!verifier.verify(&CookieJar::new(), "abc"));
	/// ```
	pub fn verify<S>(&self, cookies: &S, client_token: &str) -> bool
	where
		S: CookieStore + ?Sized,
	{
		let Some(raw) = cookies.cookie(&self.cookie_name) else {
			return false;
		};

		let stored_hash = StoredCsrfValue::hash_segment(raw);
		if stored_hash.len() != CSRF_HASH_LENGTH {
			return false;
		}

		let expected_hash = hash_token(client_token, &self.secret);
		constant_time_eq(&expected_hash, stored_hash)
	}

	/// Recover the raw token from a cookie this crate issued.
	///
	/// Returns `None` unless the prefix is a well-formed raw token whose hash
	/// matches the cookie under this verifier's secret. Cookies with foreign
	/// or tampered prefixes are treated as absent.
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::SecretString;
	/// use bazaar_security::cookie::CookieJar;
	/// use bazaar_security::csrf::{CsrfIssuer, CsrfVerifier};
	/// use std::sync::Arc;
	///
	/// let secret = Arc::new(SecretString::new("s3cr3t"));
	/// let issued = CsrfIssuer::new(secret.clone()).issue();
	/// let jar = CookieJar::parse(&format!("csrftoken={}", issued.cookie_value));
	///
	/// let verifier = CsrfVerifier::with_secret(secret);
	/// assert_eq!(verifier.recover_token(&jar), Some(issued.token));
	/// ```
	pub fn recover_token<S>(&self, cookies: &S) -> Option<CsrfToken>
	where
		S: CookieStore + ?Sized,
	{
		let raw = cookies.cookie(&self.cookie_name)?;
		let stored = StoredCsrfValue::parse(raw);
		let token = stored.prefix.filter(|t| is_raw_token(t))?;

		self.verify(cookies, &token).then(|| CsrfToken::new(token))
	}
}

/// Whether `candidate` has the shape of a token from [`generate_token`]
fn is_raw_token(candidate: &str) -> bool {
	candidate.len() == CSRF_TOKEN_LENGTH
		&& candidate
			.bytes()
			.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Issues token pairs using the same hashing scheme as [`CsrfVerifier`]
#[derive(Debug, Clone)]
pub struct CsrfIssuer {
	secret: Arc<SecretString>,
}

impl CsrfIssuer {
	pub fn new(secret: Arc<SecretString>) -> Self {
		Self { secret }
	}

	/// Issue a new random token and its cookie value
	pub fn issue(&self) -> IssuedCsrfToken {
		self.issue_for(generate_token())
	}

	/// Issue the cookie value for a caller-supplied token
	pub fn issue_for(&self, token: String) -> IssuedCsrfToken {
		let hash = hash_token(&token, &self.secret);
		IssuedCsrfToken {
			cookie_value: StoredCsrfValue::new(Some(token.clone()), hash),
			token: CsrfToken::new(token),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cookie::CookieJar;
	use rstest::{fixture, rstest};

	#[fixture]
	fn secret() -> Arc<SecretString> {
		Arc::new(SecretString::new("s3cr3t"))
	}

	#[rstest]
	fn test_hash_token_is_sha256_of_token_then_secret() {
		// echo -n "abcs3cr3t" | sha256sum
		let expected = hex::encode(Sha256::digest(b"abcs3cr3t"));
		assert_eq!(hash_token("abc", &SecretString::new("s3cr3t")), expected);
	}

	#[rstest]
	fn test_hash_token_is_lowercase_hex() {
		let hash = hash_token("token", &SecretString::new("secret"));
		assert_eq!(hash.len(), CSRF_HASH_LENGTH);
		assert!(
			hash.chars()
				.all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
		);
	}

	#[rstest]
	fn test_generate_token_format() {
		let token = generate_token();
		assert_eq!(token.len(), CSRF_TOKEN_LENGTH);
		assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[rstest]
	fn test_generate_token_is_random() {
		assert_ne!(generate_token(), generate_token());
	}

	#[rstest]
	fn test_constant_time_eq() {
		assert!(constant_time_eq("abc", "abc"));
		assert!(!constant_time_eq("abc", "abd"));
		assert!(!constant_time_eq("abc", "abcd"));
		assert!(constant_time_eq("", ""));
	}

	#[rstest]
	#[case("", None, "")]
	#[case("abc", None, "abc")]
	#[case("|abc", Some(""), "abc")]
	#[case("meta|", Some("meta"), "")]
	#[case("a|b|c", Some("a|b"), "c")]
	fn test_stored_value_parse(
		#[case] raw: &str,
		#[case] prefix: Option<&str>,
		#[case] hash: &str,
	) {
		let value = StoredCsrfValue::parse(raw);
		assert_eq!(value.prefix.as_deref(), prefix);
		assert_eq!(value.hash, hash);
		assert_eq!(StoredCsrfValue::hash_segment(raw), hash);
	}

	#[rstest]
	fn test_stored_value_display() {
		assert_eq!(
			StoredCsrfValue::new(Some("1700000000".to_string()), "abc").to_string(),
			"1700000000|abc"
		);
		assert_eq!(StoredCsrfValue::new(None, "abc").to_string(), "abc");
	}

	#[rstest]
	fn test_issue_then_verify(secret: Arc<SecretString>) {
		// Arrange
		let issuer = CsrfIssuer::new(secret.clone());
		let verifier = CsrfVerifier::with_secret(secret);

		// Act
		let issued = issuer.issue();
		let jar = CookieJar::parse(&format!("csrftoken={}", issued.cookie_value));

		// Assert
		assert!(verifier.verify(&jar, issued.token.as_str()));
		assert_eq!(issued.cookie_value.prefix.as_deref(), Some(issued.token.as_str()));
	}

	#[rstest]
	fn test_recover_token_from_issued_cookie(secret: Arc<SecretString>) {
		let issued = CsrfIssuer::new(secret.clone()).issue();
		let jar = CookieJar::parse(&format!("csrftoken={}", issued.cookie_value));

		let recovered = CsrfVerifier::with_secret(secret).recover_token(&jar);

		assert_eq!(recovered, Some(issued.token));
	}

	#[rstest]
	fn test_recover_token_rejects_swapped_prefix(secret: Arc<SecretString>) {
		// Arrange
		let issuer = CsrfIssuer::new(secret.clone());
		let first = issuer.issue();
		let second = issuer.issue();
		let forged = StoredCsrfValue::new(second.cookie_value.prefix, first.cookie_value.hash);
		let jar = CookieJar::parse(&format!("csrftoken={}", forged));

		// Act
		let recovered = CsrfVerifier::with_secret(secret).recover_token(&jar);

		// Assert
		assert_eq!(recovered, None);
	}

	#[rstest]
	#[case("")]
	#[case("1700000000|")]
	#[case("abc")]
	fn test_recover_token_rejects_malformed_cookie(
		secret: Arc<SecretString>,
		#[case] value: &str,
	) {
		let jar = CookieJar::parse(&format!("csrftoken={}", value));

		assert_eq!(CsrfVerifier::with_secret(secret).recover_token(&jar), None);
	}

	#[rstest]
	fn test_recover_token_ignores_non_token_prefix(secret: Arc<SecretString>) {
		// A prefix that verifies but does not look like an issued token
		let hash = hash_token("tok", &secret);
		let jar = CookieJar::parse(&format!("csrftoken=tok|{}", hash));
		let verifier = CsrfVerifier::with_secret(secret);

		assert!(verifier.verify(&jar, "tok"));
		assert_eq!(verifier.recover_token(&jar), None);
	}

	#[rstest]
	fn test_recover_token_requires_same_secret(secret: Arc<SecretString>) {
		let other = Arc::new(SecretString::new("other-secret"));
		let issued = CsrfIssuer::new(other).issue();
		let jar = CookieJar::parse(&format!("csrftoken={}", issued.cookie_value));

		assert_eq!(CsrfVerifier::with_secret(secret).recover_token(&jar), None);
	}

	#[rstest]
	fn test_issue_for_uses_supplied_token(secret: Arc<SecretString>) {
		let issued = CsrfIssuer::new(secret.clone()).issue_for("tok".to_string());

		assert_eq!(issued.token.as_str(), "tok");
		assert_eq!(issued.cookie_value.hash, hash_token("tok", &secret));
	}

	#[rstest]
	fn test_verify_rejects_short_hash(secret: Arc<SecretString>) {
		let verifier = CsrfVerifier::with_secret(secret.clone());
		let truncated = &hash_token("abc", &secret)[..32];
		let jar = CookieJar::parse(&format!("csrftoken={}", truncated));

		assert!(!verifier.verify(&jar, "abc"));
	}

	#[rstest]
	fn test_verify_rejects_uppercase_hash(secret: Arc<SecretString>) {
		let verifier = CsrfVerifier::with_secret(secret.clone());
		let upper = hash_token("abc", &secret).to_uppercase();
		let jar = CookieJar::parse(&format!("csrftoken={}", upper));

		assert!(!verifier.verify(&jar, "abc"));
	}

	#[rstest]
	fn test_verify_uses_configured_cookie_name(secret: Arc<SecretString>) {
		let verifier = CsrfVerifier::new(secret.clone(), "market_csrf");
		let hash = hash_token("abc", &secret);

		let default_name = CookieJar::parse(&format!("csrftoken={}", hash));
		let custom_name = CookieJar::parse(&format!("market_csrf={}", hash));

		assert!(!verifier.verify(&default_name, "abc"));
		assert!(verifier.verify(&custom_name, "abc"));
	}

	#[rstest]
	fn test_verify_wrong_secret_fails(secret: Arc<SecretString>) {
		let other = SecretString::new("other-secret");
		let jar = CookieJar::parse(&format!("csrftoken={}", hash_token("abc", &other)));

		assert!(!CsrfVerifier::with_secret(secret).verify(&jar, "abc"));
	}
}
