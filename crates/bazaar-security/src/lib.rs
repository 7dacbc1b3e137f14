//! # Bazaar Security
//!
//! CSRF protection for the Bazaar marketplace using double-submit tokens.
//!
//! ## Features
//!
//! - Token hashing keyed by a server-only secret
//! - Read-only cookie access for request-scoped cookie jars
//! - Fail-closed verification returning a plain boolean verdict
//! - Token issuance using the same hashing scheme
//!
//! ## Example
//!
//! ```rust
//! use bazaar_conf::SecretString;
//! use bazaar_security::{CookieJar, CsrfIssuer, CsrfVerifier};
//! use std::sync::Arc;
//!
//! let secret = Arc::new(SecretString::new("s3cr3t"));
//! let issuer = CsrfIssuer::new(secret.clone());
//! let verifier = CsrfVerifier::with_secret(secret);
//!
//! let issued = issuer.issue();
//! let jar = CookieJar::parse(&format!("csrftoken={}", issued.cookie_value));
//! assert!(verifier.verify(&jar, issued.token.as_str()));
//! ```

pub mod cookie;
pub mod csrf;

pub use cookie::{CookieJar, CookieStore, read_cookie};
pub use csrf::{
	CSRF_COOKIE_NAME, CSRF_HASH_LENGTH, CSRF_TOKEN_BYTES, CSRF_TOKEN_LENGTH, CSRF_VALUE_SEPARATOR,
	CsrfIssuer, CsrfToken, CsrfVerifier, IssuedCsrfToken, StoredCsrfValue, generate_token,
	hash_token,
};
