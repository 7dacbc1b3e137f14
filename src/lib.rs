//! # Bazaar
//!
//! Request pipeline for the Bazaar classifieds marketplace. The listings,
//! search, messaging and profile pages all sit behind the same CSRF
//! double-submit defense: every state-changing request must echo a token
//! whose hash, keyed by a server-only secret, is stored in a cookie.
//!
//! ## Feature Flags
//!
//! - `security` - token hashing, issuance and verification
//! - `http` - request/response types and middleware traits
//! - `middleware` - the CSRF middleware (implies `security` and `http`)
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use bazaar::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = Settings::from_env()?;
//! settings.validate()?;
//! let secret = load_csrf_secret(&EnvSecretProvider::default(), &settings.csrf.secret_key_name).await?;
//!
//! let chain = MiddlewareChain::new(Arc::new(ListingsHandler))
//!     .with_middleware(Arc::new(CsrfMiddleware::from_settings(&settings, Arc::new(secret))));
//! ```

pub use bazaar_conf as conf;

#[cfg(feature = "security")]
pub use bazaar_security as security;

#[cfg(feature = "http")]
pub use bazaar_http as http;

#[cfg(feature = "middleware")]
pub use bazaar_middleware as middleware;

pub mod prelude {
	pub use bazaar_conf::secrets::{EnvSecretProvider, MemorySecretProvider};
	pub use bazaar_conf::{
		CsrfSettings, SameSite, SecretProvider, SecretString, Settings, SettingsError,
		load_csrf_secret,
	};

	#[cfg(feature = "security")]
	pub use bazaar_security::{CookieJar, CookieStore, CsrfIssuer, CsrfToken, CsrfVerifier};

	#[cfg(feature = "http")]
	pub use bazaar_http::{Error, Handler, Middleware, MiddlewareChain, Request, Response};

	#[cfg(feature = "middleware")]
	pub use bazaar_middleware::{CsrfMiddleware, CsrfMiddlewareConfig};
}
