//! # Bazaar Middleware
//!
//! Request pipeline middleware for the Bazaar marketplace.
//!
//! ## Available Middleware
//!
//! - [`CsrfMiddleware`]: double-submit CSRF protection for state-changing requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use bazaar_conf::{Settings, load_csrf_secret, secrets::EnvSecretProvider};
//! use bazaar_http::MiddlewareChain;
//! use bazaar_middleware::CsrfMiddleware;
//! use std::sync::Arc;
//!
//! # async fn build(handler: Arc<dyn bazaar_http::Handler>) -> Result<MiddlewareChain, bazaar_conf::SettingsError> {
//! let settings = Settings::from_env()?;
//! let secret = load_csrf_secret(&EnvSecretProvider::default(), &settings.csrf.secret_key_name).await?;
//!
//! let chain = MiddlewareChain::new(handler)
//!     .with_middleware(Arc::new(CsrfMiddleware::from_settings(&settings, Arc::new(secret))));
//! # Ok(chain)
//! # }
//! ```

pub mod csrf;

pub use csrf::{CsrfMiddleware, CsrfMiddlewareConfig, CsrfToken, REASON_CSRF_FAILED};
