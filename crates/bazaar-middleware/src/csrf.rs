//! CSRF (Cross-Site Request Forgery) protection middleware
//!
//! - Safe methods (GET, HEAD, OPTIONS, TRACE) are never verified. They reuse
//!   the token carried by a valid CSRF cookie, or issue a new pair when the
//!   cookie is absent or invalid. Either way the raw token is sent in the CSRF
//!   response header and handlers find it in the request extensions as
//!   [`CsrfToken`] for embedding in rendered forms.
//! - Every other method must echo the raw token in the CSRF request header.
//!   Failures are reported with one generic reason whatever the cause.
//! - Exempt paths bypass the middleware entirely.

use async_trait::async_trait;
use bazaar_conf::{CsrfSettings, SecretString, Settings};
use bazaar_http::{Error, Handler, Middleware, Request, Response, Result};
use bazaar_security::cookie::CookieJar;
use bazaar_security::csrf::{CsrfIssuer, CsrfVerifier, StoredCsrfValue};
use http::header::{HeaderName, HeaderValue, SET_COOKIE};
use http::Method;
use std::sync::Arc;

pub use bazaar_security::csrf::CsrfToken;

/// The only reason ever given for a rejected request
pub const REASON_CSRF_FAILED: &str = "CSRF verification failed.";

/// CSRF middleware configuration
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct CsrfMiddlewareConfig {
	/// Cookie, header and exemption settings
	pub csrf: CsrfSettings,
}

impl CsrfMiddlewareConfig {
	/// Production configuration with security hardening
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_middleware::csrf::CsrfMiddlewareConfig;
	///
	/// let config = CsrfMiddlewareConfig::production();
	/// assert!(config.csrf.cookie_secure);
	/// ```
	pub fn production() -> Self {
		Self {
			csrf: CsrfSettings::production(),
		}
	}

	/// Create from application `Settings`
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::Settings;
	/// use bazaar_middleware::csrf::CsrfMiddlewareConfig;
	///
	/// let mut settings = Settings::default();
	/// settings.csrf.cookie_secure = true;
	/// let config = CsrfMiddlewareConfig::from_settings(&settings);
	/// assert!(config.csrf.cookie_secure);
	/// ```
	pub fn from_settings(settings: &Settings) -> Self {
		Self {
			csrf: settings.csrf.clone(),
		}
	}

	/// Add an exempt path
	pub fn add_exempt_path(mut self, path: impl Into<String>) -> Self {
		self.csrf.exempt_paths.insert(path.into());
		self
	}
}

/// CSRF protection middleware
pub struct CsrfMiddleware {
	config: CsrfMiddlewareConfig,
	verifier: CsrfVerifier,
	issuer: CsrfIssuer,
}

impl CsrfMiddleware {
	/// Create middleware with default configuration
	///
	/// # Examples
	///
	/// ```
	/// use bazaar_conf::SecretString;
	/// use bazaar_http::{Bytes, Handler, Middleware, Request, Response, Result};
	/// use bazaar_middleware::csrf::CsrfMiddleware;
	/// use std::sync::Arc;
	///
	/// struct ListingsHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for ListingsHandler {
	///     async fn handle(&self, _request: Request) -> Result<Response> {
	///         Ok(Response::new(Bytes::from_static(b"OK")))
	///     }
	/// }
	///
	/// # tokio_test::block_on(async {
	/// let middleware = CsrfMiddleware::new(Arc::new(SecretString::new("s3cr3t")));
	/// let request = http::Request::get("/listings").body(Bytes::new()).unwrap();
	///
	/// let response = middleware.process(request, Arc::new(ListingsHandler)).await.unwrap();
	/// assert!(response.headers().contains_key("Set-Cookie"));
	/// assert!(response.headers().contains_key("X-CSRFToken"));
	/// # });
	/// ```
	pub fn new(secret: Arc<SecretString>) -> Self {
		Self::with_config(CsrfMiddlewareConfig::default(), secret)
	}

	/// Create middleware with custom configuration
	pub fn with_config(config: CsrfMiddlewareConfig, secret: Arc<SecretString>) -> Self {
		Self {
			verifier: CsrfVerifier::new(secret.clone(), config.csrf.cookie_name.clone()),
			issuer: CsrfIssuer::new(secret),
			config,
		}
	}

	/// Create from application `Settings`
	pub fn from_settings(settings: &Settings, secret: Arc<SecretString>) -> Self {
		Self::with_config(CsrfMiddlewareConfig::from_settings(settings), secret)
	}

	pub fn config(&self) -> &CsrfMiddlewareConfig {
		&self.config
	}

	fn is_safe_method(method: &Method) -> bool {
		matches!(
			*method,
			Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
		)
	}

	/// Extract the client-echoed token from the configured request header
	fn extract_token<'a>(&self, request: &'a Request) -> Option<&'a str> {
		request
			.headers()
			.get(self.config.csrf.header_name.as_str())
			.and_then(|value| value.to_str().ok())
	}

	/// Build Set-Cookie header
	fn build_set_cookie_header(&self, value: &StoredCsrfValue) -> String {
		let csrf = &self.config.csrf;
		let mut cookie = format!("{}={}; Path={}", csrf.cookie_name, value, csrf.cookie_path);

		if csrf.cookie_secure {
			cookie.push_str("; Secure");
		}

		if csrf.cookie_httponly {
			cookie.push_str("; HttpOnly");
		}

		cookie.push_str("; SameSite=");
		cookie.push_str(csrf.cookie_samesite.as_str());

		if let Some(domain) = &csrf.cookie_domain {
			cookie.push_str(&format!("; Domain={}", domain));
		}

		if let Some(max_age) = csrf.cookie_max_age {
			cookie.push_str(&format!("; Max-Age={}", max_age));
		}

		cookie
	}

	/// Verify the double-submitted token of an unsafe request
	fn validate_csrf(&self, request: &Request) -> Result<CsrfToken> {
		let cookies = CookieJar::from_headers(request.headers());

		match self.extract_token(request) {
			Some(token) if self.verifier.verify(&cookies, token) => {
				Ok(CsrfToken::new(token.to_string()))
			}
			_ => {
				tracing::warn!(
					method = %request.method(),
					path = request.uri().path(),
					"Rejected request: CSRF verification failed"
				);
				Err(Error::Authorization(REASON_CSRF_FAILED.to_string()))
			}
		}
	}

	/// Token for a safe request: the one in a valid CSRF cookie, or a new pair
	/// whose cookie value still has to be sent
	fn token_for(&self, request: &Request) -> (CsrfToken, Option<StoredCsrfValue>) {
		let cookies = CookieJar::from_headers(request.headers());
		if let Some(token) = self.verifier.recover_token(&cookies) {
			return (token, None);
		}

		let issued = self.issuer.issue();
		tracing::debug!(
			method = %request.method(),
			path = request.uri().path(),
			"Issued CSRF token"
		);
		(issued.token, Some(issued.cookie_value))
	}

	/// Response header carrying the raw token. `Settings::validate` rejects
	/// names that fail here.
	fn token_header(&self) -> Result<HeaderName> {
		HeaderName::from_bytes(self.config.csrf.header_name.as_bytes())
			.map_err(|e| Error::Internal(format!("Invalid CSRF header name: {}", e)))
	}

	fn attach_token(
		&self,
		response: &mut Response,
		header_name: HeaderName,
		token: &CsrfToken,
		cookie_value: Option<&StoredCsrfValue>,
	) -> Result<()> {
		let token = HeaderValue::from_str(token.as_str())
			.map_err(|e| Error::Internal(format!("Invalid CSRF token header: {}", e)))?;

		let headers = response.headers_mut();
		if let Some(value) = cookie_value {
			let cookie = HeaderValue::from_str(&self.build_set_cookie_header(value))
				.map_err(|e| Error::Internal(format!("Invalid CSRF cookie header: {}", e)))?;
			headers.append(SET_COOKIE, cookie);
		}
		headers.insert(header_name, token);
		Ok(())
	}
}

#[async_trait]
impl Middleware for CsrfMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if self.config.csrf.exempt_paths.contains(request.uri().path()) {
			return next.handle(request).await;
		}

		if !Self::is_safe_method(request.method()) {
			let token = self.validate_csrf(&request)?;
			request.extensions_mut().insert(token);
			return next.handle(request).await;
		}

		let header_name = self.token_header()?;
		let (token, cookie_value) = self.token_for(&request);
		request.extensions_mut().insert(token.clone());

		let mut response = next.handle(request).await?;
		self.attach_token(&mut response, header_name, &token, cookie_value.as_ref())?;

		Ok(response)
	}
}
