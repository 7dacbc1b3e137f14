//! HTTP-level errors and their responses

use crate::Response;
use bytes::Bytes;
use http::{StatusCode, header};

/// Result type for handlers and middleware
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by handlers and middleware
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The request is not allowed to proceed
	#[error("Authorization failed: {0}")]
	Authorization(String),

	/// The request is malformed
	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code for this error
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::Authorization(_) => StatusCode::FORBIDDEN,
			Error::BadRequest(_) => StatusCode::BAD_REQUEST,
			Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Render the error as a plain-text response.
	///
	/// Authorization and internal errors only expose the status reason, so the
	/// client learns nothing about why a request was refused.
	pub fn into_response(self) -> Response {
		let status = self.status_code();
		let body = match &self {
			Error::BadRequest(reason) => reason.clone(),
			Error::Authorization(_) | Error::Internal(_) => status
				.canonical_reason()
				.unwrap_or("Error")
				.to_string(),
		};

		let mut response = Response::new(Bytes::from(body));
		*response.status_mut() = status;
		response.headers_mut().insert(
			header::CONTENT_TYPE,
			header::HeaderValue::from_static("text/plain; charset=utf-8"),
		);
		response
	}
}
