//! # Bazaar HTTP
//!
//! Request/response types and the handler and middleware abstractions the
//! Bazaar marketplace composes its request pipeline from.
//!
//! Requests and responses are plain [`http`] types with a [`Bytes`] body, so
//! any server that produces `http::Request` values can drive a
//! [`MiddlewareChain`].

pub mod error;
pub mod middleware;

pub use bytes::Bytes;
pub use error::{Error, Result};
pub use middleware::{Handler, Middleware, MiddlewareChain};

/// Incoming HTTP request with a fully buffered body
pub type Request = http::Request<Bytes>;

/// Outgoing HTTP response with a fully buffered body
pub type Response = http::Response<Bytes>;
