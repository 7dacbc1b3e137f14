//! Read-only access to request cookies

use bazaar_conf::is_valid_cookie_name;
use http::HeaderMap;
use http::header::COOKIE;
use std::collections::HashMap;

/// A request-scoped, read-only cookie collection.
///
/// Lookups never fail: a missing cookie is `None`.
pub trait CookieStore {
	/// Raw stored value of the cookie called `name`
	fn cookie(&self, name: &str) -> Option<&str>;
}

/// Read a cookie from any [`CookieStore`]
///
/// # Examples
///
/// ```
/// use bazaar_security::cookie::{CookieJar, read_cookie};
///
/// let jar = CookieJar::parse("sessionid=abc123; csrftoken=1700000000|deadbeef");
/// assert_eq!(read_cookie(&jar, "csrftoken"), Some("1700000000|deadbeef"));
/// assert_eq!(read_cookie(&jar, "missing"), None);
/// ```
pub fn read_cookie<'a, S>(store: &'a S, name: &str) -> Option<&'a str>
where
	S: CookieStore + ?Sized,
{
	store.cookie(name)
}

/// Cookies parsed from `Cookie` request headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
	cookies: Vec<(String, String)>,
}

impl CookieJar {
	/// Create an empty jar
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a single `Cookie` header value.
	///
	/// Malformed segments are skipped rather than failing the whole header:
	/// - segments without a `=` separator
	/// - empty names or names with separators/control characters
	///
	/// Values wrapped in double quotes are unquoted.
	pub fn parse(header: &str) -> Self {
		let mut jar = Self::new();
		jar.extend_from_header(header);
		jar
	}

	/// Collect cookies from every `Cookie` header in `headers`.
	///
	/// Header values that are not visible ASCII are ignored.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		let mut jar = Self::new();
		for value in headers.get_all(COOKIE) {
			if let Ok(header) = value.to_str() {
				jar.extend_from_header(header);
			}
		}
		jar
	}

	/// Add a cookie; an existing cookie of the same name takes precedence
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.cookies.push((name.into(), value.into()));
	}

	/// Number of cookies in the jar
	pub fn len(&self) -> usize {
		self.cookies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cookies.is_empty()
	}

	/// Iterate over `(name, value)` pairs in header order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.cookies.iter().map(|(n, v)| (n.as_str(), v.as_str()))
	}

	fn extend_from_header(&mut self, header: &str) {
		for cookie in header.split(';') {
			let cookie = cookie.trim();
			if cookie.is_empty() {
				continue;
			}
			let Some((name, value)) = cookie.split_once('=') else {
				continue;
			};
			let name = name.trim();
			if !is_valid_cookie_name(name) {
				continue;
			}
			let value = value.trim();
			let value = value
				.strip_prefix('"')
				.and_then(|v| v.strip_suffix('"'))
				.unwrap_or(value);
			self.cookies.push((name.to_string(), value.to_string()));
		}
	}
}

impl CookieStore for CookieJar {
	fn cookie(&self, name: &str) -> Option<&str> {
		// First occurrence wins, matching how browsers order more specific paths first.
		self.cookies
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.as_str())
	}
}

impl CookieStore for HashMap<String, String> {
	fn cookie(&self, name: &str) -> Option<&str> {
		self.get(name).map(String::as_str)
	}
}

impl<T: CookieStore + ?Sized> CookieStore for &T {
	fn cookie(&self, name: &str) -> Option<&str> {
		(**self).cookie(name)
	}
}
