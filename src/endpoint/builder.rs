// crates.io
use oauth2::http::{HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	endpoint::{CachePolicy, Endpoint, HttpMethod},
};

/// Default request timeout applied by [`EndpointBuilder`].
pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(60);

/// Errors raised while constructing or validating endpoint descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum EndpointError {
	/// Host is empty or contains whitespace.
	#[error("Endpoint host `{host}` is invalid.")]
	InvalidHost {
		/// Host that failed validation.
		host: String,
	},
	/// Only `http` and `https` are supported.
	#[error("Endpoint scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Scheme that failed validation.
		scheme: String,
	},
	/// Non-empty paths must be absolute.
	#[error("Endpoint path `{path}` must be empty or start with `/`.")]
	RelativePath {
		/// Path that failed validation.
		path: String,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Header name that failed validation.
		name: String,
	},
	/// Header value contains forbidden bytes.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header whose value failed validation.
		name: String,
	},
	/// At least one status code must be accepted.
	#[error("Endpoint must accept at least one status code.")]
	NoAcceptedStatusCodes,
	/// Timeouts must be positive.
	#[error("Endpoint timeout must be positive.")]
	NonPositiveTimeout,
}

/// Builder for [`Endpoint`] values with the usual defaults pre-filled.
///
/// Defaults: scheme `https`, no port, empty path, no query items, `GET`, no headers, no body,
/// [`CachePolicy::UseProtocolCachePolicy`], a 60 second timeout, and status codes 200–299.
#[derive(Debug)]
pub struct EndpointBuilder {
	/// URL scheme.
	pub scheme: String,
	/// Host name or address.
	pub host: String,
	/// Optional explicit port.
	pub port: Option<u16>,
	/// Path component.
	pub path: String,
	/// Query items in declaration order.
	pub query_items: Vec<(String, String)>,
	/// HTTP request method.
	pub method: HttpMethod,
	/// Header fields.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Cache behavior.
	pub cache_policy: CachePolicy,
	/// Per-call timeout.
	pub timeout: Duration,
	/// Status codes treated as success.
	pub accepted_status_codes: Vec<u16>,
}
impl EndpointBuilder {
	/// Creates a new builder for the provided host.
	pub fn new(host: impl Into<String>) -> Self {
		Self {
			scheme: "https".into(),
			host: host.into(),
			port: None,
			path: String::new(),
			query_items: Vec::new(),
			method: HttpMethod::default(),
			headers: Vec::new(),
			body: None,
			cache_policy: CachePolicy::default(),
			timeout: DEFAULT_TIMEOUT,
			accepted_status_codes: (200..=299).collect(),
		}
	}

	/// Overrides the URL scheme.
	pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = scheme.into();

		self
	}

	/// Sets an explicit port.
	pub fn port(mut self, port: u16) -> Self {
		self.port = Some(port);

		self
	}

	/// Sets the path component.
	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();

		self
	}

	/// Appends a query item.
	pub fn query_item(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query_items.push((name.into(), value.into()));

		self
	}

	/// Overrides the request method.
	pub fn method(mut self, method: HttpMethod) -> Self {
		self.method = method;

		self
	}

	/// Appends a header field.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the request body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Overrides the cache policy.
	pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
		self.cache_policy = policy;

		self
	}

	/// Overrides the request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Replaces the accepted status codes.
	pub fn accepted_status_codes<I>(mut self, codes: I) -> Self
	where
		I: IntoIterator<Item = u16>,
	{
		self.accepted_status_codes = codes.into_iter().collect();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<Endpoint, EndpointError> {
		let endpoint = Endpoint {
			scheme: self.scheme,
			host: self.host,
			port: self.port,
			path: self.path,
			query_items: self.query_items,
			method: self.method,
			headers: self.headers,
			body: self.body,
			cache_policy: self.cache_policy,
			timeout: self.timeout,
			accepted_status_codes: self.accepted_status_codes,
		};

		endpoint.validate()?;

		Ok(endpoint)
	}
}

impl Endpoint {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), EndpointError> {
		if self.host.is_empty() || self.host.chars().any(char::is_whitespace) {
			return Err(EndpointError::InvalidHost { host: self.host.clone() });
		}
		if !matches!(self.scheme.as_str(), "http" | "https") {
			return Err(EndpointError::UnsupportedScheme { scheme: self.scheme.clone() });
		}
		if !self.path.is_empty() && !self.path.starts_with('/') {
			return Err(EndpointError::RelativePath { path: self.path.clone() });
		}
		if self.accepted_status_codes.is_empty() {
			return Err(EndpointError::NoAcceptedStatusCodes);
		}
		if !self.timeout.is_positive() {
			return Err(EndpointError::NonPositiveTimeout);
		}

		for (name, value) in &self.headers {
			validate_header(name, value)?;
		}

		Ok(())
	}
}

fn validate_header(name: &str, value: &str) -> Result<(), EndpointError> {
	HeaderName::from_bytes(name.as_bytes())
		.map_err(|_| EndpointError::InvalidHeaderName { name: name.to_owned() })?;
	HeaderValue::from_str(value)
		.map_err(|_| EndpointError::InvalidHeaderValue { name: name.to_owned() })?;

	Ok(())
}
