//! Classified error taxonomy returned by the coordinator, plus local configuration errors.

// crates.io
use oauth2::http;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shareable transport cause; every waiter of one refresh receives the same pointer.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// HTTP status code meaning the server timed out waiting for the request.
pub const STATUS_REQUEST_TIMEOUT: u16 = 408;
/// HTTP status code meaning the client is being rate limited.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Classified failure produced by [`Coordinator::obtain`](crate::coordinator::Coordinator::obtain).
///
/// The error is `Clone` so a single refresh outcome can be handed to every joined caller.
/// [`Error::should_retry`] tells callers whether re-invoking `obtain` may succeed without
/// user intervention; the coordinator itself never retries.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// No credential is cached and the request did not allow an initial acquisition.
	#[error("No credential is available; log in first.")]
	LoginRequired,
	/// The transport answered with something that cannot be interpreted as an HTTP response.
	#[error("Token endpoint answered with a non-HTTP response.")]
	NonHttpResponse,
	/// The transport failed before producing a response (DNS, TCP, TLS, timeout).
	#[error("Network error occurred while calling the token endpoint.")]
	NetworkFailure {
		/// Transport-specific cause.
		#[source]
		source: SharedError,
	},
	/// The response body does not match the token response schema.
	#[error("Token endpoint returned a body that could not be decoded.")]
	DecodingFailure {
		/// Structured decoding failure naming the offending path.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// The response status is outside the endpoint's accepted set.
	#[error("Token endpoint returned unacceptable status {status}.")]
	UnacceptableStatus {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: Vec<u8>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The endpoint descriptor could not be turned into a request.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Wraps a transport cause as [`Error::NetworkFailure`].
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::NetworkFailure { source: Arc::new(src) }
	}

	/// Wraps a decoding failure as [`Error::DecodingFailure`].
	pub fn decoding(src: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::DecodingFailure { source: Arc::new(src) }
	}

	/// Returns `true` when the failure may clear up by waiting and calling again.
	///
	/// Only transport-level failures and the 408/429 status codes qualify; other status
	/// codes (including 401, 403, and 5xx), decoding failures, missing logins, and local
	/// configuration problems need caller intervention.
	pub fn should_retry(&self) -> bool {
		match self {
			Self::NetworkFailure { .. } | Self::NonHttpResponse => true,
			Self::UnacceptableStatus { status, .. } =>
				matches!(*status, STATUS_REQUEST_TIMEOUT | STATUS_TOO_MANY_REQUESTS),
			Self::DecodingFailure { .. } | Self::LoginRequired | Self::Config(_) => false,
		}
	}

	/// Status code carried by [`Error::UnacceptableStatus`].
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnacceptableStatus { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Retry-After hint carried by [`Error::UnacceptableStatus`].
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::UnacceptableStatus { retry_after, .. } => *retry_after,
			_ => None,
		}
	}
}
impl PartialEq for Error {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::LoginRequired, Self::LoginRequired)
			| (Self::NonHttpResponse, Self::NonHttpResponse) => true,
			(Self::NetworkFailure { source: lhs }, Self::NetworkFailure { source: rhs }) =>
				lhs.to_string() == rhs.to_string(),
			(Self::DecodingFailure { source: lhs }, Self::DecodingFailure { source: rhs }) =>
				lhs.to_string() == rhs.to_string(),
			(
				Self::UnacceptableStatus { status: lhs_status, body: lhs_body, .. },
				Self::UnacceptableStatus { status: rhs_status, body: rhs_body, .. },
			) => lhs_status == rhs_status && lhs_body == rhs_body,
			(Self::Config(lhs), Self::Config(rhs)) => lhs.to_string() == rhs.to_string(),
			_ => false,
		}
	}
}

/// Local configuration failures raised before any network call is made.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error("HTTP request could not be built from the endpoint descriptor.")]
	HttpRequest {
		/// Underlying `http` builder failure.
		#[source]
		source: Arc<http::Error>,
	},
	/// Endpoint components do not form a valid URL.
	#[error("Endpoint components do not form a valid URL.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A refresh was needed but no `tokio` runtime is available to run it.
	#[error("No tokio runtime is available to run the refresh.")]
	MissingRuntime,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<http::Error> for ConfigError {
	fn from(e: http::Error) -> Self {
		Self::HttpRequest { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
