//! Declarative descriptions of the authorization calls the coordinator issues.
//!
//! An [`Endpoint`] captures every component of an HTTP call (scheme, host, path, query,
//! method, headers, body, cache policy, timeout, accepted status codes) independently of
//! how the call is executed. [`EndpointBuilder`] supplies the common defaults so a token
//! endpoint usually only names its host, path, and method.

/// Builder API for assembling endpoint descriptors.
pub mod builder;
/// HTTP request methods.
pub mod method;

pub use builder::*;
pub use method::*;

// crates.io
use oauth2::{
	HttpRequest,
	http::{self, header::CACHE_CONTROL},
};
// self
use crate::{_prelude::*, error::ConfigError, http::RequestTimeout};

/// Query item carrying the current refresh token on refresh calls.
pub const REFRESH_TOKEN_QUERY_ITEM: &str = "refresh_token";

/// Cache behavior requested for the call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
	#[default]
	/// Defer to the transport's protocol-level caching rules.
	UseProtocolCachePolicy,
	/// Bypass any cached response; requests carry `Cache-Control: no-cache`.
	ReloadIgnoringCacheData,
}

/// Immutable description of one authorization call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
	/// URL scheme (`https` unless overridden).
	pub scheme: String,
	/// Host name or address, without a port.
	pub host: String,
	/// Optional explicit port.
	pub port: Option<u16>,
	/// Path component; empty or starting with `/`.
	pub path: String,
	/// Query items appended in declaration order.
	pub query_items: Vec<(String, String)>,
	/// HTTP request method.
	pub method: HttpMethod,
	/// Header fields sent with the request.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Cache behavior for the call.
	pub cache_policy: CachePolicy,
	/// Per-call timeout enforced by the transport.
	pub timeout: Duration,
	/// Status codes treated as success.
	pub accepted_status_codes: Vec<u16>,
}
impl Endpoint {
	/// Creates a new builder for the provided host.
	pub fn builder(host: impl Into<String>) -> EndpointBuilder {
		EndpointBuilder::new(host)
	}

	/// Returns `true` when `status` belongs to the accepted set.
	pub fn accepts(&self, status: u16) -> bool {
		self.accepted_status_codes.contains(&status)
	}

	/// Assembles the URL, placing the `refresh_token` query item (when provided) ahead of the
	/// declared query items.
	pub fn url(&self, refresh_token: Option<&str>) -> Result<Url, ConfigError> {
		let authority = match self.port {
			Some(port) => format!("{}:{port}", self.host),
			None => self.host.clone(),
		};
		let mut url = Url::parse(&format!("{}://{authority}", self.scheme))
			.map_err(|source| ConfigError::InvalidUrl { source })?;

		url.set_path(&self.path);

		if refresh_token.is_some() || !self.query_items.is_empty() {
			let mut pairs = url.query_pairs_mut();

			if let Some(token) = refresh_token {
				pairs.append_pair(REFRESH_TOKEN_QUERY_ITEM, token);
			}
			for (name, value) in &self.query_items {
				pairs.append_pair(name, value);
			}
		}

		Ok(url)
	}

	/// Builds the HTTP request handed to the transport.
	///
	/// The endpoint timeout travels as a [`RequestTimeout`] extension so transports can apply
	/// it without knowing about descriptors. A zero or negative timeout attaches nothing.
	pub fn request(&self, refresh_token: Option<&str>) -> Result<HttpRequest, ConfigError> {
		let url = self.url(refresh_token)?;
		let mut builder =
			http::Request::builder().method(self.method.as_str()).uri(url.as_str());

		if self.timeout.is_positive() {
			builder = builder.extension(RequestTimeout(self.timeout));
		}

		for (name, value) in &self.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		if self.cache_policy == CachePolicy::ReloadIgnoringCacheData
			&& !self.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(CACHE_CONTROL.as_str()))
		{
			builder = builder.header(CACHE_CONTROL, "no-cache");
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}
