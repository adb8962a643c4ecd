//! Transport primitives for authorization calls.
//!
//! [`TokenHttpClient`] is the coordinator's only dependency on an HTTP stack: it executes an
//! [`HttpRequest`] built from an [`Endpoint`](crate::endpoint::Endpoint) and yields the raw
//! status, headers, and body, or an [`HttpClientError`] when no usable response was produced.
//! Status gating and body decoding stay in [`classify`](crate::classify), so transports never
//! interpret responses.

pub use oauth2::{HttpClientError, HttpRequest, HttpResponse};

// self
use crate::_prelude::*;

/// Boxed future returned by [`TokenHttpClient::execute`].
pub type HttpFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Request extension carrying the endpoint's timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);
impl RequestTimeout {
	/// Returns the timeout of `request`, if one was attached.
	///
	/// Zero and negative timeouts mean "no timeout" and yield `None`.
	pub fn of(request: &HttpRequest) -> Option<Duration> {
		request
			.extensions()
			.get::<Self>()
			.map(|timeout| timeout.0)
			.filter(|timeout| timeout.is_positive())
	}
}

/// Abstraction over HTTP transports capable of executing authorization calls.
///
/// Implementations must be `Send + Sync + 'static` because refreshes run on detached tasks
/// that own an `Arc` of the transport. Implementations should honor [`RequestTimeout`] and
/// report an elapsed timeout as a transport error so it classifies as a network failure.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and returns the raw response.
	///
	/// # Error Contract
	///
	/// - [`HttpClientError::Reqwest`], [`HttpClientError::Io`], and [`HttpClientError::Other`]
	///   mean the call never produced a response.
	/// - [`HttpClientError::Http`] means bytes came back but could not be interpreted as an HTTP
	///   response.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}
impl<T> TokenHttpClient for Arc<T>
where
	T: ?Sized + TokenHttpClient,
{
	type TransportError = T::TransportError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		(**self).execute(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects; configure any custom [`ReqwestClient`] passed to
/// [`ReqwestHttpClient::with_client`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn without_redirects() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let timeout = RequestTimeout::of(&request)
				.and_then(|timeout| std::time::Duration::try_from(timeout).ok());
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			if let Some(timeout) = timeout {
				*request.timeout_mut() = Some(timeout);
			}

			let response = client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
