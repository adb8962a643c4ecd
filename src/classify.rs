//! Pure classification of authorization-call outcomes into the [`Error`] taxonomy.
//!
//! Every refresh flows through three gates, each of which can fail with exactly one kind:
//!
//! 1. [`classify_transport_error`]: the transport produced no usable HTTP response
//!    (`NetworkFailure` or `NonHttpResponse`, both retryable).
//! 2. [`check_status`]: the status is outside the endpoint's accepted set
//!    (`UnacceptableStatus`, retryable only for 408/429).
//! 3. [`decode_credential`]: the body does not match the token response schema
//!    (`DecodingFailure`, never retryable).

// std
use std::io;
// crates.io
use oauth2::http::{HeaderMap, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::{self, Credential},
	endpoint::Endpoint,
	error::SharedError,
	http::{HttpClientError, HttpResponse},
};

/// Maps a transport failure into [`Error::NetworkFailure`] or [`Error::NonHttpResponse`].
pub fn classify_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => {
			let source: SharedError = Arc::<E>::from(inner);

			Error::NetworkFailure { source }
		},
		HttpClientError::Io(inner) => Error::network(inner),
		HttpClientError::Other(message) => Error::network(io::Error::other(message)),
		HttpClientError::Http(inner) => {
			crate::obs::non_http_response(&inner);

			Error::NonHttpResponse
		},
		_ => Error::network(io::Error::other("Unrecognized transport failure.")),
	}
}

/// Returns the response body when the status belongs to the endpoint's accepted set.
pub fn check_status(endpoint: &Endpoint, response: HttpResponse) -> Result<Vec<u8>> {
	let status = response.status().as_u16();

	if endpoint.accepts(status) {
		return Ok(response.into_body());
	}

	let retry_after = parse_retry_after(response.headers());

	Err(Error::UnacceptableStatus { status, body: response.into_body(), retry_after })
}

/// Decodes a token response body into a [`Credential`].
pub fn decode_credential(body: &[u8]) -> Result<Credential> {
	auth::decode_token_response(body).map_err(Error::decoding)
}

/// Runs a transport outcome through every gate.
pub fn classify_outcome<E>(
	endpoint: &Endpoint,
	outcome: Result<HttpResponse, HttpClientError<E>>,
) -> Result<Credential>
where
	E: 'static + Send + Sync + StdError,
{
	let response = outcome.map_err(classify_transport_error)?;
	let body = check_status(endpoint, response)?;

	decode_credential(&body)
}

/// Parses a `Retry-After` header expressed either as delta seconds or an RFC 2822 date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
