//! Request signing contracts that let downstream crates attach coordinator-issued
//! credentials to arbitrary HTTP clients.

// crates.io
use oauth2::http::{
	self, HeaderValue,
	header::{AUTHORIZATION, InvalidHeaderValue},
};
// self
use crate::{_prelude::*, auth::Credential};

/// Describes how to attach a [`Credential`] to an outbound request without
/// constraining the HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization state derived from the
	/// [`Credential`].
	fn attach_credential(
		&self,
		request: Request,
		credential: &Credential,
	) -> Result<Request, Error>;
}

/// Failures raised while attaching a bearer token.
#[derive(Debug, ThisError)]
pub enum SignError {
	/// The credential expired before the request was signed.
	#[error("Credential expired at {expired_at}; obtain a fresh one before signing.")]
	Expired {
		/// Expiry instant of the rejected credential.
		expired_at: OffsetDateTime,
	},
	/// The access token contains bytes that are not valid in a header value.
	#[error("Access token is not a valid header value.")]
	InvalidHeaderValue(#[from] InvalidHeaderValue),
}

/// Attaches `Authorization: Bearer <access token>` to outbound requests.
///
/// Expired credentials are rejected unless [`BearerSigner::allow_expired`] is set, so callers
/// notice when they skipped [`Coordinator::obtain`](crate::coordinator::Coordinator::obtain).
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner {
	allow_expired: bool,
}
impl BearerSigner {
	/// Creates a signer that rejects expired credentials.
	pub fn new() -> Self {
		Self::default()
	}

	/// Signs even when the credential is already expired.
	pub fn allow_expired(mut self) -> Self {
		self.allow_expired = true;

		self
	}

	/// Builds the header value for `credential`.
	pub fn header_value(&self, credential: &Credential) -> Result<HeaderValue, SignError> {
		if !self.allow_expired && !credential.is_valid() {
			return Err(SignError::Expired { expired_at: credential.expires_at() });
		}

		let mut value =
			HeaderValue::from_str(&format!("Bearer {}", credential.access_token().expose()))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl<B> RequestSignerExt<http::Request<B>, SignError> for BearerSigner {
	fn attach_credential(
		&self,
		mut request: http::Request<B>,
		credential: &Credential,
	) -> Result<http::Request<B>, SignError> {
		let value = self.header_value(credential)?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, SignError> for BearerSigner {
	fn attach_credential(
		&self,
		request: reqwest::RequestBuilder,
		credential: &Credential,
	) -> Result<reqwest::RequestBuilder, SignError> {
		let value = self.header_value(credential)?;

		Ok(request.header(AUTHORIZATION, value))
	}
}
