//! Immutable credential snapshots and the token-response wire format that mints them.

// self
use crate::{_prelude::*, auth::TokenSecret, store::StoreError};

/// Immutable snapshot of an access/refresh token pair and its absolute expiry.
///
/// Values are minted either by decoding a token endpoint response, which converts the
/// server-supplied `expires_in` seconds into an absolute instant at decode time, or by
/// decoding a blob previously persisted through [`Credential::to_blob`]. A refresh never
/// mutates a credential; it supersedes it with a new value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
	access_token: TokenSecret,
	refresh_token: TokenSecret,
	expires_at: OffsetDateTime,
}
impl Credential {
	/// Builds a credential with an absolute expiry instant.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			expires_at,
		}
	}

	/// Builds a credential expiring `expires_in` after the current UTC clock reading.
	pub fn issued_now(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_in: Duration,
	) -> Self {
		Self::new(access_token, refresh_token, OffsetDateTime::now_utc() + expires_in)
	}

	/// Access token secret; callers must avoid logging it.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token secret used to mint the next credential.
	pub fn refresh_token(&self) -> &TokenSecret {
		&self.refresh_token
	}

	/// Absolute expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns `true` while `instant` lies strictly before the expiry instant.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Evaluates validity against the current UTC clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `instant`, clamped to zero once expired.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Encodes the credential into the opaque blob handed to credential stores.
	pub fn to_blob(&self) -> Result<Vec<u8>, StoreError> {
		serde_json::to_vec(self).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode credential: {e}"),
		})
	}

	/// Decodes a blob produced by [`Credential::to_blob`].
	pub fn from_blob(blob: &[u8]) -> Result<Self, StoreError> {
		serde_json::from_slice(blob).map_err(|e| StoreError::Serialization {
			message: format!("Failed to decode credential: {e}"),
		})
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Credential(expires_at: {})", self.expires_at)
	}
}

/// Token endpoint response body: `{"access_token", "refresh_token", "expires_in"}`.
///
/// `expires_in` is read as whole seconds and converted to an absolute instant against the
/// clock reading taken while the field is decoded. Unknown fields such as `token_type` or
/// `scope` are ignored.
#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	refresh_token: String,
	#[serde(rename = "expires_in", deserialize_with = "expires_in_from_now")]
	expires_at: OffsetDateTime,
}
impl From<TokenResponse> for Credential {
	fn from(response: TokenResponse) -> Self {
		Self::new(response.access_token, response.refresh_token, response.expires_at)
	}
}

fn expires_in_from_now<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let seconds = i64::deserialize(deserializer)?;

	OffsetDateTime::now_utc().checked_add(Duration::seconds(seconds)).ok_or_else(|| {
		<D::Error as serde::de::Error>::custom(format!(
			"expires_in value {seconds} exceeds the supported range"
		))
	})
}

/// Decodes a token endpoint response body into a [`Credential`], reporting the failing path.
pub fn decode_token_response(
	body: &[u8],
) -> Result<Credential, serde_path_to_error::Error<serde_json::Error>> {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let response: TokenResponse = serde_path_to_error::deserialize(de)?;

	Ok(response.into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn validity_is_strictly_before_expiry() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let credential = Credential::new("access", "refresh", expires);

		assert!(credential.is_valid_at(macros::datetime!(2025-01-01 00:59:59 UTC)));
		assert!(!credential.is_valid_at(expires));
		assert!(!credential.is_valid_at(macros::datetime!(2025-01-01 01:00:01 UTC)));
	}

	#[test]
	fn validity_tracks_the_live_clock() {
		let past = Credential::issued_now("a", "r", Duration::seconds(-1));
		let future = Credential::issued_now("a", "r", Duration::seconds(20_000));

		assert!(!past.is_valid());
		assert!(future.is_valid());
	}

	#[test]
	fn remaining_lifetime_clamps_at_zero() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let credential = Credential::new("access", "refresh", expires);

		assert_eq!(
			credential.expires_in_at(macros::datetime!(2025-01-01 00:30 UTC)),
			Duration::minutes(30)
		);
		assert_eq!(credential.expires_in_at(macros::datetime!(2025-01-01 02:00 UTC)), Duration::ZERO);
	}

	#[test]
	fn blob_round_trip_preserves_every_field() {
		let credential = Credential::new(
			"access-blob",
			"refresh-blob",
			macros::datetime!(2025-03-04 05:06:07.123456789 UTC),
		);
		let blob = credential.to_blob().expect("Credential should encode.");
		let decoded = Credential::from_blob(&blob).expect("Credential blob should decode.");

		assert_eq!(decoded, credential);
		assert_eq!(decoded.access_token().expose(), "access-blob");
		assert_eq!(decoded.refresh_token().expose(), "refresh-blob");
		assert_eq!(decoded.expires_at(), credential.expires_at());
	}

	#[test]
	fn corrupt_blob_reports_serialization_error() {
		let err = Credential::from_blob(b"{not json").expect_err("Corrupt blob must not decode.");

		assert!(matches!(err, StoreError::Serialization { .. }));
	}

	#[test]
	fn token_response_converts_expires_in_to_absolute_instant() {
		let before = OffsetDateTime::now_utc();
		let credential = decode_token_response(
			br#"{"access_token":"a-1","refresh_token":"r-1","expires_in":10800,"token_type":"bearer"}"#,
		)
		.expect("Token response should decode.");
		let after = OffsetDateTime::now_utc();

		assert_eq!(credential.access_token().expose(), "a-1");
		assert_eq!(credential.refresh_token().expose(), "r-1");
		assert!(credential.expires_at() >= before + Duration::seconds(10_800));
		assert!(credential.expires_at() <= after + Duration::seconds(10_800));
		assert!(credential.is_valid());
	}

	#[test]
	fn token_response_errors_name_the_offending_field() {
		let err = decode_token_response(br#"{"access_token":"a","refresh_token":"r","expires_in":"soon"}"#)
			.expect_err("String expires_in must be rejected.");

		assert_eq!(err.path().to_string(), "expires_in");

		let err = decode_token_response(br#"{"access_token":"a","expires_in":60}"#)
			.expect_err("Missing refresh_token must be rejected.");

		assert!(err.to_string().contains("refresh_token"));
	}

	#[test]
	fn token_response_rejects_out_of_range_expiry() {
		let body = format!(
			r#"{{"access_token":"a","refresh_token":"r","expires_in":{}}}"#,
			i64::MAX
		);
		let err = decode_token_response(body.as_bytes())
			.expect_err("Overflowing expires_in must be rejected.");

		assert!(err.to_string().contains("supported range"));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let credential = Credential::issued_now("visible-access", "visible-refresh", Duration::hours(1));
		let rendered = format!("{credential:?}");

		assert!(!rendered.contains("visible-access"));
		assert!(!rendered.contains("visible-refresh"));
		assert!(rendered.contains("<redacted>"));
	}
}
