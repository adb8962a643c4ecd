//! Storage contracts and built-in store implementations for persisted credentials.
//!
//! Stores treat credentials as opaque blobs addressed by a [`StoreKey`] (service + account),
//! mirroring platform secret stores. The coordinator encodes and decodes the blob itself.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, ServiceId},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable secret storage holding one opaque blob per key.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads the blob stored under `key`, returning `None` when nothing is stored.
	fn read<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Vec<u8>>>;

	/// Stores or replaces the blob under `key`.
	fn write<'a>(&'a self, key: &'a StoreKey, blob: Vec<u8>) -> StoreFuture<'a, ()>;

	/// Deletes the blob under `key`, returning whether one existed. A missing blob is not an
	/// error.
	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, bool>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding data.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored credential.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Service label.
	pub service: ServiceId,
	/// Account label.
	pub account: AccountId,
}
impl StoreKey {
	/// Builds a key from its service and account labels.
	pub fn new(service: ServiceId, account: AccountId) -> Self {
		Self { service, account }
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.service, self.account)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_key_displays_service_and_account() {
		let key = StoreKey::new(
			ServiceId::new("com.example.api").expect("Service fixture should be valid."),
			AccountId::new("user-1").expect("Account fixture should be valid."),
		);

		assert_eq!(key.to_string(), "com.example.api/user-1");
	}

	#[test]
	fn store_key_serde_round_trip() {
		let key = StoreKey::new(
			ServiceId::new("svc").expect("Service fixture should be valid."),
			AccountId::new("acct").expect("Account fixture should be valid."),
		);
		let payload = serde_json::to_string(&key).expect("StoreKey should serialize to JSON.");

		assert_eq!(payload, "{\"service\":\"svc\",\"account\":\"acct\"}");

		let round_trip: StoreKey =
			serde_json::from_str(&payload).expect("Serialized key should deserialize from JSON.");

		assert_eq!(round_trip, key);
	}

	#[test]
	fn store_error_messages_are_sentences() {
		let err = StoreError::Backend { message: "disk full".into() };

		assert_eq!(err.to_string(), "Backend failure: disk full.");
	}
}
