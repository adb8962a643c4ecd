//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, Vec<u8>>>>;

/// Thread-safe storage backend that keeps blobs in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the number of stored blobs.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn read_now(map: StoreMap, key: StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
		Ok(map.read().get(&key).cloned())
	}

	fn write_now(map: StoreMap, key: StoreKey, blob: Vec<u8>) -> Result<(), StoreError> {
		map.write().insert(key, blob);

		Ok(())
	}

	fn delete_now(map: StoreMap, key: StoreKey) -> Result<bool, StoreError> {
		Ok(map.write().remove(&key).is_some())
	}
}
impl CredentialStore for MemoryStore {
	fn read<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Vec<u8>>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Self::read_now(map, key) })
	}

	fn write<'a>(&'a self, key: &'a StoreKey, blob: Vec<u8>) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Self::write_now(map, key, blob) })
	}

	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, bool> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Self::delete_now(map, key) })
	}
}
