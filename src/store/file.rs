//! Simple file-backed [`CredentialStore`] for lightweight deployments and CLIs.

// std
use std::{
	fs::{self, File},
	io::{self, Write},
	path::{Path, PathBuf},
};
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError, StoreFuture, StoreKey},
};

/// On-disk entry: key plus the base64-encoded blob.
#[derive(Serialize, Deserialize)]
struct FileEntry {
	key: StoreKey,
	blob: String,
}

/// Keeps blobs in memory and rewrites a JSON snapshot after every mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<StoreKey, Vec<u8>>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	///
	/// An empty or missing file yields an empty store; a malformed one is reported as
	/// [`StoreError::Serialization`].
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		create_parent(&path)?;

		let blobs = match fs::read(&path) {
			Ok(bytes) if bytes.is_empty() => HashMap::new(),
			Ok(bytes) => decode_snapshot(&path, &bytes)?,
			Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
			Err(e) => return Err(backend("read", &path, e)),
		};

		Ok(Self { path, inner: Arc::new(RwLock::new(blobs)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	// Callers hold the write lock so snapshots never interleave.
	fn persist(&self, blobs: &HashMap<StoreKey, Vec<u8>>) -> Result<(), StoreError> {
		let entries = blobs
			.iter()
			.map(|(key, blob)| FileEntry { key: key.clone(), blob: STANDARD.encode(blob) })
			.collect::<Vec<_>>();
		let bytes = serde_json::to_vec_pretty(&entries).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode snapshot for {}: {e}", self.path.display()),
		})?;
		let staging = self.path.with_extension("tmp");

		create_parent(&self.path)?;

		let mut file = File::create(&staging).map_err(|e| backend("create", &staging, e))?;

		file.write_all(&bytes).map_err(|e| backend("write", &staging, e))?;
		file.sync_all().map_err(|e| backend("sync", &staging, e))?;
		drop(file);

		fs::rename(&staging, &self.path).map_err(|e| backend("replace", &self.path, e))
	}
}
impl CredentialStore for FileStore {
	fn read<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn write<'a>(&'a self, key: &'a StoreKey, blob: Vec<u8>) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(key.clone(), blob);
			self.persist(&guard)?;

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(key).is_none() {
				return Ok(false);
			}

			self.persist(&guard)?;

			Ok(true)
		})
	}
}

fn create_parent(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() =>
			fs::create_dir_all(parent).map_err(|e| backend("create directory", parent, e)),
		_ => Ok(()),
	}
}

fn decode_snapshot(path: &Path, bytes: &[u8]) -> Result<HashMap<StoreKey, Vec<u8>>, StoreError> {
	let entries: Vec<FileEntry> =
		serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})?;

	entries
		.into_iter()
		.map(|FileEntry { key, blob }| match STANDARD.decode(blob.as_bytes()) {
			Ok(blob) => Ok((key, blob)),
			Err(e) => Err(StoreError::Serialization {
				message: format!("Failed to decode blob for {key}: {e}"),
			}),
		})
		.collect()
}

fn backend(action: &str, path: &Path, e: io::Error) -> StoreError {
	StoreError::Backend { message: format!("Failed to {action} {}: {e}", path.display()) }
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{AccountId, Credential, ServiceId};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"bearer_coordinator_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn key() -> StoreKey {
		StoreKey::new(
			ServiceId::new("com.example.api").expect("Failed to build service fixture."),
			AccountId::new("user-file").expect("Failed to build account fixture."),
		)
	}

	#[test]
	fn write_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let credential = Credential::issued_now("access-file", "refresh-file", Duration::hours(1));
		let blob = credential.to_blob().expect("Failed to encode credential fixture.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.write(&key(), blob)).expect("Failed to write fixture blob.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.read(&key()))
			.expect("Failed to read fixture blob from file store.")
			.expect("File store lost blob after reopen.");

		assert_eq!(
			Credential::from_blob(&fetched).expect("Reloaded blob should decode."),
			credential
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn delete_persists_and_reports_presence() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.write(&key(), b"blob".to_vec())).expect("Failed to write fixture blob.");

		assert!(rt.block_on(store.delete(&key())).expect("Delete should succeed."));
		assert!(!rt.block_on(store.delete(&key())).expect("Deleting twice should succeed."));

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(rt.block_on(reopened.read(&key())).expect("Read should succeed."), None);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path();

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot.");

		assert!(matches!(FileStore::open(&path), Err(StoreError::Serialization { .. })));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
