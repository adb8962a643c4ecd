//! Single-flight bearer credential coordinator: cache, refresh, and persist OAuth-style
//! access/refresh token pairs while concurrent callers share one refresh request.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod classify;
pub mod coordinator;
pub mod endpoint;
pub mod error;
pub mod ext;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AccountId, Credential, ServiceId},
		coordinator::Coordinator,
		endpoint::{Endpoint, EndpointBuilder, HttpMethod},
		http::ReqwestHttpClient,
		store::{CredentialStore, MemoryStore, StoreKey},
	};

	/// Coordinator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestCoordinator = Coordinator<ReqwestHttpClient>;

	/// Store key shared by integration tests.
	pub fn test_store_key() -> StoreKey {
		let service = ServiceId::new("bearer-coordinator.test")
			.expect("Service identifier fixture should be valid.");
		let account =
			AccountId::new("account-test").expect("Account identifier fixture should be valid.");

		StoreKey::new(service, account)
	}

	/// Builds a `POST` token endpoint pointing at a local mock server address such as
	/// `127.0.0.1:8080`.
	pub fn test_token_endpoint(address: &str) -> Endpoint {
		let (host, port) = address
			.rsplit_once(':')
			.expect("Mock server address should contain a port separator.");
		let port = port.parse::<u16>().expect("Mock server port should be numeric.");

		EndpointBuilder::new(host)
			.scheme("http")
			.port(port)
			.path("/oauth2/token")
			.method(HttpMethod::Post)
			.query_item("grant_type", "refresh_token")
			.build()
			.expect("Mock token endpoint should build successfully.")
	}

	/// Seeds `store` with `credential` under `key`.
	pub async fn seed_credential(store: &MemoryStore, key: &StoreKey, credential: &Credential) {
		let blob = credential.to_blob().expect("Credential fixture should serialize.");

		store.write(key, blob).await.expect("Failed to seed credential into the store.");
	}

	/// Constructs a [`Coordinator`] backed by an in-memory store and the reqwest transport.
	pub async fn build_reqwest_test_coordinator(
		store: Arc<MemoryStore>,
	) -> ReqwestTestCoordinator {
		let backend: Arc<dyn CredentialStore> = store;

		Coordinator::load(backend, test_store_key(), ReqwestHttpClient::default()).await
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
