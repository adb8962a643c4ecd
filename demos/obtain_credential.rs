//! Demonstrates a first login, cache reuse, a forced single-flight refresh shared by several
//! callers, request signing, and logout against a mock token endpoint.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use bearer_coordinator::{
	auth::{AccountId, ServiceId},
	coordinator::{Coordinator, ObtainRequest},
	endpoint::{Endpoint, HttpMethod},
	ext::{BearerSigner, RequestSignerExt},
	http::ReqwestHttpClient,
	http_types::Request,
	store::{CredentialStore, MemoryStore, StoreKey},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"expires_in\":900}",
			);
		})
		.await;
	let endpoint = Endpoint::builder(server.host())
		.scheme("http")
		.port(server.port())
		.path("/oauth2/token")
		.method(HttpMethod::Post)
		.query_item("grant_type", "refresh_token")
		.build()?;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let key = StoreKey::new(ServiceId::new("com.example.api")?, AccountId::new("demo-user")?);
	let coordinator: Coordinator<ReqwestHttpClient> =
		Coordinator::load(store, key, ReqwestHttpClient::without_redirects()?).await;
	let credential =
		coordinator.obtain(ObtainRequest::new(endpoint.clone()).initial_acquisition()).await?;

	println!(
		"Logged in; token valid for {}.",
		credential.expires_in_at(time::OffsetDateTime::now_utc())
	);

	let cached = coordinator.obtain(ObtainRequest::new(endpoint.clone())).await?;

	println!("Cache hit returned the same credential: {}.", cached == credential);

	let callers = (0..4).map(|_| {
		let coordinator = coordinator.clone();
		let request = ObtainRequest::new(endpoint.clone()).force_refresh();

		tokio::spawn(async move { coordinator.obtain(request).await })
	});

	for caller in callers.collect::<Vec<_>>() {
		caller.await??;
	}

	let metrics = coordinator.refresh_metrics();

	println!("Refreshes started: {}, callers joined: {}.", metrics.attempts(), metrics.joins());

	let request = BearerSigner::new().attach_credential(
		Request::get("https://api.example.com/v1/me").body(())?,
		&coordinator.current().unwrap_or(credential),
	)?;

	println!("Signed request headers: {:?}.", request.headers());

	coordinator.clear().await;

	println!("Logged out; cached credential present: {}.", coordinator.current().is_some());

	token_mock.assert_calls_async(usize::try_from(metrics.attempts())?).await;

	Ok(())
}
