//! Credential lifecycle coordination with single-flight refreshes.
//!
//! [`Coordinator::obtain`] answers "give me a valid credential" by evaluating four mutually
//! exclusive branches under one lock:
//!
//! 1. a refresh is already in flight, so the caller joins it;
//! 2. nothing is cached and the request is not an initial acquisition, so the caller gets
//!    [`Error::LoginRequired`] without any network traffic;
//! 3. the cached credential is still valid and no refresh was forced, so it is returned;
//! 4. otherwise exactly one refresh is started and every caller shares its outcome.
//!
//! Refreshes run as detached `tokio` tasks and publish their outcome through a watch channel,
//! so dropping every waiter never cancels the outbound call. Successful refreshes replace the
//! cached credential and are persisted best-effort; failures leave the cached credential in
//! place. [`Coordinator::clear`] drops both the in-memory and persisted credential and wins
//! over any refresh that was requested before it.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::io;
// crates.io
use tokio::{runtime::Handle, sync::watch};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	classify,
	endpoint::Endpoint,
	error::ConfigError,
	http::{HttpRequest, TokenHttpClient},
	obs::{self, CoordinatorSpan, ObtainOutcome, SpanKind},
	store::{CredentialStore, StoreKey},
};

type Outcome = Option<Result<Credential>>;

/// Parameters for a single [`Coordinator::obtain`] call.
#[derive(Clone, Debug)]
pub struct ObtainRequest {
	/// Token endpoint used when a refresh is needed.
	pub endpoint: Endpoint,
	/// Allows a refresh even though no credential is cached (first login).
	pub initial_acquisition: bool,
	/// Bypasses the cached credential even when it is still valid.
	pub force: bool,
}
impl ObtainRequest {
	/// Creates a request that serves cached credentials and refreshes expired ones.
	pub fn new(endpoint: Endpoint) -> Self {
		Self { endpoint, initial_acquisition: false, force: false }
	}

	/// Permits a refresh when no credential is cached yet.
	pub fn initial_acquisition(mut self) -> Self {
		self.initial_acquisition = true;

		self
	}

	/// Overrides the initial acquisition flag.
	pub fn with_initial_acquisition(mut self, initial_acquisition: bool) -> Self {
		self.initial_acquisition = initial_acquisition;

		self
	}

	/// Forces the coordinator to bypass the cached credential.
	pub fn force_refresh(mut self) -> Self {
		self.force = true;

		self
	}

	/// Overrides the force flag.
	pub fn with_force(mut self, force: bool) -> Self {
		self.force = force;

		self
	}
}

/// Result of the coordinator's decision for one request.
#[derive(Debug)]
pub enum Obtained {
	/// The cached credential is valid and was returned without a network call.
	Cached(Credential),
	/// The caller shares the outcome of an in-flight refresh.
	Pending(RefreshHandle),
}
impl Obtained {
	/// Resolves to the credential, waiting on the shared refresh when necessary.
	pub async fn resolve(self) -> Result<Credential> {
		match self {
			Obtained::Cached(credential) => Ok(credential),
			Obtained::Pending(handle) => handle.wait().await,
		}
	}
}

/// Shared view of one refresh outcome.
///
/// Every handle for the same refresh resolves to the identical value, whether the handle was
/// created by the caller that started the refresh or by one that joined it later.
#[derive(Clone, Debug)]
pub struct RefreshHandle {
	rx: watch::Receiver<Outcome>,
}
impl RefreshHandle {
	/// Returns the outcome if the refresh already finished.
	pub fn outcome(&self) -> Option<Result<Credential>> {
		self.rx.borrow().clone()
	}

	/// Waits for the refresh to finish.
	///
	/// A refresh task that ends without publishing an outcome resolves as
	/// [`Error::NetworkFailure`].
	pub async fn wait(mut self) -> Result<Credential> {
		let published = match self.rx.wait_for(Option::is_some).await {
			Ok(outcome) => outcome.clone(),
			Err(_) => None,
		};

		published.unwrap_or_else(|| {
			let err = abandoned();

			obs::refresh_abandoned(&err);

			Err(err)
		})
	}
}

struct InFlight {
	id: u64,
	rx: watch::Receiver<Outcome>,
}
impl InFlight {
	// The sender is only dropped without clearing `in_flight` when the task died.
	fn is_alive(&self) -> bool {
		self.rx.has_changed().is_ok()
	}
}

#[derive(Default)]
struct State {
	current: Option<Credential>,
	in_flight: Option<InFlight>,
	// Refresh detached by `clear()` that may still be talking to the endpoint.
	detached: Option<InFlight>,
	generation: u64,
	next_refresh_id: u64,
}

struct Inner<C>
where
	C: ?Sized,
{
	store: Arc<dyn CredentialStore>,
	key: StoreKey,
	http_client: Arc<C>,
	state: Mutex<State>,
	persist_guard: AsyncMutex<()>,
	refresh_metrics: Arc<RefreshMetrics>,
}

/// Owns the cached credential for one [`StoreKey`] and serializes every refresh of it.
///
/// The coordinator is cheap to clone; clones share the same state, so concurrent callers on
/// any clone observe the single-flight guarantee.
pub struct Coordinator<C>
where
	C: ?Sized + TokenHttpClient,
{
	inner: Arc<Inner<C>>,
}
impl<C> Coordinator<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a coordinator, seeding the cache from the credential persisted under `key`.
	///
	/// A missing or undecodable blob is not an error; the coordinator simply starts without a
	/// credential.
	pub async fn load(
		store: Arc<dyn CredentialStore>,
		key: StoreKey,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let current = match store.read(&key).await {
			Ok(Some(blob)) => Credential::from_blob(&blob).inspect_err(obs::load_failed).ok(),
			Ok(None) => None,
			Err(err) => {
				obs::load_failed(&err);

				None
			},
		};

		Self::with_credential(store, key, http_client, current)
	}

	/// Creates a coordinator with an explicit initial credential, skipping the store read.
	pub fn with_credential(
		store: Arc<dyn CredentialStore>,
		key: StoreKey,
		http_client: impl Into<Arc<C>>,
		current: Option<Credential>,
	) -> Self {
		let state = State { current, ..Default::default() };

		Self {
			inner: Arc::new(Inner {
				store,
				key,
				http_client: http_client.into(),
				state: Mutex::new(state),
				persist_guard: AsyncMutex::new(()),
				refresh_metrics: Default::default(),
			}),
		}
	}

	/// Returns a valid credential, refreshing it at most once across concurrent callers.
	///
	/// Starting a refresh outside a `tokio` runtime fails with [`ConfigError::MissingRuntime`].
	pub async fn obtain(&self, request: ObtainRequest) -> Result<Credential> {
		let span = CoordinatorSpan::new(SpanKind::Obtain, &self.inner.key, "obtain");

		span.instrument(async move { self.begin(&request)?.resolve().await }).await
	}

	/// Runs the decision step of [`Coordinator::obtain`] without waiting on a refresh.
	///
	/// A refresh started here keeps running even if the returned handle is dropped. If a
	/// refresh detached by [`Coordinator::clear`] is still running, the new one holds its
	/// outbound call until the detached one has finished.
	pub fn begin(&self, request: &ObtainRequest) -> Result<Obtained> {
		let _span = CoordinatorSpan::new(SpanKind::Obtain, &self.inner.key, "begin").entered();
		let mut state = self.inner.state.lock();

		if let Some(in_flight) = state.in_flight.as_ref() {
			if in_flight.is_alive() {
				let handle = RefreshHandle { rx: in_flight.rx.clone() };

				self.inner.refresh_metrics.record_join();
				note(ObtainOutcome::Joined);

				return Ok(Obtained::Pending(handle));
			}

			state.in_flight = None;
		}

		match state.current.as_ref() {
			None if !request.initial_acquisition => {
				note(ObtainOutcome::LoginRequired);

				return Err(Error::LoginRequired);
			},
			Some(current) if !request.force && current.is_valid() => {
				note(ObtainOutcome::CacheHit);

				return Ok(Obtained::Cached(current.clone()));
			},
			_ => {},
		}

		let refresh_token = state.current.as_ref().map(|current| current.refresh_token().expose());
		let http_request = request.endpoint.request(refresh_token).map_err(|err| {
			note(ObtainOutcome::InvalidEndpoint);

			Error::from(err)
		})?;
		let runtime = Handle::try_current().map_err(|_| {
			note(ObtainOutcome::MissingRuntime);

			Error::from(ConfigError::MissingRuntime)
		})?;
		let predecessor =
			state.detached.take().filter(InFlight::is_alive).map(|detached| detached.rx);
		let (tx, rx) = watch::channel(None);
		let id = state.next_refresh_id;

		state.next_refresh_id += 1;
		state.in_flight = Some(InFlight { id, rx: rx.clone() });

		let generation = state.generation;

		drop(state);

		self.inner.refresh_metrics.record_attempt();
		note(ObtainOutcome::RefreshStarted);

		let refresh = Refresh {
			inner: self.inner.clone(),
			endpoint: request.endpoint.clone(),
			request: http_request,
			predecessor,
			id,
			generation,
		};

		runtime.spawn(refresh.run(tx));

		Ok(Obtained::Pending(RefreshHandle { rx }))
	}

	/// Drops the cached credential and deletes the persisted one (logout).
	///
	/// A refresh requested before this call still resolves its waiters but no longer updates
	/// the cache or the store. A refresh started afterwards waits for it to finish before
	/// calling the endpoint. Store failures are logged and otherwise ignored.
	pub async fn clear(&self) {
		let span = CoordinatorSpan::new(SpanKind::Clear, &self.inner.key, "clear");

		span.instrument(async move {
			let _persist = self.inner.persist_guard.lock().await;

			{
				let mut state = self.inner.state.lock();

				state.generation += 1;
				state.current = None;

				if let Some(in_flight) = state.in_flight.take().filter(InFlight::is_alive) {
					state.detached = Some(in_flight);
				}
			}

			if let Err(err) = self.inner.store.delete(&self.inner.key).await {
				obs::persistence_failed("delete", &err);
			}
		})
		.await
	}

	/// Snapshot of the cached credential, valid or not.
	pub fn current(&self) -> Option<Credential> {
		self.inner.state.lock().current.clone()
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.inner.state.lock().in_flight.as_ref().is_some_and(InFlight::is_alive)
	}

	/// Refresh counters shared by every clone of this coordinator.
	pub fn refresh_metrics(&self) -> Arc<RefreshMetrics> {
		self.inner.refresh_metrics.clone()
	}

	/// Key under which the credential is persisted.
	pub fn store_key(&self) -> &StoreKey {
		&self.inner.key
	}
}
impl<C> Clone for Coordinator<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<C> Debug for Coordinator<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Coordinator")
			.field("key", &self.inner.key)
			.field("refreshing", &self.is_refreshing())
			.finish_non_exhaustive()
	}
}

struct Refresh<C>
where
	C: ?Sized + TokenHttpClient,
{
	inner: Arc<Inner<C>>,
	endpoint: Endpoint,
	request: HttpRequest,
	// Detached refresh that must finish before this one calls the endpoint.
	predecessor: Option<watch::Receiver<Outcome>>,
	id: u64,
	generation: u64,
}
impl<C> Refresh<C>
where
	C: ?Sized + TokenHttpClient,
{
	async fn run(mut self, tx: watch::Sender<Outcome>) {
		let span = CoordinatorSpan::new(SpanKind::Refresh, &self.inner.key, "run");

		span.instrument(async move {
			if let Some(mut predecessor) = self.predecessor.take() {
				// A closed channel means the detached task is gone, which is just as final.
				let _ = predecessor.wait_for(Option::is_some).await;
			}

			let response = self.inner.http_client.execute(self.request.clone()).await;
			let outcome = classify::classify_outcome(&self.endpoint, response);

			match &outcome {
				Ok(_) => {
					self.inner.refresh_metrics.record_success();
					note(ObtainOutcome::Refreshed);
				},
				Err(_) => {
					self.inner.refresh_metrics.record_failure();
					note(ObtainOutcome::RefreshFailed);
				},
			}

			self.settle(outcome, &tx).await;
		})
		.await
	}

	// Waiters are released before the store write; the persist guard stays held until the
	// write finishes so `clear()` and later refreshes observe writes in order.
	async fn settle(&self, outcome: Result<Credential>, tx: &watch::Sender<Outcome>) {
		let _persist = self.inner.persist_guard.lock().await;
		let persist = {
			let mut state = self.inner.state.lock();

			if state.in_flight.as_ref().is_some_and(|in_flight| in_flight.id == self.id) {
				state.in_flight = None;
			}
			if state.detached.as_ref().is_some_and(|detached| detached.id == self.id) {
				state.detached = None;
			}

			if state.generation != self.generation {
				obs::refresh_superseded();

				None
			} else if let Ok(credential) = &outcome {
				state.current = Some(credential.clone());

				Some(credential.clone())
			} else {
				None
			}
		};

		tx.send_replace(Some(outcome));

		let Some(credential) = persist else {
			return;
		};
		let written = match credential.to_blob() {
			Ok(blob) => self.inner.store.write(&self.inner.key, blob).await,
			Err(err) => Err(err),
		};

		if let Err(err) = written {
			obs::persistence_failed("write", &err);
		}
	}
}

fn note(outcome: ObtainOutcome) {
	obs::decision(outcome);
	obs::record_obtain_outcome(outcome);
}

fn abandoned() -> Error {
	Error::network(io::Error::other("Refresh task ended before publishing an outcome."))
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// crates.io
	use oauth2::http::StatusCode;
	use tokio::sync::Notify;
	// self
	use super::*;
	use crate::{
		auth::{AccountId, ServiceId},
		http::{HttpClientError, HttpFuture, HttpResponse},
		store::{MemoryStore, StoreError, StoreFuture},
	};

	#[derive(Default)]
	struct ScriptedTransport {
		calls: AtomicUsize,
		responses: Mutex<VecDeque<(u16, String)>>,
		gate: Option<Arc<Notify>>,
		seen_uris: Mutex<Vec<String>>,
	}
	impl ScriptedTransport {
		fn replying(status: u16, body: &str) -> Self {
			let transport = Self::default();

			transport.responses.lock().push_back((status, body.into()));

			transport
		}

		fn gated(mut self, gate: Arc<Notify>) -> Self {
			self.gate = Some(gate);

			self
		}
	}
	impl TokenHttpClient for ScriptedTransport {
		type TransportError = io::Error;

		fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.seen_uris.lock().push(request.uri().to_string());

			Box::pin(async move {
				if let Some(gate) = &self.gate {
					gate.notified().await;
				}

				let (status, body) = self
					.responses
					.lock()
					.pop_front()
					.ok_or_else(|| HttpClientError::Other("No scripted response left.".into()))?;
				let mut response = HttpResponse::new(body.into_bytes());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Scripted status should be valid.");

				Ok(response)
			})
		}
	}

	struct FailingStore;
	impl CredentialStore for FailingStore {
		fn read<'a>(&'a self, _: &'a StoreKey) -> StoreFuture<'a, Option<Vec<u8>>> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}

		fn write<'a>(&'a self, _: &'a StoreKey, _: Vec<u8>) -> StoreFuture<'a, ()> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}

		fn delete<'a>(&'a self, _: &'a StoreKey) -> StoreFuture<'a, bool> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}
	}

	struct GatedStore {
		inner: MemoryStore,
		gate: Arc<Notify>,
	}
	impl CredentialStore for GatedStore {
		fn read<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Vec<u8>>> {
			self.inner.read(key)
		}

		fn write<'a>(&'a self, key: &'a StoreKey, blob: Vec<u8>) -> StoreFuture<'a, ()> {
			Box::pin(async move {
				self.gate.notified().await;
				self.inner.write(key, blob).await
			})
		}

		fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, bool> {
			self.inner.delete(key)
		}
	}

	const TOKEN_BODY: &str = r#"{"access_token":"a-new","refresh_token":"r-new","expires_in":3600}"#;

	fn key() -> StoreKey {
		StoreKey::new(
			ServiceId::new("svc").expect("Service fixture should be valid."),
			AccountId::new("acct").expect("Account fixture should be valid."),
		)
	}

	fn endpoint() -> Endpoint {
		Endpoint::builder("auth.example.com")
			.path("/token")
			.build()
			.expect("Endpoint fixture should build.")
	}

	fn expired() -> Credential {
		Credential::issued_now("a-old", "r-old", Duration::seconds(-10))
	}

	fn coordinator_with(
		store: Arc<dyn CredentialStore>,
		transport: Arc<ScriptedTransport>,
		current: Option<Credential>,
	) -> Coordinator<ScriptedTransport> {
		Coordinator::with_credential(store, key(), transport, current)
	}

	#[tokio::test]
	async fn begin_joins_the_in_flight_refresh() {
		let gate = Arc::new(Notify::new());
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY).gated(gate.clone()));
		let coordinator =
			coordinator_with(Arc::new(MemoryStore::default()), transport.clone(), Some(expired()));
		let first = coordinator.begin(&ObtainRequest::new(endpoint())).expect("Refresh starts.");

		assert!(coordinator.is_refreshing());

		let second = coordinator
			.begin(&ObtainRequest::new(endpoint()).force_refresh())
			.expect("Caller joins.");

		assert!(matches!(second, Obtained::Pending(_)));
		assert_eq!(coordinator.refresh_metrics().joins(), 1);

		gate.notify_one();

		let first = first.resolve().await.expect("Refresh should succeed.");
		let second = second.resolve().await.expect("Joined caller should succeed.");

		assert_eq!(first, second);
		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
		assert!(!coordinator.is_refreshing());
		assert_eq!(coordinator.current(), Some(first));
	}

	#[tokio::test]
	async fn refresh_sends_current_refresh_token() {
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY));
		let coordinator =
			coordinator_with(Arc::new(MemoryStore::default()), transport.clone(), Some(expired()));

		coordinator.obtain(ObtainRequest::new(endpoint())).await.expect("Refresh should succeed.");

		assert_eq!(
			transport.seen_uris.lock().clone(),
			vec!["https://auth.example.com/token?refresh_token=r-old".to_string()]
		);
	}

	#[tokio::test]
	async fn clear_wins_over_a_refresh_requested_earlier() {
		let gate = Arc::new(Notify::new());
		let store = Arc::new(MemoryStore::default());
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY).gated(gate.clone()));
		let coordinator = coordinator_with(store.clone(), transport, Some(expired()));
		let pending = coordinator.begin(&ObtainRequest::new(endpoint())).expect("Refresh starts.");

		coordinator.clear().await;
		gate.notify_one();

		let refreshed = pending.resolve().await.expect("Waiter still receives the outcome.");

		assert_eq!(refreshed.access_token().expose(), "a-new");
		assert_eq!(coordinator.current(), None);
		assert!(store.is_empty());
		assert_eq!(
			coordinator.obtain(ObtainRequest::new(endpoint())).await,
			Err(Error::LoginRequired)
		);
	}

	#[tokio::test]
	async fn refresh_after_clear_waits_for_the_detached_one() {
		let gate = Arc::new(Notify::new());
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY).gated(gate.clone()));

		transport.responses.lock().push_back((
			200,
			r#"{"access_token":"a-login","refresh_token":"r-login","expires_in":3600}"#.into(),
		));

		let coordinator =
			coordinator_with(Arc::new(MemoryStore::default()), transport.clone(), Some(expired()));
		let detached = coordinator.begin(&ObtainRequest::new(endpoint())).expect("Refresh starts.");

		while transport.calls.load(Ordering::SeqCst) == 0 {
			tokio::task::yield_now().await;
		}

		coordinator.clear().await;

		let login = coordinator
			.begin(&ObtainRequest::new(endpoint()).initial_acquisition())
			.expect("Initial acquisition starts a refresh.");

		for _ in 0..16 {
			tokio::task::yield_now().await;
		}

		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
		assert!(coordinator.is_refreshing());

		gate.notify_one();

		let detached = detached.resolve().await.expect("Detached refresh still resolves.");

		assert_eq!(detached.access_token().expose(), "a-new");
		assert_eq!(coordinator.current(), None);

		gate.notify_one();

		let login = login.resolve().await.expect("Initial acquisition should succeed.");

		assert_eq!(login.access_token().expose(), "a-login");
		assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
		assert_eq!(
			transport.seen_uris.lock().last().cloned(),
			Some("https://auth.example.com/token".to_string())
		);
		assert_eq!(coordinator.current(), Some(login));
	}

	#[tokio::test]
	async fn waiters_are_released_before_the_store_write() {
		let gate = Arc::new(Notify::new());
		let store = Arc::new(GatedStore { inner: MemoryStore::default(), gate: gate.clone() });
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY));
		let coordinator = coordinator_with(store.clone(), transport, Some(expired()));
		let credential = tokio::time::timeout(
			std::time::Duration::from_secs(5),
			coordinator.obtain(ObtainRequest::new(endpoint())),
		)
		.await
		.expect("A blocked store write must not hold back waiters.")
		.expect("Refresh should succeed.");

		assert_eq!(coordinator.current(), Some(credential.clone()));
		assert!(store.inner.is_empty());

		gate.notify_one();
		drop(coordinator.inner.persist_guard.lock().await);

		let blob = store
			.inner
			.read(&key())
			.await
			.expect("Memory store reads never fail.")
			.expect("The credential should be persisted once the write completes.");

		assert_eq!(Credential::from_blob(&blob).expect("Blob should decode."), credential);
	}

	#[test]
	fn refresh_outside_a_runtime_is_a_config_error() {
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY));
		let coordinator =
			coordinator_with(Arc::new(MemoryStore::default()), transport.clone(), Some(expired()));
		let err = coordinator
			.begin(&ObtainRequest::new(endpoint()))
			.expect_err("A refresh cannot start without a runtime.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRuntime)));
		assert!(!err.should_retry());
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
		assert!(!coordinator.is_refreshing());

		let valid = Credential::issued_now("a-valid", "r-valid", Duration::hours(1));
		let cached = coordinator_with(Arc::new(MemoryStore::default()), transport, Some(valid))
			.begin(&ObtainRequest::new(endpoint()))
			.expect("Cache hits need no runtime.");

		assert!(matches!(cached, Obtained::Cached(_)));
	}

	#[tokio::test]
	async fn invalid_endpoint_fails_without_starting_a_refresh() {
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY));
		let mut endpoint = endpoint();

		endpoint.headers.push(("bad header".into(), "value".into()));

		let coordinator =
			coordinator_with(Arc::new(MemoryStore::default()), transport.clone(), Some(expired()));
		let err = coordinator
			.obtain(ObtainRequest::new(endpoint))
			.await
			.expect_err("Invalid header must fail locally.");

		assert!(matches!(err, Error::Config(_)));
		assert!(!err.should_retry());
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
		assert!(!coordinator.is_refreshing());
	}

	#[tokio::test]
	async fn store_failures_never_fail_callers() {
		let transport = Arc::new(ScriptedTransport::replying(200, TOKEN_BODY));
		let coordinator: Coordinator<ScriptedTransport> =
			Coordinator::load(Arc::new(FailingStore), key(), transport).await;

		assert_eq!(coordinator.current(), None);

		let credential = coordinator
			.obtain(ObtainRequest::new(endpoint()).initial_acquisition())
			.await
			.expect("Refresh should succeed despite the store.");

		assert_eq!(coordinator.current(), Some(credential));

		coordinator.clear().await;

		assert_eq!(coordinator.current(), None);
	}

	#[tokio::test]
	async fn dead_refresh_task_resolves_as_network_failure() {
		let (tx, rx) = watch::channel::<Outcome>(None);

		drop(tx);

		let err = RefreshHandle { rx }.wait().await.expect_err("Abandoned refresh must fail.");

		assert!(matches!(err, Error::NetworkFailure { .. }));
		assert!(err.should_retry());
	}
}
