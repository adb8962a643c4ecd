// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreKey},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Coordinator activities that get their own span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
	/// A caller asking for a valid credential.
	Obtain,
	/// The detached refresh task.
	Refresh,
	/// Logout.
	Clear,
}

/// A span builder used by coordinator operations.
#[derive(Clone, Debug)]
pub struct CoordinatorSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CoordinatorSpan {
	/// Creates a new span for `kind`, tagged with the store key and call site.
	pub fn new(kind: SpanKind, key: &StoreKey, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = match kind {
				SpanKind::Obtain =>
					tracing::info_span!("bearer_coordinator.obtain", key = %key, stage),
				SpanKind::Refresh =>
					tracing::info_span!("bearer_coordinator.refresh", key = %key, stage),
				SpanKind::Clear => tracing::info_span!("bearer_coordinator.clear", key = %key, stage),
			};

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, key, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> CoordinatorSpanGuard {
		#[cfg(feature = "tracing")]
		{
			CoordinatorSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			CoordinatorSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`CoordinatorSpan::entered`].
pub struct CoordinatorSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for CoordinatorSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CoordinatorSpanGuard(..)")
	}
}

/// Logs the decision taken by `obtain`.
pub fn decision(outcome: crate::obs::ObtainOutcome) {
	#[cfg(feature = "tracing")]
	tracing::debug!(outcome = outcome.as_str(), "Coordinator decision.");
	#[cfg(not(feature = "tracing"))]
	let _ = outcome;
}

/// Logs a stored credential that could not be read or decoded at construction.
pub fn load_failed(err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %err, "Ignoring unreadable persisted credential.");
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}

/// Logs a best-effort persistence failure that did not affect the caller's result.
pub fn persistence_failed(operation: &'static str, err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(operation, error = %err, "Credential persistence failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (operation, err);
}

/// Logs a refresh whose result was discarded because `clear` ran after it started.
pub fn refresh_superseded() {
	#[cfg(feature = "tracing")]
	tracing::debug!("Refresh finished after the credential was cleared; result not stored.");
}

/// Logs a refresh task that ended without publishing an outcome.
pub fn refresh_abandoned(err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %err, "Refresh task ended without publishing an outcome.");
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}

/// Logs the protocol violation behind a non-HTTP response classification.
pub fn non_http_response(err: &oauth2::http::Error) {
	#[cfg(feature = "tracing")]
	tracing::debug!(error = %err, "Transport response is not a valid HTTP response.");
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}
