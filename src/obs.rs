//! Optional observability helpers for the coordinator.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `bearer_coordinator.obtain` and
//!   `bearer_coordinator.refresh` (with a `stage` field) plus warn/debug events for
//!   persistence problems and decisions.
//! - Enable `metrics` to increment the `bearer_coordinator_obtain_total` counter for every
//!   decision and refresh completion, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for coordinator decisions and refresh completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObtainOutcome {
	/// A valid cached credential was returned.
	CacheHit,
	/// The caller joined an in-flight refresh.
	Joined,
	/// No credential exists and initial acquisition was not allowed.
	LoginRequired,
	/// The endpoint descriptor could not produce a request.
	InvalidEndpoint,
	/// A refresh was needed outside a `tokio` runtime.
	MissingRuntime,
	/// A new refresh was started.
	RefreshStarted,
	/// A refresh completed with a new credential.
	Refreshed,
	/// A refresh completed with a classified error.
	RefreshFailed,
}
impl ObtainOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ObtainOutcome::CacheHit => "cache_hit",
			ObtainOutcome::Joined => "joined",
			ObtainOutcome::LoginRequired => "login_required",
			ObtainOutcome::InvalidEndpoint => "invalid_endpoint",
			ObtainOutcome::MissingRuntime => "missing_runtime",
			ObtainOutcome::RefreshStarted => "refresh_started",
			ObtainOutcome::Refreshed => "refreshed",
			ObtainOutcome::RefreshFailed => "refresh_failed",
		}
	}
}
impl Display for ObtainOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
