// self
use crate::obs::ObtainOutcome;

/// Records a decision or refresh outcome via the global metrics recorder (when enabled).
pub fn record_obtain_outcome(outcome: ObtainOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("bearer_coordinator_obtain_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
