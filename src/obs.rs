//! Optional observability for client operations.
//!
//! # Feature Flags
//!
//! - `tracing` wraps each operation in an `oauth2_idp.call` span carrying `operation` and
//!   `provider`; `outcome` and `error_kind` are recorded on the span once the call finishes.
//! - `metrics` increments `oauth2_idp_call_total` on entry and on completion, labeled by
//!   `operation`, `provider`, `outcome`, and `error_kind` (empty unless the call failed).
//!
//! Without either feature the helpers only run the wrapped operation.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Client operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Authorization redirect composition.
	Authorize,
	/// Grant exchange against the token endpoint.
	TokenExchange,
	/// Authenticated resource or profile fetch.
	ResourceFetch,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Authorize => "authorize",
			Operation::TokenExchange => "token_exchange",
			Operation::ResourceFetch => "resource_fetch",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stage or result recorded for a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller, tagged with [`Error::kind`].
	Failure(&'static str),
}
impl CallOutcome {
	/// Maps a finished call's result onto its outcome.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => CallOutcome::Success,
			Err(e) => CallOutcome::Failure(e.kind()),
		}
	}

	/// Returns the `outcome` label.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure(_) => "failure",
		}
	}

	/// Returns the `error_kind` label; empty unless the call failed.
	pub const fn error_kind(self) -> &'static str {
		match self {
			CallOutcome::Failure(kind) => kind,
			_ => "",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			CallOutcome::Failure(kind) => write!(f, "failure({kind})"),
			other => f.write_str(other.as_str()),
		}
	}
}

/// Runs an async operation under its span and records the attempt and the outcome.
pub(crate) async fn observe<T, Fut>(
	operation: Operation,
	provider: &ProviderId,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let call = Call::start(operation, provider);
	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(call.span.clone()).await
	};
	#[cfg(not(feature = "tracing"))]
	let result = fut.await;

	call.finish(CallOutcome::of(&result));

	result
}

/// Synchronous counterpart of [`observe`] for operations that cannot fail.
pub(crate) fn observe_infallible<T>(
	operation: Operation,
	provider: &ProviderId,
	f: impl FnOnce() -> T,
) -> T {
	let call = Call::start(operation, provider);
	#[cfg(feature = "tracing")]
	let value = call.span.in_scope(f);
	#[cfg(not(feature = "tracing"))]
	let value = f();

	call.finish(CallOutcome::Success);

	value
}

struct Call<'a> {
	operation: Operation,
	provider: &'a ProviderId,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl<'a> Call<'a> {
	fn start(operation: Operation, provider: &'a ProviderId) -> Self {
		record(operation, provider, CallOutcome::Attempt);

		Self {
			operation,
			provider,
			#[cfg(feature = "tracing")]
			span: tracing::info_span!(
				"oauth2_idp.call",
				operation = operation.as_str(),
				provider = %provider,
				outcome = tracing::field::Empty,
				error_kind = tracing::field::Empty,
			),
		}
	}

	fn finish(&self, outcome: CallOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());

			if let CallOutcome::Failure(kind) = outcome {
				self.span.record("error_kind", kind);
			}
		}

		record(self.operation, self.provider, outcome);
	}
}

fn record(operation: Operation, provider: &ProviderId, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_idp_call_total",
			"operation" => operation.as_str(),
			"provider" => provider.to_string(),
			"outcome" => outcome.as_str(),
			"error_kind" => outcome.error_kind()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, provider, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn provider() -> ProviderId {
		ProviderId::new("acme").expect("Provider id should be valid.")
	}

	#[test]
	fn outcomes_carry_the_error_kind() {
		let failed: Result<()> = Err(Error::StateMismatch);
		let outcome = CallOutcome::of(&failed);

		assert_eq!(outcome, CallOutcome::Failure("state_mismatch"));
		assert_eq!(outcome.as_str(), "failure");
		assert_eq!(outcome.error_kind(), "state_mismatch");
		assert_eq!(outcome.to_string(), "failure(state_mismatch)");
		assert_eq!(CallOutcome::of(&Ok(())).error_kind(), "");
	}

	#[tokio::test]
	async fn observed_calls_return_the_wrapped_result() {
		let err = observe(Operation::TokenExchange, &provider(), async {
			Err::<(), _>(Error::UnknownGrantKind { name: "nope".into() })
		})
		.await
		.expect_err("Wrapped failures must pass through.");

		assert_eq!(err.kind(), "unknown_grant_kind");
		assert_eq!(observe_infallible(Operation::Authorize, &provider(), || 7), 7);
	}
}
