//! Attempt-and-retry orchestration for ticks-protected operations.
//!
//! A cached ticks value can go stale without any client-visible signal; the
//! only tell is the dependent request failing classification. The driver
//! therefore runs `FirstAttempt → {Success | NeedsRefresh} → SecondAttempt →
//! {Success | Failed}`: one forced refresh, one redispatch, nothing further.
//! The staleness window is short enough that a single refresh resolves it, so
//! there is no backoff and no jitter. Transport errors are propagated as-is
//! and never retried; only a semantic "request did not succeed" outcome is.

// self
use crate::{
	_prelude::*,
	auth::SubjectName,
	client::{FileHost, ops::OpKind},
	http::{Response, WebRequest},
	obs::{self, OpOutcome, OpSpan},
};

impl FileHost {
	/// Dispatches a ticks-protected operation, retrying exactly once after a
	/// forced ticks refresh when the first response fails classification.
	///
	/// `build` receives the current ticks value and assembles the request; it is
	/// invoked once per attempt so the retry carries the refreshed token. The
	/// final failure surfaces as [`Error::RequestFailed`] with the last status.
	pub async fn perform_with_retry<B>(
		&self,
		operation: OpKind,
		subject: &SubjectName,
		build: B,
	) -> Result<Response>
	where
		B: Fn(&str) -> WebRequest,
	{
		let span = OpSpan::new(operation, "perform_with_retry");

		obs::record_op_outcome(operation, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let shape = operation.expected_shape();
				let ticks = self.ticks.get(subject, false).await?;
				let first = self.dispatcher.send(build(&ticks)).await.map_err(Error::from)?;

				if shape.classify(&first) {
					return Ok(first);
				}

				obs::record_op_outcome(operation, OpOutcome::Retry);

				let ticks = self.ticks.get(subject, true).await?;
				let second = self.dispatcher.send(build(&ticks)).await.map_err(Error::from)?;

				if shape.classify(&second) {
					return Ok(second);
				}

				Err(Error::RequestFailed { operation, status: second.status(), attempts: 2 })
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(operation, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(operation, OpOutcome::Failure),
		}

		result
	}

	/// Dispatches an operation whose credential (if any) is fetched fresh per
	/// call, so a second attempt is never warranted; a classification failure is
	/// reported immediately.
	pub(crate) async fn perform_once(
		&self,
		operation: OpKind,
		request: WebRequest,
	) -> Result<Response> {
		let span = OpSpan::new(operation, "perform_once");

		obs::record_op_outcome(operation, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let response = self.dispatcher.send(request).await.map_err(Error::from)?;

				if operation.expected_shape().classify(&response) {
					Ok(response)
				} else {
					Err(Error::RequestFailed {
						operation,
						status: response.status(),
						attempts: 1,
					})
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(operation, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(operation, OpOutcome::Failure),
		}

		result
	}
}
