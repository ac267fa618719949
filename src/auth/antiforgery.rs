//! Anti-forgery token scraping for mutating operations.
//!
//! The site embeds a one-time `__RequestVerificationToken` in every profile
//! page and requires it on mutating form posts. The token is single-use, so
//! there is no cache here: every call fetches a fresh page. Extraction is a
//! deliberately isolated regex so the strategy can be swapped for a structured
//! markup query without touching any caller.

// crates.io
use regex::Regex;
// self
use crate::{
	_prelude::*,
	auth::SubjectName,
	error::ConfigError,
	http::{REQUESTED_WITH_HEADER, RequestDispatcher, WebRequest},
};

/// Form field and markup attribute name carrying the anti-forgery token.
pub const ANTI_FORGERY_FIELD: &str = "__RequestVerificationToken";

/// Fetches one-time anti-forgery tokens by scraping the subject's public
/// profile page.
pub struct AntiForgeryTokenFetcher {
	dispatcher: Arc<dyn RequestDispatcher>,
	base: Url,
	pattern: Regex,
}
impl AntiForgeryTokenFetcher {
	/// Creates a fetcher for the provided site base URL.
	pub fn new(dispatcher: Arc<dyn RequestDispatcher>, base: Url) -> Result<Self, ConfigError> {
		// Non-greedy across intervening attributes; the token input's `value`
		// attribute does not directly follow the name in the served markup.
		let pattern = Regex::new(&format!(r#"{ANTI_FORGERY_FIELD}.*?value="([^"]*)""#))
			.map_err(|source| ConfigError::InvalidPattern { source })?;

		Ok(Self { dispatcher, base, pattern })
	}

	/// Fetches a fresh token for `subject`, failing with
	/// [`Error::TokenNotFound`] when the page carries none.
	///
	/// The profile page renders the token only for plain browser navigation, so
	/// the request goes out with the client's AJAX marker header suppressed.
	pub async fn fetch(&self, subject: &SubjectName) -> Result<String> {
		let url = self
			.base
			.join(subject.as_ref())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let request = WebRequest::get(url).without_default_header(REQUESTED_WITH_HEADER);
		let response = self.dispatcher.send(request).await.map_err(Error::from)?;

		self.extract(&response.text())
			.ok_or_else(|| Error::TokenNotFound { subject: subject.clone() })
	}

	/// Scans `markup` for the token value; empty captures count as absent.
	fn extract(&self, markup: &str) -> Option<String> {
		let value = self.pattern.captures(markup)?.get(1)?.as_str();

		if value.is_empty() { None } else { Some(value.to_owned()) }
	}
}
impl Debug for AntiForgeryTokenFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AntiForgeryTokenFetcher").field("base", &self.base.as_str()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{DispatchFuture, Response};

	struct StaticPage(&'static str);
	impl RequestDispatcher for StaticPage {
		fn send(&self, _: WebRequest) -> DispatchFuture<'_> {
			let body = self.0.as_bytes().to_vec();

			Box::pin(async move { Ok(Response::new(200, body)) })
		}
	}

	fn fetcher(page: &'static str) -> AntiForgeryTokenFetcher {
		AntiForgeryTokenFetcher::new(
			Arc::new(StaticPage(page)),
			Url::parse("https://files.example/").expect("Fixture URL should parse."),
		)
		.expect("Fetcher fixture should build.")
	}

	fn subject() -> SubjectName {
		SubjectName::new("alice").expect("Subject fixture should be valid.")
	}

	#[tokio::test]
	async fn extracts_the_token_across_intervening_attributes() {
		let page = r#"<input name="__RequestVerificationToken" type="hidden" value="abc123" />"#;
		let token = fetcher(page).fetch(&subject()).await.expect("Extraction should succeed.");

		assert_eq!(token, "abc123");
	}

	#[tokio::test]
	async fn missing_token_fails_with_token_not_found() {
		let err = fetcher("<html><body>no token here</body></html>")
			.fetch(&subject())
			.await
			.expect_err("Extraction should fail without a token input.");

		assert!(matches!(err, Error::TokenNotFound { .. }));
	}

	#[tokio::test]
	async fn empty_capture_counts_as_extraction_failure() {
		let page = r#"<input name="__RequestVerificationToken" type="hidden" value="" />"#;
		let err = fetcher(page)
			.fetch(&subject())
			.await
			.expect_err("Empty token values should be rejected.");

		assert!(matches!(err, Error::TokenNotFound { .. }));
	}

	#[test]
	fn extraction_is_non_greedy_across_inputs() {
		let page = concat!(
			r#"<input name="__RequestVerificationToken" id="t" value="first" />"#,
			r#"<input name="other" value="second" />"#,
		);

		assert_eq!(fetcher(page).extract(page).as_deref(), Some("first"));
	}
}
