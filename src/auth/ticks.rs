//! Time-bound "ticks" tokens authorizing tree-listing calls.
//!
//! The site requires a short-lived opaque value on listing requests and never
//! tells the client when it expires: the only signal is the dependent request
//! failing. The provider therefore never decides staleness itself; it caches
//! one value per subject and refreshes only on a miss or when the caller forces
//! it after observing a failure (see
//! [`FileHost::perform_with_retry`](crate::client::FileHost::perform_with_retry)).

// crates.io
use regex::Regex;
// self
use crate::{
	_prelude::*,
	auth::SubjectName,
	error::ConfigError,
	http::{RequestDispatcher, WebRequest},
};

/// Boxed future returned by [`TicksSource::mint`].
pub type TicksFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

/// Collaborator that mints a fresh ticks value for a subject.
pub trait TicksSource: Send + Sync {
	/// Obtains a brand-new ticks value, bypassing any cache.
	fn mint<'a>(&'a self, subject: &'a SubjectName) -> TicksFuture<'a>;
}

/// One cached ticks value together with the instant it was minted.
///
/// The instant is diagnostic only; the provider never uses it to expire the
/// entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedTicks {
	/// Opaque ticks value as served by the site.
	pub value: String,
	/// When the value was stored.
	pub refreshed_at: OffsetDateTime,
}

/// Per-subject cache over a [`TicksSource`].
pub struct TicksProvider {
	cache: RwLock<HashMap<SubjectName, CachedTicks>>,
	source: Arc<dyn TicksSource>,
}
impl TicksProvider {
	/// Creates a provider backed by `source`.
	pub fn new(source: Arc<dyn TicksSource>) -> Self {
		Self { cache: RwLock::new(HashMap::new()), source }
	}

	/// Returns the ticks value for `subject`.
	///
	/// A cache hit returns without any network traffic unless `force_refresh`
	/// is set, in which case the source mints a new value and the cache entry is
	/// overwritten.
	pub async fn get(&self, subject: &SubjectName, force_refresh: bool) -> Result<String> {
		if !force_refresh
			&& let Some(entry) = self.cache.read().get(subject)
		{
			return Ok(entry.value.clone());
		}

		let value = self.source.mint(subject).await?;

		self.cache.write().insert(
			subject.clone(),
			CachedTicks { value: value.clone(), refreshed_at: OffsetDateTime::now_utc() },
		);

		Ok(value)
	}

	/// Returns the cached entry for `subject`, if any, without refreshing.
	pub fn cached(&self, subject: &SubjectName) -> Option<CachedTicks> {
		self.cache.read().get(subject).cloned()
	}

	/// Drops the cached entry for `subject`; used when the session ends.
	pub fn invalidate(&self, subject: &SubjectName) {
		self.cache.write().remove(subject);
	}
}
impl Debug for TicksProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TicksProvider").field("cached_subjects", &self.cache.read().len()).finish()
	}
}

/// Default [`TicksSource`] scraping the ticks value from the subject's folder
/// page, in the same style as the anti-forgery fetcher.
pub struct PageTicksSource {
	dispatcher: Arc<dyn RequestDispatcher>,
	base: Url,
	pattern: Regex,
}
impl PageTicksSource {
	/// Creates a source for the provided site base URL.
	pub fn new(dispatcher: Arc<dyn RequestDispatcher>, base: Url) -> Result<Self, ConfigError> {
		let pattern = Regex::new(r#"name="ticks".*?value="([^"]*)""#)
			.map_err(|source| ConfigError::InvalidPattern { source })?;

		Ok(Self { dispatcher, base, pattern })
	}

	fn extract(&self, markup: &str) -> Option<String> {
		let value = self.pattern.captures(markup)?.get(1)?.as_str();

		if value.is_empty() { None } else { Some(value.to_owned()) }
	}
}
impl TicksSource for PageTicksSource {
	fn mint<'a>(&'a self, subject: &'a SubjectName) -> TicksFuture<'a> {
		Box::pin(async move {
			let url = self
				.base
				.join(subject.as_ref())
				.map_err(|source| ConfigError::InvalidEndpoint { source })?;
			let response = self.dispatcher.send(WebRequest::get(url)).await.map_err(Error::from)?;

			self.extract(&response.text())
				.ok_or_else(|| Error::TokenNotFound { subject: subject.clone() })
		})
	}
}
impl Debug for PageTicksSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PageTicksSource").field("base", &self.base.as_str()).finish()
	}
}
