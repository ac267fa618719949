//! The high-level client tying the transport, token providers, and session
//! state together.

pub mod ops;

mod retry;

pub use ops::{OpKind, UploadTarget};

// self
use crate::{
	_prelude::*,
	auth::{
		AntiForgeryTokenFetcher, PageTicksSource, SessionState, SubjectName, TicksProvider,
		TicksSource,
	},
	error::ConfigError,
	http::RequestDispatcher,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestDispatcher;

/// Client for one file-hosting site instance.
///
/// The client owns the dispatcher, the per-subject ticks cache, the
/// anti-forgery fetcher, and the session state. It is `Send + Sync`; the ticks
/// cache and the session slot are internally locked, though the design still
/// assumes one logical session is driven through a given instance at a time.
pub struct FileHost {
	/// Transport collaborator used for every outbound request.
	dispatcher: Arc<dyn RequestDispatcher>,
	/// Per-subject time-bound token cache.
	ticks: TicksProvider,
	/// Anti-forgery token fetcher for mutating operations.
	antiforgery: AntiForgeryTokenFetcher,
	/// Explicit session value; never a bare nullable name.
	session: RwLock<SessionState>,
	/// Site base URL all endpoint paths are joined onto.
	base: Url,
}
impl FileHost {
	/// Creates a client that reuses the caller-provided dispatcher.
	///
	/// Ticks default to being scraped from the subject's folder page; swap the
	/// source with [`FileHost::with_ticks_source`] when the site variant serves
	/// them elsewhere.
	pub fn with_dispatcher(base: Url, dispatcher: Arc<dyn RequestDispatcher>) -> Result<Self> {
		let antiforgery = AntiForgeryTokenFetcher::new(dispatcher.clone(), base.clone())?;
		let ticks_source: Arc<dyn TicksSource> =
			Arc::new(PageTicksSource::new(dispatcher.clone(), base.clone())?);

		Ok(Self {
			dispatcher,
			ticks: TicksProvider::new(ticks_source),
			antiforgery,
			session: RwLock::new(SessionState::Unauthenticated),
			base,
		})
	}

	/// Replaces the ticks source, dropping any cached values.
	pub fn with_ticks_source(mut self, source: Arc<dyn TicksSource>) -> Self {
		self.ticks = TicksProvider::new(source);

		self
	}

	/// Returns a snapshot of the session state.
	pub fn session(&self) -> SessionState {
		self.session.read().clone()
	}

	/// Returns the site base URL.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Returns the ticks provider, e.g. to inspect or invalidate cached values.
	pub fn ticks(&self) -> &TicksProvider {
		&self.ticks
	}

	/// Returns the anti-forgery token fetcher.
	pub fn antiforgery(&self) -> &AntiForgeryTokenFetcher {
		&self.antiforgery
	}

	/// Returns the session subject or fails with [`Error::Unauthenticated`].
	pub(crate) fn require_subject(&self, operation: OpKind) -> Result<SubjectName> {
		self.session
			.read()
			.subject()
			.cloned()
			.ok_or(Error::Unauthenticated { operation })
	}

	/// Joins an endpoint path onto the site base URL.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
		self.base.join(path).map_err(|source| ConfigError::InvalidEndpoint { source }.into())
	}
}
#[cfg(feature = "reqwest")]
impl FileHost {
	/// Creates a client for `base` with the crate's default reqwest transport.
	///
	/// The dispatcher keeps a cookie store, because the site scopes sessions to
	/// cookies.
	pub fn new(base: Url) -> Result<Self> {
		let dispatcher = ReqwestDispatcher::new()?;

		Self::with_dispatcher(base, Arc::new(dispatcher))
	}
}
impl Debug for FileHost {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FileHost")
			.field("base", &self.base.as_str())
			.field("session", &*self.session.read())
			.finish()
	}
}
