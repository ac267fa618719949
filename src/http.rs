//! Transport boundary between the client core and the HTTP stack.
//!
//! The core depends on nothing beyond [`RequestDispatcher`]: a dispatcher takes a
//! fully described [`WebRequest`], performs exactly one round trip, and returns a
//! buffered [`Response`]. Non-2xx statuses are data, never errors, because the
//! site routinely signals outcomes through status codes alone. Bodies are
//! buffered in full so classification can inspect a response without consuming
//! it.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, error::TransportError};

/// AJAX marker header sent by default on every call, mirroring what the site's
/// own frontend sends. The anti-forgery scrape suppresses it.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Boxed future returned by [`RequestDispatcher::send`].
pub type DispatchFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Response, TransportError>> + 'a + Send>>;

/// Contract the core consumes from the underlying HTTP transport.
///
/// Implementations must return `Ok` for any response the server produced,
/// whatever its status; only transport-level failures (DNS, TCP, TLS, IO) may
/// surface as [`TransportError`]. Cookie storage and redirect handling belong to
/// the implementation.
pub trait RequestDispatcher: Send + Sync {
	/// Performs one round trip for `request`.
	fn send(&self, request: WebRequest) -> DispatchFuture<'_>;
}

/// HTTP methods used by the web UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// GET request; form fields are appended as query parameters.
	Get,
	/// POST request; form fields are sent URL-encoded, or as multipart when parts
	/// are attached.
	Post,
}

/// One part of a multipart POST body.
#[derive(Clone, Debug)]
pub struct MultipartPart {
	/// Form field name of the part.
	pub name: String,
	/// File name advertised for the part, when it carries a file.
	pub file_name: Option<String>,
	/// MIME type advertised for the part.
	pub content_type: Option<String>,
	/// Raw part payload.
	pub data: Vec<u8>,
}
impl MultipartPart {
	/// Creates a file part with the provided field name, file name, and payload.
	pub fn file(
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		data: Vec<u8>,
	) -> Self {
		Self {
			name: name.into(),
			file_name: Some(file_name.into()),
			content_type: Some(content_type.into()),
			data,
		}
	}
}

/// A fully described request handed to the dispatcher.
#[derive(Clone, Debug)]
pub struct WebRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Form fields; query parameters for GET, body for POST.
	pub form: BTreeMap<String, String>,
	/// Per-request header overrides applied after the dispatcher's defaults.
	pub header_overrides: Vec<(String, String)>,
	/// Multipart parts; non-empty parts turn a POST body into multipart.
	pub multipart: Vec<MultipartPart>,
	/// Name of one dispatcher default header to suppress for this request.
	///
	/// The anti-forgery scrape must go out without the client's AJAX marker
	/// header, so the dispatcher contract includes disabling a single default for
	/// one call.
	pub suppressed_default_header: Option<String>,
}
impl WebRequest {
	fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			form: BTreeMap::new(),
			header_overrides: Vec::new(),
			multipart: Vec::new(),
			suppressed_default_header: None,
		}
	}

	/// Creates a GET request for `url`.
	pub fn get(url: Url) -> Self {
		Self::new(Method::Get, url)
	}

	/// Creates a POST request for `url`.
	pub fn post(url: Url) -> Self {
		Self::new(Method::Post, url)
	}

	/// Adds a form field.
	pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.insert(name.into(), value.into());

		self
	}

	/// Adds a per-request header override.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.header_overrides.push((name.into(), value.into()));

		self
	}

	/// Attaches a multipart part.
	pub fn part(mut self, part: MultipartPart) -> Self {
		self.multipart.push(part);

		self
	}

	/// Suppresses one of the dispatcher's default headers for this request.
	pub fn without_default_header(mut self, name: impl Into<String>) -> Self {
		self.suppressed_default_header = Some(name.into());

		self
	}
}

/// Buffered transport response.
///
/// The body is owned in full, so it stays readable after classification and can
/// be inspected any number of times without another network call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
	status: u16,
	body: Vec<u8>,
}
impl Response {
	/// Creates a response from a status code and a buffered body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, body }
	}

	/// Returns the HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Returns the buffered body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Returns the body as text, replacing invalid UTF-8 sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_dispatcher::ReqwestDispatcher;
#[cfg(feature = "reqwest")]
mod reqwest_dispatcher {
	// crates.io
	use reqwest::multipart::{Form, Part};
	// self
	use super::{
		DispatchFuture, Method, REQUESTED_WITH_HEADER, RequestDispatcher, Response, WebRequest,
	};
	use crate::{
		_prelude::*,
		error::{ConfigError, TransportError},
	};

	/// Reqwest-backed [`RequestDispatcher`] with a cookie store and a configurable
	/// default header set.
	#[derive(Clone)]
	pub struct ReqwestDispatcher {
		client: ReqwestClient,
		default_headers: Vec<(String, String)>,
	}
	impl ReqwestDispatcher {
		/// Builds a dispatcher with a cookie store enabled and the web UI's usual
		/// default headers.
		pub fn new() -> Result<Self, ConfigError> {
			let client = ReqwestClient::builder().cookie_store(true).build()?;

			Ok(Self::with_client(client))
		}

		/// Wraps an existing [`ReqwestClient`].
		///
		/// The client should keep a cookie store enabled, because the site scopes
		/// sessions and some security tokens to cookies.
		pub fn with_client(client: ReqwestClient) -> Self {
			Self {
				client,
				default_headers: vec![(REQUESTED_WITH_HEADER.into(), "XMLHttpRequest".into())],
			}
		}

		/// Replaces the default header set applied to every request.
		pub fn with_default_headers(mut self, headers: Vec<(String, String)>) -> Self {
			self.default_headers = headers;

			self
		}

		async fn send_now(&self, request: WebRequest) -> Result<Response, TransportError> {
			let mut builder = match request.method {
				Method::Get => {
					let mut url = request.url;

					if !request.form.is_empty() {
						url.query_pairs_mut().extend_pairs(request.form.iter());
					}

					self.client.get(url)
				},
				Method::Post =>
					if request.multipart.is_empty() {
						self.client.post(request.url).form(&request.form)
					} else {
						let mut form = Form::new();

						for (name, value) in request.form {
							form = form.text(name, value);
						}
						for part in request.multipart {
							let mut built = Part::bytes(part.data);

							if let Some(file_name) = part.file_name {
								built = built.file_name(file_name);
							}
							if let Some(content_type) = part.content_type {
								built = built.mime_str(&content_type)?;
							}

							form = form.part(part.name, built);
						}

						self.client.post(request.url).multipart(form)
					},
			};

			for (name, value) in &self.default_headers {
				if request
					.suppressed_default_header
					.as_deref()
					.is_some_and(|suppressed| suppressed.eq_ignore_ascii_case(name))
				{
					continue;
				}

				builder = builder.header(name, value);
			}
			for (name, value) in &request.header_overrides {
				builder = builder.header(name, value);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(Response::new(status, body))
		}
	}
	impl RequestDispatcher for ReqwestDispatcher {
		fn send(&self, request: WebRequest) -> DispatchFuture<'_> {
			Box::pin(self.send_now(request))
		}
	}
	impl AsRef<ReqwestClient> for ReqwestDispatcher {
		fn as_ref(&self) -> &ReqwestClient {
			&self.client
		}
	}
}
