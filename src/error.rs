//! Client-level error types shared across the token, transport, and operation layers.

// self
use crate::{_prelude::*, auth::SubjectName, client::ops::OpKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A successful response carried a payload the client could not decode.
	#[error(transparent)]
	Payload(#[from] PayloadError),
	/// Transport failure (DNS, TCP, TLS); propagated untranslated and never retried.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Listing markup could not be translated by the configured parser.
	#[error(transparent)]
	Listing(#[from] crate::scrape::ListingParseError),

	/// The operation's success classification returned false after all permitted attempts.
	#[error("{operation} did not succeed after {attempts} attempt(s); last status was {status}.")]
	RequestFailed {
		/// Operation whose classification failed.
		operation: OpKind,
		/// HTTP status of the last response.
		status: u16,
		/// Number of dispatches performed (1 for anti-forgery operations, 2 for ticks
		/// operations).
		attempts: u8,
	},
	/// A scraped security token could not be located in the page markup.
	#[error("No security token was found in the scraped markup for `{subject}`.")]
	TokenNotFound {
		/// Subject whose page was scraped.
		subject: SubjectName,
	},
	/// The operation requires an authenticated session subject.
	#[error("{operation} requires an authenticated session.")]
	Unauthenticated {
		/// Operation that was attempted without a session.
		operation: OpKind,
	},
}

/// Configuration and validation failures raised locally, before any dispatch.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint path could not be joined onto the site base URL.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A token extraction pattern failed to compile.
	#[error("Token extraction pattern is invalid.")]
	InvalidPattern {
		/// Underlying regex compilation failure.
		#[source]
		source: regex::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures decoding the typed payload of an already-classified-successful response.
#[derive(Debug, ThisError)]
pub enum PayloadError {
	/// Response body was malformed JSON or missed a required field.
	#[error("Response payload is malformed.")]
	Malformed {
		/// Structured parsing failure carrying the field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The upload target URL returned by the site cannot be parsed.
	#[error("Upload target URL is invalid.")]
	UploadUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the site.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the site.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
