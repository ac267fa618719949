//! Session-token and response-adaptation client core for consumer file hosts
//! driven through their web-UI endpoints: outcome classification, scraped
//! security tokens, and single-retry ticks refresh in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod outcome;
pub mod scrape;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; available whenever the
	//! `reqwest` transport is enabled.

	pub use crate::_prelude::*;

	// self
	use crate::{auth::SubjectName, client::FileHost, http::ReqwestDispatcher};

	/// Builds a [`FileHost`] against a mock server base URL using the default
	/// reqwest dispatcher.
	pub fn build_test_client(base: &str) -> FileHost {
		let base = Url::parse(base).expect("Failed to parse test base URL.");
		let dispatcher =
			ReqwestDispatcher::new().expect("Failed to build reqwest dispatcher for tests.");

		FileHost::with_dispatcher(base, Arc::new(dispatcher))
			.expect("Failed to build test client.")
	}

	/// Builds a validated [`SubjectName`] fixture.
	pub fn test_subject(name: &str) -> SubjectName {
		SubjectName::new(name).expect("Test subject name should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
