//! Collaborator boundary for translating listing markup into records.
//!
//! The site answers tree-listing calls with bare HTML fragments. Turning those
//! fragments into structured records is not protocol logic, so it stays behind
//! [`ListingParser`]: the client hands the fragment over and consumes plain
//! record types back.

// self
use crate::_prelude::*;

/// A folder row extracted from a listing fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
	/// Server-side folder identifier.
	pub id: u64,
	/// Display name of the folder.
	pub name: String,
}

/// A file row extracted from a listing fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
	/// Server-side file identifier.
	pub id: u64,
	/// Display name of the file.
	pub name: String,
	/// Download URL, when the fragment exposes one.
	pub download_url: Option<Url>,
}

/// Structured result of translating one listing fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
	/// Sub-folders of the listed folder.
	pub folders: Vec<FolderEntry>,
	/// Files in the listed folder.
	pub files: Vec<FileEntry>,
}

/// Error surfaced by a [`ListingParser`] implementation; propagated to the
/// caller untranslated.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Listing markup could not be parsed: {message}.")]
pub struct ListingParseError {
	/// Parser-supplied description of the failure.
	pub message: String,
}
impl ListingParseError {
	/// Creates an error carrying the provided description.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Markup translation contract implemented outside this crate.
pub trait ListingParser: Send + Sync {
	/// Translates one listing fragment into structured records.
	fn parse_listing(&self, markup: &str) -> Result<Listing, ListingParseError>;
}
