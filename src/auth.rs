//! Session identity and scraped security tokens.

pub mod antiforgery;
pub mod session;
pub mod ticks;

pub use antiforgery::AntiForgeryTokenFetcher;
pub use session::SessionState;
pub use ticks::{CachedTicks, PageTicksSource, TicksProvider, TicksSource};

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const SUBJECT_NAME_MAX_LEN: usize = 128;

/// Error returned when subject name validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SubjectNameError {
	/// The name was empty.
	#[error("Subject name cannot be empty.")]
	Empty,
	/// The name contains whitespace characters.
	#[error("Subject name contains whitespace.")]
	ContainsWhitespace,
	/// The name exceeded the allowed character count.
	#[error("Subject name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated account identifier a session is bound to.
///
/// Subject names appear in scraped URLs and form fields, so they are validated
/// once at the boundary instead of being passed around as bare strings.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectName(String);
impl SubjectName {
	/// Creates a new subject name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SubjectNameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for SubjectName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SubjectName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for SubjectName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<SubjectName> for String {
	fn from(value: SubjectName) -> Self {
		value.0
	}
}
impl TryFrom<String> for SubjectName {
	type Error = SubjectNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for SubjectName {
	type Err = SubjectNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for SubjectName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Subject({})", self.0)
	}
}
impl Display for SubjectName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), SubjectNameError> {
	if view.is_empty() {
		return Err(SubjectNameError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(SubjectNameError::ContainsWhitespace);
	}
	if view.len() > SUBJECT_NAME_MAX_LEN {
		return Err(SubjectNameError::TooLong { max: SUBJECT_NAME_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn subject_names_validate_on_construction() {
		assert!(SubjectName::new("").is_err());
		assert!(SubjectName::new("with space").is_err());
		assert!(SubjectName::new(" alice").is_err());

		let subject = SubjectName::new("alice").expect("Subject fixture should be valid.");

		assert_eq!(subject.as_ref(), "alice");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let subject: SubjectName =
			serde_json::from_str("\"alice\"").expect("Subject should deserialize.");

		assert_eq!(subject.as_ref(), "alice");
		assert!(serde_json::from_str::<SubjectName>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<SubjectName, u8> = HashMap::from_iter([(
			SubjectName::new("alice").expect("Subject used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("alice"), Some(&7));
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "a".repeat(SUBJECT_NAME_MAX_LEN);

		SubjectName::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(SUBJECT_NAME_MAX_LEN + 1);

		assert!(SubjectName::new(&too_long).is_err());
	}
}
