//! Explicit session state held by the client.
//!
//! The site ties mutating operations to a logged-in account, and the client
//! models that with a single owned value instead of a nullable username field:
//! an operation either finds an [`SessionState::Authenticated`] subject or
//! fails with a dedicated error before any request is built.

// self
use crate::{_prelude::*, auth::SubjectName};

/// Session lifecycle value; begins at a successful login, ends at logout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
	/// No account is bound; only public operations are available.
	#[default]
	Unauthenticated,
	/// A subject is bound for the lifetime of the login.
	Authenticated {
		/// Account the session belongs to.
		subject: SubjectName,
	},
}
impl SessionState {
	/// Returns the bound subject, if any.
	pub fn subject(&self) -> Option<&SubjectName> {
		match self {
			Self::Unauthenticated => None,
			Self::Authenticated { subject } => Some(subject),
		}
	}

	/// Returns whether a subject is bound.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, Self::Authenticated { .. })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_state_exposes_the_bound_subject() {
		let state = SessionState::default();

		assert!(!state.is_authenticated());
		assert_eq!(state.subject(), None);

		let subject = SubjectName::new("alice").expect("Subject fixture should be valid.");
		let state = SessionState::Authenticated { subject: subject.clone() };

		assert!(state.is_authenticated());
		assert_eq!(state.subject(), Some(&subject));
	}
}
