//! Users and the outcome of registering one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a registered user.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Result of [`DocumentStore::register`](crate::store::DocumentStore::register).
///
/// A taken username is an ordinary outcome the caller reports back to the
/// user, not a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
  Registered(UserId),
  UsernameTaken,
}

impl Registration {
  /// The new user's id, if registration succeeded.
  pub fn user_id(self) -> Option<UserId> {
    match self {
      Registration::Registered(id) => Some(id),
      Registration::UsernameTaken => None,
    }
  }
}
