//! Actor identity types.
//!
//! Actor identity is provided by an external identity provider; the core
//! only carries the resolved identifiers along with each mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a staff member, assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Create an actor ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the ID is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The resolved identity of the staff member performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identity-provider ID.
    pub id: ActorId,
    /// Email address, when known.
    pub email: Option<String>,
    /// Display initials shown next to completed tasks (e.g. `"JD"`).
    pub initials: String,
}

impl Actor {
    /// Create an actor with the given ID and display initials.
    pub fn new(id: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(id),
            email: None,
            initials: initials.into(),
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The synthetic actor used for system-originated audit entries.
    pub fn system() -> Self {
        Self::new("system", "SYS")
    }
}
