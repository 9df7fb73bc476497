//! Owner references.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Subject id issued by the auth provider for a signed-in user.
///
/// Stored in the `userId` field of addresses, products and orders. It is a
/// loose reference: nothing checks that a matching user document exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap a subject id.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    /// Returns the subject id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OwnerId {
    fn from(subject: String) -> Self {
        Self(subject)
    }
}

impl From<&str> for OwnerId {
    fn from(subject: &str) -> Self {
        Self(subject.to_owned())
    }
}
