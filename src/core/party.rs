use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an account that can hold ledger entries and receive payments.
///
/// Callers of the router, payment recipients and the custodian itself are
/// all parties. A routing session accounts its deltas under the caller's id.
///
/// # Examples
///
/// ```
/// use flash_router::core::party::PartyId;
///
/// let alice = PartyId::new("alice");
/// assert_eq!(alice.as_str(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
