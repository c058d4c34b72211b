//! Record identifiers for tallybook.
//!
//! Every invoice line, product and customer carries a [`RecordId`]. Fresh identities
//! are minted by [`RecordId::generate`]; identities that arrive from callers (manual
//! edits, snapshots) are taken verbatim.
//!
//! # Format
//!
//! Generated identities look like `inv-01J9ZQ6K4M3V0W8N5X2B7C1D9E`: a short kind prefix
//! followed by a ULID. The ULID carries a millisecond timestamp and 80 random bits drawn
//! per call, so a burst of calls within one millisecond still yields distinct values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Prefix stamped onto generated identities, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// Flat invoice line items.
    Invoice,
    /// Products.
    Product,
    /// Customers.
    Customer,
}

impl IdPrefix {
    /// The textual prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "inv",
            Self::Product => "prod",
            Self::Customer => "cust",
        }
    }
}

/// An opaque record identifier.
///
/// Identities are immutable once assigned and never reused after deletion.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identity for the given kind.
    #[must_use]
    pub fn generate(prefix: IdPrefix) -> Self {
        Self(format!("{}-{}", prefix.as_str(), Ulid::new()))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(value))
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is empty or whitespace.
    #[error("identifier must not be empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_kind_prefix() {
        assert!(RecordId::generate(IdPrefix::Invoice).as_str().starts_with("inv-"));
        assert!(RecordId::generate(IdPrefix::Product).as_str().starts_with("prod-"));
        assert!(RecordId::generate(IdPrefix::Customer).as_str().starts_with("cust-"));
    }

    #[test]
    fn burst_of_ids_does_not_collide() {
        let ids: HashSet<_> = (0..1000)
            .map(|_| RecordId::generate(IdPrefix::Invoice))
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn caller_supplied_ids_are_kept_verbatim() {
        let id: RecordId = "inv-legacy-42".parse().unwrap();
        assert_eq!(id.as_str(), "inv-legacy-42");
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(RecordId::from_str("  "), Err(IdError::Empty));
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
    }

    #[test]
    fn record_id_serde_json() {
        let id = RecordId::generate(IdPrefix::Customer);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
