//! Missing-field validation.
//!
//! A numeric field is present when it holds any value, zero included; only an absent
//! value is missing. A text field is present when it is non-empty after trimming.

use crate::money::Money;
use crate::record::{MissingFields, Record};

/// Presence test for a single attribute value.
pub trait Present {
    /// Whether the value counts as present.
    fn is_present(&self) -> bool;
}

impl Present for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Present for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl Present for Option<u32> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl Present for Option<Money> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

/// Compute the set of required fields absent on `record`.
///
/// Pure: the same record always yields the same set. An empty result is the
/// "no missing fields" marker.
#[must_use]
pub fn compute_missing<R: Record>(record: &R) -> MissingFields {
    record
        .required_fields()
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
}
