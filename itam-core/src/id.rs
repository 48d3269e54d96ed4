use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a record within its collection.
///
/// Identifiers start at 1 and are never reused within a collection, even
/// after the record holding one is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Returns the raw integer value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Monotonic identifier source owned by a single collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub(crate) const fn new() -> Self {
        Self { last: 0 }
    }

    /// Hands out the next identifier.
    pub(crate) fn next_id(&mut self) -> RecordId {
        self.last += 1;
        RecordId(self.last)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
