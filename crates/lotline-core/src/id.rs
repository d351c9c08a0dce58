//! Stable element identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable element identifier that persists across save/load cycles.
///
/// The id is what layout files, gesture state, and reservation intents
/// refer to; it never changes while an element lives in the model. This
/// is a plain value type; handing out fresh ids is the model's job.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        let id = ElementId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&ElementId::from_raw(7)).unwrap();
        assert_eq!(json, "7");
    }
}
