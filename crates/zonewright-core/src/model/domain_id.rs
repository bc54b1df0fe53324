// ── Domain identity ──
//
// Stored rows carry a numeric id. The synthetic platform-hostname domain
// has no row, so it gets a sentinel that can never collide with one.

use serde::{Serialize, Serializer};
use std::fmt;

// ── DomainId ────────────────────────────────────────────────────────

/// Identifier of a domain taking part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainId {
    /// A row from the domain store.
    Stored(u64),
    /// The platform hostname entry, synthesized from settings.
    Platform,
}

impl DomainId {
    /// Row id, `None` for the platform entry.
    pub fn as_stored(&self) -> Option<u64> {
        match self {
            Self::Stored(id) => Some(*id),
            Self::Platform => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored(id) => write!(f, "{id}"),
            Self::Platform => f.write_str("platform"),
        }
    }
}

impl Serialize for DomainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<u64> for DomainId {
    fn from(id: u64) -> Self {
        Self::Stored(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_stored_and_platform() {
        assert_eq!(DomainId::Stored(42).to_string(), "42");
        assert_eq!(DomainId::Platform.to_string(), "platform");
    }

    #[test]
    fn platform_never_has_a_stored_id() {
        assert_eq!(DomainId::Platform.as_stored(), None);
        assert_eq!(DomainId::Stored(3).as_stored(), Some(3));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&DomainId::Stored(5)).unwrap();
        assert_eq!(json, "\"5\"");
    }
}
