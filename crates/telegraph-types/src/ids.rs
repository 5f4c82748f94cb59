//! Type-safe identifier for spawnable candidates.
//!
//! Candidates are configured by name (the host's handle for whatever gets
//! instantiated -- a prefab, an asset key, a template). The newtype keeps
//! those names from being mixed up with other strings at compile time.

use serde::{Deserialize, Serialize};

/// Identifier of a spawnable candidate, as configured by the host.
///
/// The sequencer never interprets the name; it only carries it on spawn
/// events so the external placement system knows what to instantiate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Create a candidate identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the candidate name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier and return the inner name.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for CandidateId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_name() {
        let id = CandidateId::new("rock_tall");
        assert_eq!(id.to_string(), "rock_tall");
        assert_eq!(id.as_str(), "rock_tall");
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = CandidateId::new("cactus_wide");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"cactus_wide\"");
        let restored: CandidateId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
