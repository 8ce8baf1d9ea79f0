//! Domain primitive types used across the Scorpion workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a node in the component graph.
///
/// Also used verbatim as the Go variable name bound to the node's output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Creates a component ID from an already-generated identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The name a workload uses for one of its own resources.
///
/// Unique only within a single node's dependency set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalAlias(String);

impl LocalAlias {
    /// Creates a local alias.
    #[must_use]
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LocalAlias {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_order_lexically() {
        let mut ids = vec![ComponentId::from("workloadFoo"), ComponentId::from("sharedDb")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "sharedDb");
    }

    #[test]
    fn component_id_serializes_as_plain_string() {
        let json =
            serde_json::to_string(&ComponentId::from("sharedDbf876cb74")).expect("serialize");
        assert_eq!(json, "\"sharedDbf876cb74\"");
    }
}
