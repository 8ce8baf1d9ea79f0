//! Unified error types for the Scorpion workspace.
//!
//! Every fallible entry point in the library crates returns [`Result`].
//! The binary wraps these in `anyhow` for top-level reporting.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ScorpionError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A placeholder reference could not be parsed or resolved.
    #[error("invalid ref '{reference}': {message}")]
    Reference {
        /// The full reference text, without the `${` and `}` delimiters.
        reference: String,
        /// What went wrong while resolving it.
        message: String,
    },

    /// Two declarations disagree about the same graph entity.
    #[error("duplicate {kind} {id:?} with conflicting {what}")]
    Conflict {
        /// Kind of the conflicting entity (`resource`, `workload`, ...).
        kind: &'static str,
        /// Logical identity of the entity.
        id: String,
        /// The attribute that conflicts.
        what: &'static str,
    },

    /// No component library entry matches a resource.
    #[error(
        "no resource component matches resource {id:?} (type {resource_type:?}, class {class:?})"
    )]
    Lookup {
        /// Logical identity of the resource.
        id: String,
        /// Declared resource type.
        resource_type: String,
        /// Effective resource class.
        class: String,
    },

    /// The dependency graph contains a cycle.
    #[error("cycle detected at node {node}")]
    Cycle {
        /// The first node found while still in progress.
        node: String,
    },

    /// A dependency edge targets a node that is not part of the graph.
    #[error("node {id} is referenced but not defined in the graph")]
    MissingNode {
        /// Identifier of the missing node.
        id: String,
    },

    /// A value cannot be represented in, or translated from, the value tree.
    #[error("unsupported value at {path}: {message}")]
    Shape {
        /// Dotted path of the offending value.
        path: String,
        /// Why the value was rejected.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("yaml error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl ScorpionError {
    /// Builds a [`ScorpionError::Reference`] from anything string-like.
    pub fn reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Builds a [`ScorpionError::Shape`] from anything string-like.
    pub fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Builds a [`ScorpionError::Config`] from anything string-like.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ScorpionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_names_node() {
        let err = ScorpionError::Cycle { node: "a".into() };
        assert_eq!(err.to_string(), "cycle detected at node a");
    }

    #[test]
    fn conflict_error_quotes_identity() {
        let err = ScorpionError::Conflict {
            kind: "resource",
            id: "shared.db".into(),
            what: "parameters",
        };
        assert_eq!(
            err.to_string(),
            "duplicate resource \"shared.db\" with conflicting parameters"
        );
    }

    #[test]
    fn reference_error_includes_reference_text() {
        let err = ScorpionError::reference("metadata.missing", "key 'missing' not found");
        assert_eq!(
            err.to_string(),
            "invalid ref 'metadata.missing': key 'missing' not found"
        );
    }
}
