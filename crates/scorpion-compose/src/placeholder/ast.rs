//! Structured form of placeholder strings.

use std::fmt;

/// A lexical piece of a string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, containing no `$$` escapes and no references.
    Text(String),
    /// A `$$` escape standing for a literal `$`.
    Escape,
    /// A parsed `${...}` reference.
    Reference(Reference),
}

/// A parsed `${...}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The text between `${` and `}`, exactly as written.
    pub raw: String,
    /// What the reference points at.
    pub target: RefTarget,
}

/// The namespace and path of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// `metadata.<k1>.<k2>...`: a lookup in the current workload's metadata.
    Metadata {
        /// Keys to descend through, at least one.
        keys: Vec<String>,
    },
    /// `resources.<alias>.<field>...`: an output of a sibling resource.
    Resource {
        /// Local alias of the resource.
        alias: String,
        /// Output fields to read off the resource, possibly none.
        fields: Vec<String>,
    },
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}}", self.raw)
    }
}

/// A whole string value split into segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    /// Segments in source order.
    pub segments: Vec<Segment>,
}

impl Template {
    /// Returns the reference if the string is exactly one `${...}` and nothing else.
    #[must_use]
    pub fn single_reference(&self) -> Option<&Reference> {
        match self.segments.as_slice() {
            [Segment::Reference(r)] => Some(r),
            _ => None,
        }
    }

    /// Returns `true` if the string contains at least one reference.
    #[must_use]
    pub fn has_references(&self) -> bool {
        self.references().next().is_some()
    }

    /// Iterates over the references in source order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Reference(r) => Some(r),
            _ => None,
        })
    }
}
