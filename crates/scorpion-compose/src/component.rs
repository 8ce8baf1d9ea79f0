//! Resource component library.
//!
//! The library is the ordered list of resource component entries from the
//! project configuration, with their class and id patterns compiled. Lookup
//! returns the descriptor of the first entry that matches.

use regex::Regex;

use scorpion_common::config::{ComponentEntry, ResourceComponentEntry};
use scorpion_common::error::{Result, ScorpionError};

/// The Go constructor a node is provisioned with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Go import path of the constructor's package.
    pub package: String,
    /// Constructor function name.
    pub constructor: String,
    /// Argument struct type name.
    pub args_type: String,
}

impl From<&ComponentEntry> for ComponentDescriptor {
    fn from(entry: &ComponentEntry) -> Self {
        Self {
            package: entry.package.clone(),
            constructor: entry.constructor_func.clone(),
            args_type: entry.args_struct.clone(),
        }
    }
}

#[derive(Debug)]
struct LibraryEntry {
    descriptor: ComponentDescriptor,
    resource_type: String,
    class_pattern: Regex,
    id_pattern: Regex,
}

/// Ordered resource component library with compiled patterns.
#[derive(Debug, Default)]
pub struct ComponentLibrary {
    entries: Vec<LibraryEntry>,
}

impl ComponentLibrary {
    /// Compiles the entries' patterns, keeping their order.
    ///
    /// An empty pattern matches everything.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the entry with an invalid pattern.
    pub fn new(entries: &[ResourceComponentEntry]) -> Result<Self> {
        let entries = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Ok::<_, ScorpionError>(LibraryEntry {
                    descriptor: ComponentDescriptor::from(&entry.component),
                    resource_type: entry.resource_type.clone(),
                    class_pattern: compile(i, "class", &entry.resource_class_regex)?,
                    id_pattern: compile(i, "id", &entry.resource_id_regex)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Number of entries in the library.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the library has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first entry matching the resource type exactly and whose
    /// patterns match the class and logical identity.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if no entry matches.
    pub fn lookup(
        &self,
        resource_type: &str,
        class: &str,
        identity: &str,
    ) -> Result<&ComponentDescriptor> {
        self.entries
            .iter()
            .find(|e| {
                e.resource_type == resource_type
                    && e.class_pattern.is_match(class)
                    && e.id_pattern.is_match(identity)
            })
            .map(|e| &e.descriptor)
            .ok_or_else(|| ScorpionError::Lookup {
                id: identity.to_string(),
                resource_type: resource_type.to_string(),
                class: class.to_string(),
            })
    }
}

fn compile(index: usize, what: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ScorpionError::config(format!(
            "resource component entry ({index}) has an invalid {what} pattern: {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(package: &str, resource_type: &str, class: &str, id: &str) -> ResourceComponentEntry {
        ResourceComponentEntry {
            component: ComponentEntry {
                package: package.into(),
                constructor_func: "New".into(),
                args_struct: "Args".into(),
            },
            resource_type: resource_type.into(),
            resource_class_regex: class.into(),
            resource_id_regex: id.into(),
        }
    }

    #[test]
    fn first_match_wins() {
        let library = ComponentLibrary::new(&[
            entry("example.com/a", "postgres", "", ""),
            entry("example.com/b", "postgres", "", ""),
        ])
        .expect("compile");
        let found = library
            .lookup("postgres", "default", "workload.foo.db")
            .expect("match");
        assert_eq!(found.package, "example.com/a");
    }

    #[test]
    fn type_is_matched_exactly() {
        let library =
            ComponentLibrary::new(&[entry("example.com/a", "postgres", "", "")]).expect("compile");
        assert!(library.lookup("postgres-instance", "default", "x").is_err());
    }

    #[test]
    fn class_and_id_patterns_filter() {
        let library = ComponentLibrary::new(&[
            entry("example.com/large", "postgres", "^large$", ""),
            entry("example.com/shared", "postgres", "", r"^shared\."),
            entry("example.com/fallback", "postgres", "", ""),
        ])
        .expect("compile");
        assert_eq!(
            library.lookup("postgres", "large", "workload.a.db").expect("large").package,
            "example.com/large"
        );
        assert_eq!(
            library.lookup("postgres", "default", "shared.db").expect("shared").package,
            "example.com/shared"
        );
        assert_eq!(
            library.lookup("postgres", "default", "workload.a.db").expect("fallback").package,
            "example.com/fallback"
        );
    }

    #[test]
    fn no_match_is_a_lookup_error() {
        let library = ComponentLibrary::new(&[]).expect("compile");
        assert!(library.is_empty());
        let err = library.lookup("redis", "default", "shared.cache").expect_err("no entries");
        let msg = err.to_string();
        assert!(msg.contains("shared.cache"), "got: {msg}");
        assert!(msg.contains("redis"), "got: {msg}");
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = ComponentLibrary::new(&[entry("example.com/a", "postgres", "(", "")])
            .expect_err("bad regex");
        assert!(matches!(err, ScorpionError::Config { .. }));
    }

    #[test]
    fn descriptor_from_config_entry() {
        let d = ComponentDescriptor::from(&ComponentEntry {
            package: "example.com/echo".into(),
            constructor_func: "NewEcho".into(),
            args_struct: "EchoArgs".into(),
        });
        assert_eq!(d.constructor, "NewEcho");
        assert_eq!(d.args_type, "EchoArgs");
    }
}
