//! Identifier generation.
//!
//! Node identifiers double as Go variable names in the generated program and
//! as merge keys for shared resources, so their exact values are a stable
//! contract: camel-case folding of the logical path followed by the 32-bit
//! FNV-1a digest of the unsanitized path as 8 lowercase hex digits.

use scorpion_common::constants::{SHARED_PREFIX, WORKLOAD_PREFIX};
use scorpion_common::types::ComponentId;
use scorpion_common::workload::Resource;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Letter prepended when the folded identifier does not start with a lowercase letter.
const FILLER: char = 'c';

/// 32-bit FNV-1a hash of `bytes`.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Maps a logical path to a valid, collision-resistant Go identifier.
#[must_use]
pub fn component_id(raw: &str) -> ComponentId {
    let mut next_cap = false;
    let mut safe = String::with_capacity(raw.len() + 9);
    for c in raw.chars() {
        if c.is_ascii_digit() {
            safe.push(c);
        } else if c.is_ascii_alphabetic() {
            if next_cap {
                next_cap = false;
                safe.push(c.to_ascii_uppercase());
            } else {
                safe.push(c.to_ascii_lowercase());
            }
        } else {
            next_cap = true;
        }
    }
    if !safe.starts_with(|c: char| c.is_ascii_lowercase()) {
        safe.insert(0, FILLER);
    }
    safe.push_str(&format!("{:08x}", fnv1a32(raw.as_bytes())));
    ComponentId::new(safe)
}

/// Logical path of a workload node.
#[must_use]
pub fn workload_path(workload: &str) -> String {
    format!("{WORKLOAD_PREFIX}.{workload}")
}

/// Logical path of a resource node: shared when it has an id, workload-scoped otherwise.
#[must_use]
pub fn resource_path(workload: &str, alias: &str, resource: &Resource) -> String {
    resource.id.as_ref().map_or_else(
        || format!("{WORKLOAD_PREFIX}.{workload}.{alias}"),
        |id| format!("{SHARED_PREFIX}.{id}"),
    )
}

/// Converts a field name to Go's exported identifier form.
///
/// Lowercase letters are capitalized at the start and after any dropped
/// separator; uppercase letters and digits are kept; everything else is
/// dropped. The result may be empty or start with a digit, which callers
/// must reject.
#[must_use]
pub fn to_field_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut next_upper = true;
    for c in raw.chars() {
        if c.is_uppercase() || c.is_numeric() {
            out.push(c);
            next_upper = false;
        } else if c.is_lowercase() {
            if next_upper {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            next_upper = false;
        } else {
            next_upper = true;
        }
    }
    out
}

/// Returns `true` if `name` is usable as an exported Go identifier.
#[must_use]
pub fn is_exported_identifier(name: &str) -> bool {
    name.starts_with(char::is_uppercase)
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_digests_are_stable() {
        let cases = [
            ("", "c811c9dc5"),
            (" ", "c250c8f7f"),
            ("A", "ac40bf6cc"),
            ("workload.foo", "workloadFoo6d39e786"),
            ("workload.bar", "workloadBar2eeefa0f"),
            ("workload.thing.x", "workloadThingXfebb8a50"),
            ("shared.db", "sharedDbf876cb74"),
        ];
        for (input, expected) in cases {
            assert_eq!(component_id(input).as_str(), expected, "input: {input:?}");
        }
    }

    #[test]
    fn generation_is_pure() {
        assert_eq!(component_id("shared.thing"), component_id("shared.thing"));
    }

    #[test]
    fn inputs_that_fold_identically_stay_distinct() {
        let a = component_id("workload.foo-bar");
        let b = component_id("workload.foo_bar");
        assert!(a.as_str().starts_with("workloadFooBar"));
        assert!(b.as_str().starts_with("workloadFooBar"));
        assert_ne!(a, b);
    }

    #[test]
    fn leading_digit_or_uppercase_gets_filler() {
        assert!(component_id("9lives").as_str().starts_with("c9lives"));
        assert!(component_id(".foo").as_str().starts_with("cFoo"));
    }

    #[test]
    fn digits_do_not_consume_the_capitalize_flag() {
        assert!(component_id("a.1b").as_str().starts_with("a1B"));
    }

    #[test]
    fn fnv_offset_basis_for_empty_input() {
        assert_eq!(fnv1a32(b""), 0x811c_9dc5);
    }

    #[test]
    fn paths_follow_identity_mode() {
        let scoped = Resource {
            resource_type: "postgres".into(),
            ..Resource::default()
        };
        let shared = Resource {
            id: Some("db".into()),
            ..scoped.clone()
        };
        assert_eq!(resource_path("foo", "a", &scoped), "workload.foo.a");
        assert_eq!(resource_path("foo", "a", &shared), "shared.db");
        assert_eq!(workload_path("foo"), "workload.foo");
    }

    #[test]
    fn field_names_are_exported() {
        for (input, expected) in [
            ("foo", "Foo"),
            ("snake_case", "SnakeCase"),
            ("field42", "Field42"),
            ("SomeField", "SomeField"),
            ("kebab-case-name", "KebabCaseName"),
        ] {
            assert_eq!(to_field_name(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn unconvertible_field_names_are_detected() {
        assert!(!is_exported_identifier(&to_field_name("_")));
        assert!(!is_exported_identifier(&to_field_name("42x")));
        assert!(is_exported_identifier(&to_field_name("x")));
    }
}
