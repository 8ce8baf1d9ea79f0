//! Reference resolution over parameter trees.
//!
//! Two passes share the placeholder parser:
//! - [`collect_dependencies`] runs while the graph is built. It substitutes
//!   metadata references in place, leaves resource references and `$$`
//!   escapes as written, and reports every resource alias that was referenced.
//! - [`interpolate`] runs during emission. It turns one string into a literal,
//!   a value, an output accessor or a format template with ordered arguments.
//!
//! Text inserted by the first pass has each `$` re-escaped, so running it
//! twice over the same tree gives the same result.

use std::collections::BTreeMap;

use scorpion_common::error::{Result, ScorpionError};
use scorpion_common::types::{ComponentId, LocalAlias};
use scorpion_common::value::{Value, ValueMap};

use crate::placeholder::{self, RefTarget, Reference, Segment};

/// What references may see while being resolved.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Metadata of the workload the parameters belong to.
    pub metadata: Option<&'a ValueMap>,
    /// Resource aliases visible to the parameters and the nodes they name.
    pub aliases: &'a BTreeMap<LocalAlias, ComponentId>,
}

impl<'a> Scope<'a> {
    /// Creates a scope.
    #[must_use]
    pub const fn new(
        metadata: Option<&'a ValueMap>,
        aliases: &'a BTreeMap<LocalAlias, ComponentId>,
    ) -> Self {
        Self { metadata, aliases }
    }

    /// Looks up a metadata path.
    ///
    /// # Errors
    ///
    /// Returns a reference error if a key is missing or a non-map is indexed.
    pub fn lookup_metadata(&self, reference: &Reference, keys: &[String]) -> Result<&'a Value> {
        let Some(metadata) = self.metadata else {
            return Err(ScorpionError::reference(
                &reference.raw,
                "no workload metadata in scope",
            ));
        };
        let (first, rest) = keys
            .split_first()
            .ok_or_else(|| {
                ScorpionError::reference(&reference.raw, "metadata reference has no key")
            })?;
        let mut current = metadata
            .get(first)
            .ok_or_else(|| {
                ScorpionError::reference(&reference.raw, format!("key '{first}' not found"))
            })?;
        for key in rest {
            let Value::Map(map) = current else {
                return Err(ScorpionError::reference(
                    &reference.raw,
                    format!("cannot lookup key '{key}', context is not a map"),
                ));
            };
            current = map
                .get(key)
                .ok_or_else(|| {
                    ScorpionError::reference(&reference.raw, format!("key '{key}' not found"))
                })?;
        }
        Ok(current)
    }

    /// Looks up the node behind a resource alias.
    ///
    /// # Errors
    ///
    /// Returns a reference error if the alias is not in scope.
    pub fn lookup_alias(&self, reference: &Reference, alias: &str) -> Result<&'a ComponentId> {
        self.aliases
            .get(&LocalAlias::new(alias))
            .ok_or_else(|| {
                ScorpionError::reference(
                    &reference.raw,
                    format!("unknown resource alias '{alias}'"),
                )
            })
    }
}

/// Resolves metadata references in `params` and collects resource dependencies.
///
/// Returns the rewritten tree together with the aliases it references, each
/// mapped to its node identifier.
///
/// # Errors
///
/// Returns a reference error, naming the offending tree path, for malformed
/// placeholders, failed metadata lookups, or unknown aliases.
pub fn collect_dependencies(
    params: &ValueMap,
    scope: &Scope<'_>,
) -> Result<(ValueMap, BTreeMap<LocalAlias, ComponentId>)> {
    let mut deps = BTreeMap::new();
    let mut out = ValueMap::new();
    for (key, value) in params {
        let _ = out.insert(key.clone(), collect_value(key, value, scope, &mut deps)?);
    }
    Ok((out, deps))
}

fn collect_value(
    path: &str,
    value: &Value,
    scope: &Scope<'_>,
    deps: &mut BTreeMap<LocalAlias, ComponentId>,
) -> Result<Value> {
    match value {
        Value::String(s) => collect_string(s, scope, deps).map_err(|e| at_path(e, path)),
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| collect_value(&format!("{path}[{i}]"), item, scope, deps))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| {
                let child = collect_value(&format!("{path}.{k}"), v, scope, deps)?;
                Ok::<_, ScorpionError>((k.clone(), child))
            })
            .collect::<Result<ValueMap>>()
            .map(Value::Map),
        other => Ok(other.clone()),
    }
}

fn collect_string(
    input: &str,
    scope: &Scope<'_>,
    deps: &mut BTreeMap<LocalAlias, ComponentId>,
) -> Result<Value> {
    if placeholder::is_plain(input) {
        return Ok(Value::String(input.to_string()));
    }
    let template = placeholder::parse(input)?;
    if let Some(reference) = template.single_reference() {
        if let RefTarget::Metadata { keys } = &reference.target {
            return Ok(escape_value(scope.lookup_metadata(reference, keys)?));
        }
    }

    let mut out = String::with_capacity(input.len());
    for segment in &template.segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Escape => out.push_str("$$"),
            Segment::Reference(reference) => match &reference.target {
                RefTarget::Metadata { keys } => {
                    let value = scope.lookup_metadata(reference, keys)?;
                    let text = value.to_text(&reference.raw)?;
                    out.push_str(&placeholder::escape_dollars(&text));
                }
                RefTarget::Resource { alias, .. } => {
                    let node = scope.lookup_alias(reference, alias)?;
                    let _ = deps.insert(LocalAlias::new(alias.as_str()), node.clone());
                    out.push_str(&reference.to_string());
                }
            },
        }
    }
    Ok(Value::String(out))
}

fn escape_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(placeholder::escape_dollars(s)),
        Value::List(items) => Value::List(items.iter().map(escape_value).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), escape_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Appends the tree path to a reference error; other errors pass through.
#[must_use]
pub fn at_path(err: ScorpionError, path: &str) -> ScorpionError {
    match err {
        ScorpionError::Reference { reference, message } => ScorpionError::Reference {
            reference,
            message: format!("{message} (at {path})"),
        },
        other => other,
    }
}

/// A read of a dependency's output, optionally through nested fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    /// Node whose output is read.
    pub node: ComponentId,
    /// Field path on the output, in source form.
    pub fields: Vec<String>,
}

/// One argument of a format template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    /// A resolved metadata value.
    Value(Value),
    /// A dependency output.
    Output(OutputRef),
}

/// The emission-time meaning of a string value.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    /// A string with no references; `$$` escapes already collapsed.
    Literal(String),
    /// A whole-string metadata reference, resolved to its value.
    Value(Value),
    /// A whole-string resource reference.
    Output(OutputRef),
    /// Text with `%v` markers, one per argument in order; literal `%` doubled.
    Template {
        /// The format string.
        format: String,
        /// Arguments, in the order their markers appear.
        args: Vec<TemplateArg>,
    },
}

/// Interprets a string value for code emission.
///
/// # Errors
///
/// Returns a reference error for malformed placeholders, failed metadata
/// lookups, or unknown aliases.
pub fn interpolate(input: &str, scope: &Scope<'_>) -> Result<Interpolation> {
    let template = placeholder::parse(input)?;

    if !template.has_references() {
        let mut literal = String::with_capacity(input.len());
        for segment in &template.segments {
            match segment {
                Segment::Text(text) => literal.push_str(text),
                Segment::Escape => literal.push('$'),
                Segment::Reference(_) => {}
            }
        }
        return Ok(Interpolation::Literal(literal));
    }

    if let Some(reference) = template.single_reference() {
        return Ok(match resolve_arg(reference, scope)? {
            TemplateArg::Value(v) => Interpolation::Value(v),
            TemplateArg::Output(o) => Interpolation::Output(o),
        });
    }

    let mut format = String::with_capacity(input.len());
    let mut args = Vec::new();
    for segment in &template.segments {
        match segment {
            Segment::Text(text) => format.push_str(&text.replace('%', "%%")),
            Segment::Escape => format.push('$'),
            Segment::Reference(reference) => {
                format.push_str("%v");
                args.push(resolve_arg(reference, scope)?);
            }
        }
    }
    Ok(Interpolation::Template { format, args })
}

fn resolve_arg(reference: &Reference, scope: &Scope<'_>) -> Result<TemplateArg> {
    Ok(match &reference.target {
        RefTarget::Metadata { keys } => {
            TemplateArg::Value(scope.lookup_metadata(reference, keys)?.clone())
        }
        RefTarget::Resource { alias, fields } => TemplateArg::Output(OutputRef {
            node: scope.lookup_alias(reference, alias)?.clone(),
            fields: fields.clone(),
        }),
    })
}
