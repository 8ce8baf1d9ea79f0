//! Placeholder parsing for `${...}` references in parameter strings.
//!
//! A string is lexed into text, `$$` escapes and reference spans; each span
//! body is then split on unescaped `.` and classified by its first segment.

pub mod ast;
pub mod lexer;

pub use ast::{RefTarget, Reference, Segment, Template};

use scorpion_common::error::{Result, ScorpionError};

use self::lexer::Lexeme;

const METADATA_ROOT: &str = "metadata";
const RESOURCES_ROOT: &str = "resources";

/// Returns `true` if `input` contains no placeholder markers at all.
#[must_use]
pub fn is_plain(input: &str) -> bool {
    !input.contains("${")
}

/// Parses a string value into a [`Template`].
///
/// Adjacent text lexemes are merged into a single [`Segment::Text`].
///
/// # Errors
///
/// Returns a reference error for unterminated or empty placeholders, unknown
/// roots, or references with missing path components.
pub fn parse(input: &str) -> Result<Template> {
    let mut segments: Vec<Segment> = Vec::new();
    for lexeme in lexer::tokenize(input)? {
        match lexeme {
            Lexeme::Text(text) => {
                if let Some(Segment::Text(prev)) = segments.last_mut() {
                    prev.push_str(text);
                } else {
                    segments.push(Segment::Text(text.to_string()));
                }
            }
            Lexeme::Escape => segments.push(Segment::Escape),
            Lexeme::Placeholder(body) => segments.push(Segment::Reference(parse_reference(body)?)),
        }
    }
    Ok(Template { segments })
}

/// Parses the body of a single `${...}` span.
///
/// # Errors
///
/// Returns a reference error if the body is empty, names an unknown root, or
/// lacks the key or alias its root requires.
pub fn parse_reference(body: &str) -> Result<Reference> {
    if body.is_empty() {
        return Err(ScorpionError::reference(body, "empty placeholder"));
    }
    let mut parts = split_path(body).into_iter();
    let root = parts.next().unwrap_or_default();
    let target = match root.as_str() {
        METADATA_ROOT => {
            let keys: Vec<String> = parts.collect();
            if keys.is_empty() {
                return Err(ScorpionError::reference(body, "metadata reference has no key"));
            }
            RefTarget::Metadata { keys }
        }
        RESOURCES_ROOT => {
            let Some(alias) = parts.next().filter(|a| !a.is_empty()) else {
                return Err(ScorpionError::reference(body, "resource reference has no alias"));
            };
            RefTarget::Resource {
                alias,
                fields: parts.collect(),
            }
        }
        _ => {
            return Err(ScorpionError::reference(
                body,
                format!("unknown reference root '{root}'"),
            ));
        }
    };
    Ok(Reference {
        raw: body.to_string(),
        target,
    })
}

/// Splits a reference path on `.`, treating `\.` as a literal dot.
#[must_use]
pub fn split_path(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                let _ = chars.next();
            }
            '.' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Replaces every `$` with `$$` so the text survives another resolution pass.
#[must_use]
pub fn escape_dollars(input: &str) -> String {
    input.replace('$', "$$")
}
