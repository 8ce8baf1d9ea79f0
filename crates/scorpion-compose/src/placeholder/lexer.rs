//! Splitting of string values into placeholder segments using `nom`.
//!
//! The lexer only separates text, `$$` escapes and `${...}` spans; the body
//! of each span is interpreted by the parser in [`super`].

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till1, take_until},
    character::complete::{char, one_of},
    combinator::{map, not, recognize, value},
    sequence::{delimited, terminated},
};

use scorpion_common::error::{Result, ScorpionError};

/// A lexical piece of a string, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme<'a> {
    /// Literal text.
    Text(&'a str),
    /// `$$`.
    Escape,
    /// The body of a `${...}` span.
    Placeholder(&'a str),
}

fn escape(input: &str) -> IResult<&str, Lexeme<'_>> {
    value(Lexeme::Escape, tag("$$")).parse(input)
}

fn placeholder(input: &str) -> IResult<&str, Lexeme<'_>> {
    map(
        delimited(tag("${"), take_until("}"), char('}')),
        Lexeme::Placeholder,
    )
    .parse(input)
}

/// A `$` that starts neither an escape nor a placeholder.
fn lone_dollar(input: &str) -> IResult<&str, Lexeme<'_>> {
    map(
        recognize(terminated(char('$'), not(one_of("${")))),
        Lexeme::Text,
    )
    .parse(input)
}

fn text(input: &str) -> IResult<&str, Lexeme<'_>> {
    map(take_till1(|c| c == '$'), Lexeme::Text).parse(input)
}

fn single_lexeme(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((escape, placeholder, lone_dollar, text)).parse(input)
}

/// Splits `input` into lexemes.
///
/// # Errors
///
/// Returns a reference error for a `${` with no closing `}`.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme<'_>>> {
    let mut lexemes = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() {
        let (rest, lexeme) = single_lexeme(remaining).map_err(|e| {
            if remaining.starts_with("${") {
                ScorpionError::reference(remaining, "unterminated placeholder")
            } else {
                ScorpionError::reference(remaining, format!("lexer error: {e}"))
            }
        })?;
        lexemes.push(lexeme);
        remaining = rest;
    }

    Ok(lexemes)
}
