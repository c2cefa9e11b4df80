//! Lexical analysis for modifier calls

use super::PResult;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::{
    ascii::multispace0,
    combinator::{delimited, opt, separated},
    token::take_while,
};

/// Allow whitespace on both sides of `parser`
fn padded<'a, O>(
    parser: impl Parser<&'a str, O, ContextError>,
) -> impl Parser<&'a str, O, ContextError> {
    delimited(multispace0, parser, multispace0)
}

/// Parse a quoted string "..."
///
/// The content is returned raw: a backslash keeps the following character
/// from closing the string but is not removed.
pub fn quoted_string<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let start = *input;
    let bytes = input.as_bytes();

    if bytes.is_empty() || bytes[0] != b'"' {
        return Err(winnow::error::ErrMode::Backtrack(
            winnow::error::ContextError::default(),
        ));
    }

    let mut pos = 1; // Skip opening quote

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => {
                // Skip escaped character
                pos += 2;
            }
            b'"' => {
                let result = &start[1..pos];
                *input = &start[pos + 1..];
                return Ok(result);
            }
            _ => pos += 1,
        }
    }

    Err(winnow::error::ErrMode::Backtrack(
        winnow::error::ContextError::default(),
    ))
}

/// Parse a modifier name (everything up to an argument list)
pub fn modifier_name<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| c != '(').parse_next(input)
}

/// Parse a parenthesized list of quoted arguments: `("a", "b")`
pub fn argument_list<'a>(input: &mut &'a str) -> PResult<Vec<&'a str>> {
    delimited(
        '(',
        separated(0.., padded(quoted_string), ','),
        padded(')'),
    )
    .parse_next(input)
}

/// Parse `name` or `name("arg", ...)`
pub fn modifier_call<'a>(input: &mut &'a str) -> PResult<(&'a str, Option<Vec<&'a str>>)> {
    (modifier_name, opt(argument_list)).parse_next(input)
}
