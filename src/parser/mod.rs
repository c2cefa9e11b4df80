//! Bracketed pattern parser
//!
//! A pattern is literal text with bracketed expressions:
//!
//! ```text
//! [key]
//! [key:modifier]
//! [key:modifier("arg", "arg"):modifier]
//! ```
//!
//! The parser is total. Unbalanced brackets and unparsable modifiers are
//! kept in some form rather than rejected, and no input text is dropped.

pub mod delimiter;
pub mod lexer;

use delimiter::ExpressionEnd;
use regex::Regex;
use std::fmt;

/// Internal parser result type
pub type PResult<O> = winnow::PResult<O, winnow::error::ContextError>;

/// Name under which `(text)` fallbacks are recorded
pub const FALLBACK_MODIFIER: &str = "fallback";

/// Name of the regular-expression replacement modifier
pub const REGEX_MODIFIER: &str = "regex";

/// A piece of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output as-is
    Literal(String),
    /// A bracketed expression
    Expression(Expression),
}

/// A bracketed expression: a key and the modifiers applied to its value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expression {
    /// Key naming a built-in or a field
    pub key: String,
    /// Modifiers, applied left to right
    pub modifiers: Vec<ModifierCall>,
}

/// One modifier invocation inside an expression
///
/// For a two-argument `regex` call the expression is compiled here, once,
/// so expansion does not recompile it for every record.
#[derive(Debug, Clone)]
pub struct ModifierCall {
    name: String,
    args: Vec<String>,
    regex: Option<Regex>,
}

impl ModifierCall {
    /// Create a modifier call
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        let name = name.into();
        let regex = match (name.as_str(), args.as_slice()) {
            (REGEX_MODIFIER, [pattern, _]) => Regex::new(pattern).ok(),
            _ => None,
        };
        Self { name, args, regex }
    }

    /// Modifier name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal arguments, unquoted
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The compiled expression of a valid `regex` call
    #[must_use]
    pub const fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

impl PartialEq for ModifierCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }
}

impl Eq for ModifierCall {}

/// Parse a pattern into segments
#[must_use]
pub fn parse_pattern(source: &str) -> Vec<Segment> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(open) = delimiter::find_byte(bytes, b'[', pos) else {
            literal.push_str(&source[pos..]);
            break;
        };
        literal.push_str(&source[pos..open]);

        match delimiter::find_expression_end(bytes, open + 1) {
            ExpressionEnd::Close(close) => {
                flush_literal(&mut segments, &mut literal);
                segments.push(Segment::Expression(parse_expression(&source[open + 1..close])));
                pos = close + 1;
            }
            ExpressionEnd::Reopen(next) => {
                tracing::trace!(text = &source[open..next], "abandoned '[' kept as literal text");
                literal.push_str(&source[open..next]);
                pos = next;
            }
            ExpressionEnd::Unterminated => {
                flush_literal(&mut segments, &mut literal);
                segments.push(Segment::Expression(parse_expression(&source[open + 1..])));
                pos = bytes.len();
            }
        }
    }

    flush_literal(&mut segments, &mut literal);
    segments
}

fn flush_literal(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Parse the text between `[` and `]`
#[must_use]
pub fn parse_expression(body: &str) -> Expression {
    let (key, chain) = body.split_once(':').unwrap_or((body, ""));

    let modifiers = delimiter::split_unquoted(chain, b':')
        .into_iter()
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(parse_modifier)
        .collect();

    Expression {
        key: key.trim().to_string(),
        modifiers,
    }
}

/// Parse one modifier specification
///
/// `(text)` is shorthand for `fallback("text")`. A specification that does
/// not parse becomes a modifier named by its raw text with no arguments.
#[must_use]
pub fn parse_modifier(spec: &str) -> ModifierCall {
    let spec = spec.trim();

    if let Some(inner) = spec.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        let mut rest = inner.trim();
        let text = match lexer::quoted_string(&mut rest) {
            Ok(quoted) if rest.trim().is_empty() => quoted,
            _ => inner,
        };
        return ModifierCall::new(FALLBACK_MODIFIER, vec![text.to_string()]);
    }

    let mut input = spec;
    match lexer::modifier_call(&mut input) {
        Ok((name, args)) if input.trim().is_empty() => ModifierCall::new(
            name.trim(),
            args.unwrap_or_default()
                .into_iter()
                .map(String::from)
                .collect(),
        ),
        _ => {
            tracing::debug!(spec, "unparsable modifier kept as a raw name");
            ModifierCall::new(spec, Vec::new())
        }
    }
}

impl fmt::Display for ModifierCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "\"{arg}\"")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.key)?;
        for modifier in &self.modifiers {
            write!(f, ":{modifier}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text}"),
            Self::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literal(text: &str) -> Segment {
        Segment::Literal(text.to_string())
    }

    fn key(name: &str) -> Segment {
        Segment::Expression(Expression {
            key: name.to_string(),
            modifiers: Vec::new(),
        })
    }

    fn keyed(name: &str, modifiers: Vec<ModifierCall>) -> Segment {
        Segment::Expression(Expression {
            key: name.to_string(),
            modifiers,
        })
    }

    #[test]
    fn test_parse_simple_pattern() {
        assert_eq!(
            parse_pattern("[year]_[auth]_[firstpage]"),
            vec![key("year"), literal("_"), key("auth"), literal("_"), key("firstpage")]
        );
    }

    #[test]
    fn test_parse_literal_only() {
        assert_eq!(parse_pattern("no brackets"), vec![literal("no brackets")]);
        assert!(parse_pattern("").is_empty());
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(
            parse_pattern("[entrytype:lower]:[year]"),
            vec![
                keyed("entrytype", vec![ModifierCall::new("lower", Vec::new())]),
                literal(":"),
                key("year"),
            ]
        );
    }

    #[test]
    fn test_parse_regex_arguments() {
        let segments = parse_pattern(r#"[year]-[journal:regex("Organization","JabRef")]"#);
        assert_eq!(
            segments[2],
            keyed(
                "journal",
                vec![ModifierCall::new(
                    "regex",
                    vec!["Organization".to_string(), "JabRef".to_string()]
                )]
            )
        );
    }

    #[test]
    fn test_quoted_arguments_hide_delimiters() {
        let segments = parse_pattern(r#"[title:regex("[:,()]", "-"):lower]"#);
        assert_eq!(
            segments,
            vec![keyed(
                "title",
                vec![
                    ModifierCall::new("regex", vec!["[:,()]".to_string(), "-".to_string()]),
                    ModifierCall::new("lower", Vec::new()),
                ]
            )]
        );
    }

    #[test]
    fn test_empty_key_and_modifiers() {
        assert_eq!(parse_pattern("[:]"), vec![key("")]);
        assert_eq!(
            parse_pattern("[:lower]"),
            vec![keyed("", vec![ModifierCall::new("lower", Vec::new())])]
        );
        assert_eq!(parse_pattern("[bibtexkey:]"), vec![key("bibtexkey")]);
        assert_eq!(parse_pattern("[]"), vec![key("")]);
    }

    #[test]
    fn test_unterminated_bracket_takes_the_rest() {
        assert_eq!(
            parse_pattern("[year]_[auth]_[firstpage"),
            vec![key("year"), literal("_"), key("auth"), literal("_"), key("firstpage")]
        );
    }

    #[test]
    fn test_reopened_bracket_becomes_literal() {
        assert_eq!(
            parse_pattern("[year]_[auth_[firstpage]"),
            vec![key("year"), literal("_[auth_"), key("firstpage")]
        );
    }

    #[test]
    fn test_quote_in_key_does_not_hide_brackets() {
        assert_eq!(
            parse_pattern(r#"[a"b]_[year]_[c"d]"#),
            vec![key(r#"a"b"#), literal("_"), key("year"), literal("_"), key(r#"c"d"#)]
        );
        assert_eq!(
            parse_pattern(r#"[a"b:lower]"#),
            vec![keyed(r#"a"b"#, vec![ModifierCall::new("lower", Vec::new())])]
        );
    }

    #[test]
    fn test_stray_closing_bracket_is_literal() {
        assert_eq!(
            parse_pattern("a]b[year]"),
            vec![literal("a]b"), key("year")]
        );
    }

    #[test]
    fn test_fallback_shorthand() {
        assert_eq!(
            parse_modifier("(Anonymous)"),
            ModifierCall::new(FALLBACK_MODIFIER, vec!["Anonymous".to_string()])
        );
        assert_eq!(
            parse_modifier(r#"("No Title")"#),
            ModifierCall::new(FALLBACK_MODIFIER, vec!["No Title".to_string()])
        );
    }

    #[test]
    fn test_regex_calls_are_compiled_once() {
        let call = parse_modifier(r##"regex("\d+", "#")"##);
        assert!(call.regex().is_some_and(|re| re.is_match("42")));

        assert!(ModifierCall::new("regex", vec!["(".into(), "x".into()]).regex().is_none());
        assert!(ModifierCall::new("regex", vec!["a".into()]).regex().is_none());
        assert!(ModifierCall::new("lower", Vec::new()).regex().is_none());
    }

    #[test]
    fn test_unparsable_modifier_keeps_raw_text() {
        assert_eq!(
            parse_modifier(r#"regex("a", "b""#),
            ModifierCall::new(r#"regex("a", "b""#, Vec::new())
        );
        assert_eq!(
            parse_modifier("regex(a, b)"),
            ModifierCall::new("regex(a, b)", Vec::new())
        );
    }

    #[test]
    fn test_display_round_trips_well_formed_patterns() {
        let source = r#"[auth:lower]_[title:regex("a","b"):trunc3]"#;
        let rendered: String = parse_pattern(source).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, source);
    }
}
