//! Text modifiers applied to resolved values
//!
//! A modifier is a pure function from text (plus literal arguments) to text.
//! Names are looked up exactly first, then matched against the registry's
//! name patterns (the built-in registry has one, for `truncN`). Modifiers
//! the registry does not know, and built-ins called with unusable arguments,
//! pass their input through unchanged.

use crate::parser::{ModifierCall, FALLBACK_MODIFIER, REGEX_MODIFIER};
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::sync::Arc;

/// Signature of a modifier: input text and arguments to output text
pub type ModifierFn = fn(&str, &[String]) -> String;

/// Signature of a modifier matched by name pattern; it also receives the
/// captures of the pattern against the modifier name
pub type PatternModifierFn = fn(&str, &Captures<'_>, &[String]) -> String;

lazy_static! {
    /// Words kept lowercase by `titlecase` and skipped by short-title keys
    static ref FUNCTION_WORDS: AHashSet<&'static str> = [
        "a", "an", "the", "above", "about", "across", "against", "along", "among", "around",
        "at", "before", "behind", "below", "beneath", "beside", "between", "beyond", "by",
        "down", "during", "except", "for", "from", "in", "inside", "into", "like", "near",
        "of", "off", "on", "onto", "since", "to", "toward", "through", "under", "until", "up",
        "upon", "with", "within", "without", "and", "but", "nor", "or", "so", "yet",
    ]
    .into_iter()
    .collect();

    static ref TRUNCATE: PatternModifier = PatternModifier {
        pattern: Regex::new(r"^trunc(\d+)$").expect("truncation pattern is valid"),
        func: truncate,
        arity: Some(0),
    };

    static ref BUILTIN: Arc<ModifierRegistry> = Arc::new(ModifierRegistry::default());
}

#[derive(Debug, Clone, Copy)]
enum Transform {
    Plain(ModifierFn),
    /// Regular-expression replacement; uses the call's compiled expression
    /// when it has one
    RegexReplace,
}

#[derive(Debug, Clone, Copy)]
struct Modifier {
    transform: Transform,
    /// Required argument count, when fixed
    arity: Option<usize>,
}

#[derive(Debug, Clone)]
struct PatternModifier {
    pattern: Regex,
    func: PatternModifierFn,
    arity: Option<usize>,
}

/// Mapping from modifier name to transformation
#[derive(Debug, Clone)]
pub struct ModifierRegistry {
    modifiers: AHashMap<String, Modifier>,
    patterns: Vec<PatternModifier>,
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert("lower", Transform::Plain(lower), Some(0));
        registry.insert("upper", Transform::Plain(upper), Some(0));
        registry.insert("capitalize", Transform::Plain(capitalize), Some(0));
        registry.insert("titlecase", Transform::Plain(title_case), Some(0));
        registry.insert("sentencecase", Transform::Plain(sentence_case), Some(0));
        registry.insert("abbr", Transform::Plain(abbreviate), Some(0));
        registry.insert(REGEX_MODIFIER, Transform::RegexReplace, Some(2));
        registry.insert(FALLBACK_MODIFIER, Transform::Plain(fallback), Some(1));
        registry.patterns.push(TRUNCATE.clone());
        registry
    }
}

impl ModifierRegistry {
    /// A registry without any modifiers
    #[must_use]
    pub fn empty() -> Self {
        Self {
            modifiers: AHashMap::new(),
            patterns: Vec::new(),
        }
    }

    /// The shared registry of built-in modifiers
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Add or replace a modifier
    pub fn register(&mut self, name: impl Into<String>, func: ModifierFn) {
        self.modifiers.insert(
            name.into(),
            Modifier {
                transform: Transform::Plain(func),
                arity: None,
            },
        );
    }

    /// Add a family of modifiers whose names match `pattern`
    ///
    /// Exact names win over patterns; patterns are tried in registration
    /// order.
    pub fn register_pattern(&mut self, pattern: &str, func: PatternModifierFn) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.push(PatternModifier {
            pattern: regex,
            func,
            arity: None,
        });
        Ok(())
    }

    fn insert(&mut self, name: &str, transform: Transform, arity: Option<usize>) {
        self.modifiers
            .insert(name.to_string(), Modifier { transform, arity });
    }

    fn matching_pattern<'n>(&self, name: &'n str) -> Option<(&PatternModifier, Captures<'n>)> {
        self.patterns
            .iter()
            .find_map(|p| p.pattern.captures(name).map(|caps| (p, caps)))
    }

    /// Whether `name` names a modifier, exactly or through a pattern
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modifiers.contains_key(name) || self.patterns.iter().any(|p| p.pattern.is_match(name))
    }

    /// Apply one modifier
    #[must_use]
    pub fn apply(&self, name: &str, args: &[String], input: &str) -> String {
        if let Some(modifier) = self.modifiers.get(name) {
            return match modifier.transform {
                Transform::Plain(func) => func(input, args),
                Transform::RegexReplace => regex_replace(input, args),
            };
        }
        if let Some((modifier, caps)) = self.matching_pattern(name) {
            return (modifier.func)(input, &caps, args);
        }

        tracing::debug!(modifier = name, "unknown modifier ignored");
        input.to_string()
    }

    /// Apply one parsed call, reusing its compiled expression if it has one
    #[must_use]
    pub fn apply_call(&self, call: &ModifierCall, input: &str) -> String {
        if let (
            Some(Modifier {
                transform: Transform::RegexReplace,
                ..
            }),
            Some(re),
            [_, replacement],
        ) = (self.modifiers.get(call.name()), call.regex(), call.args())
        {
            return re.replace_all(input, replacement.as_str()).into_owned();
        }
        self.apply(call.name(), call.args(), input)
    }

    /// Apply modifiers left to right
    #[must_use]
    pub fn apply_chain(&self, calls: &[ModifierCall], input: String) -> String {
        calls
            .iter()
            .fold(input, |value, call| self.apply_call(call, &value))
    }

    /// Check that a call names a known modifier with usable arguments
    pub fn check(&self, call: &ModifierCall) -> Result<()> {
        let modifier = self.modifiers.get(call.name());
        let arity = match (modifier, self.matching_pattern(call.name())) {
            (Some(modifier), _) => modifier.arity,
            (None, Some((modifier, _))) => modifier.arity,
            (None, None) => {
                return Err(Error::UnknownModifier {
                    name: call.name().to_string(),
                })
            }
        };

        if let Some(expected) = arity {
            if call.args().len() != expected {
                return Err(Error::ModifierArity {
                    name: call.name().to_string(),
                    expected,
                    found: call.args().len(),
                });
            }
        }

        if let (
            Some(Modifier {
                transform: Transform::RegexReplace,
                ..
            }),
            Some(pattern),
        ) = (modifier, call.args().first())
        {
            Regex::new(pattern).map_err(|source| Error::InvalidRegex {
                pattern: pattern.clone(),
                source,
            })?;
        }

        Ok(())
    }
}

/// Whether `word` is a function word such as `the` or `of`
pub(crate) fn is_function_word(word: &str) -> bool {
    FUNCTION_WORDS.contains(word.to_lowercase().as_str())
}

/// Uppercase the first character and lowercase the rest
pub(crate) fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn truncate(input: &str, caps: &Captures<'_>, _args: &[String]) -> String {
    let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) else {
        return input.to_string();
    };
    let head: String = input.chars().take(n).collect();
    head.trim_end().to_string()
}

/// Rewrite each whitespace-separated word, keeping the separators as they
/// are; `f` gets the word, whether it is the first or the last word, and
/// returns its replacement
fn map_words(input: &str, mut f: impl FnMut(&str, bool, bool) -> String) -> String {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in input.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(s..input.len());
    }

    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    for (i, word) in words.iter().enumerate() {
        out.push_str(&input[copied..word.start]);
        out.push_str(&f(&input[word.clone()], i == 0, i + 1 == words.len()));
        copied = word.end;
    }
    out.push_str(&input[copied..]);
    out
}

fn lower(input: &str, _args: &[String]) -> String {
    input.to_lowercase()
}

fn upper(input: &str, _args: &[String]) -> String {
    input.to_uppercase()
}

fn capitalize(input: &str, _args: &[String]) -> String {
    map_words(input, |w, _, _| capitalize_word(w))
}

fn title_case(input: &str, _args: &[String]) -> String {
    map_words(input, |w, first, last| {
        if !first && !last && is_function_word(w) {
            w.to_lowercase()
        } else {
            capitalize_word(w)
        }
    })
}

fn sentence_case(input: &str, _args: &[String]) -> String {
    map_words(input, |w, first, _| {
        if first {
            capitalize_word(w)
        } else {
            w.to_lowercase()
        }
    })
}

fn abbreviate(input: &str, _args: &[String]) -> String {
    input
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect()
}

fn regex_replace(input: &str, args: &[String]) -> String {
    let [pattern, replacement] = args else {
        tracing::warn!(found = args.len(), "regex modifier needs exactly two arguments");
        return input.to_string();
    };

    match Regex::new(pattern) {
        Ok(re) => re.replace_all(input, replacement.as_str()).into_owned(),
        Err(err) => {
            tracing::warn!(pattern = pattern.as_str(), error = %err, "invalid regex in modifier");
            input.to_string()
        }
    }
}

fn fallback(input: &str, args: &[String]) -> String {
    match args.first() {
        Some(text) if input.is_empty() => text.clone(),
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, args: &[&str], input: &str) -> String {
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        ModifierRegistry::default().apply(name, &args, input)
    }

    #[test]
    fn test_lower_is_unicode_aware() {
        assert_eq!(apply("lower", &[], "Misc"), "misc");
        assert_eq!(apply("lower", &[], "GRAŽULIS Ödön"), "gražulis ödön");
        assert_eq!(apply("lower", &[], "already lower"), "already lower");
    }

    #[test]
    fn test_upper() {
        assert_eq!(apply("upper", &[], "gražulis"), "GRAŽULIS");
    }

    #[test]
    fn test_regex() {
        assert_eq!(
            apply("regex", &["Organization", "JabRef"], "Organization Science"),
            "JabRef Science"
        );
        assert_eq!(apply("regex", &["o", "0"], "foo boo"), "f00 b00");
        assert_eq!(apply("regex", &["xyz", "0"], "unchanged"), "unchanged");
        assert_eq!(apply("regex", &[r"(\d+)-(\d+)", "$2-$1"], "1-2"), "2-1");
    }

    #[test]
    fn test_regex_with_bad_arguments_passes_through() {
        assert_eq!(apply("regex", &["only one"], "input"), "input");
        assert_eq!(apply("regex", &["(", "x"], "input"), "input");
    }

    #[test]
    fn test_unknown_modifier_passes_through() {
        assert_eq!(apply("frobnicate", &[], "Input"), "Input");
        assert_eq!(apply("", &[], "Input"), "Input");
    }

    #[test]
    fn test_case_modifiers() {
        assert_eq!(apply("capitalize", &[], "the art OF computer"), "The Art Of Computer");
        assert_eq!(
            apply("titlecase", &[], "the art of computer programming"),
            "The Art of Computer Programming"
        );
        assert_eq!(apply("titlecase", &[], "a tale of"), "A Tale Of");
        assert_eq!(
            apply("sentencecase", &[], "THE ART of Computer"),
            "The art of computer"
        );
    }

    #[test]
    fn test_case_modifiers_keep_whitespace() {
        let title = "the\nart of\tcomputer";
        assert_eq!(apply("capitalize", &[], title), "The\nArt Of\tComputer");
        assert_eq!(apply("titlecase", &[], title), "The\nArt of\tComputer");
        assert_eq!(apply("sentencecase", &[], "  THE\r\nART "), "  The\r\nart ");
        assert_eq!(apply("capitalize", &[], " \t "), " \t ");
    }

    #[test]
    fn test_abbr() {
        assert_eq!(apply("abbr", &[], "Organization Science"), "OS");
        assert_eq!(apply("abbr", &[], ""), "");
    }

    #[test]
    fn test_truncation() {
        assert_eq!(apply("trunc3", &[], "Gražulis"), "Gra");
        assert_eq!(apply("trunc4", &[], "ab cd"), "ab c");
        assert_eq!(apply("trunc3", &[], "ab cd"), "ab");
        assert_eq!(apply("trunc10", &[], "short"), "short");
        assert_eq!(apply("trunc", &[], "unchanged"), "unchanged");
        assert_eq!(apply("trunc2x", &[], "unchanged"), "unchanged");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(apply(FALLBACK_MODIFIER, &["Anonymous"], ""), "Anonymous");
        assert_eq!(apply(FALLBACK_MODIFIER, &["Anonymous"], "Kitsune"), "Kitsune");
    }

    #[test]
    fn test_chain_applies_left_to_right() {
        let registry = ModifierRegistry::default();
        let calls = vec![
            ModifierCall::new("regex", vec!["Organization".into(), "JabRef".into()]),
            ModifierCall::new("upper", Vec::new()),
            ModifierCall::new("trunc6", Vec::new()),
        ];
        assert_eq!(
            registry.apply_chain(&calls, "Organization Science".to_string()),
            "JABREF"
        );
    }

    #[test]
    fn test_empty_registry_has_no_modifiers() {
        let registry = ModifierRegistry::empty();
        assert!(!registry.contains("lower"));
        assert!(!registry.contains("trunc3"));
        assert_eq!(registry.apply("trunc3", &[], "Hello"), "Hello");
        assert_eq!(registry.apply("upper", &[], "Hello"), "Hello");
        assert!(matches!(
            registry.check(&ModifierCall::new("trunc3", Vec::new())),
            Err(Error::UnknownModifier { .. })
        ));
    }

    #[test]
    fn test_regex_call_uses_compiled_expression() {
        let registry = ModifierRegistry::default();
        let call = ModifierCall::new("regex", vec![r"(\w+) (\w+)".into(), "$2 $1".into()]);
        assert!(call.regex().is_some());
        assert_eq!(registry.apply_call(&call, "Organization Science"), "Science Organization");

        let bad = ModifierCall::new("regex", vec!["(".into(), "x".into()]);
        assert_eq!(registry.apply_call(&bad, "input"), "input");
    }

    #[test]
    fn test_custom_regex_modifier_overrides_compiled_expression() {
        fn shout(input: &str, _args: &[String]) -> String {
            input.to_uppercase()
        }

        let mut registry = ModifierRegistry::default();
        registry.register("regex", shout);
        let call = ModifierCall::new("regex", vec!["a".into(), "b".into()]);
        assert_eq!(registry.apply_call(&call, "banana"), "BANANA");
    }

    #[test]
    fn test_register_pattern_modifier() {
        fn repeat(input: &str, caps: &Captures<'_>, _args: &[String]) -> String {
            let n = caps[1].parse().unwrap_or(1);
            input.repeat(n)
        }

        let mut registry = ModifierRegistry::empty();
        registry.register_pattern(r"^repeat(\d)$", repeat).unwrap();
        assert!(registry.contains("repeat3"));
        assert_eq!(registry.apply("repeat3", &[], "ab"), "ababab");
        assert!(registry.check(&ModifierCall::new("repeat2", Vec::new())).is_ok());
        assert!(matches!(
            registry.register_pattern("(", repeat),
            Err(Error::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_register_custom_modifier() {
        fn reverse(input: &str, _args: &[String]) -> String {
            input.chars().rev().collect()
        }

        let mut registry = ModifierRegistry::default();
        registry.register("reverse", reverse);
        assert_eq!(registry.apply("reverse", &[], "abc"), "cba");
        assert!(registry.check(&ModifierCall::new("reverse", vec!["any".into()])).is_ok());
    }

    #[test]
    fn test_check() {
        let registry = ModifierRegistry::default();
        assert!(registry.check(&ModifierCall::new("lower", Vec::new())).is_ok());
        assert!(registry.check(&ModifierCall::new("trunc5", Vec::new())).is_ok());
        assert!(matches!(
            registry.check(&ModifierCall::new("nope", Vec::new())),
            Err(Error::UnknownModifier { .. })
        ));
        assert!(matches!(
            registry.check(&ModifierCall::new("regex", vec!["a".into()])),
            Err(Error::ModifierArity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            registry.check(&ModifierCall::new("regex", vec!["(".into(), "x".into()])),
            Err(Error::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_function_words() {
        assert!(is_function_word("The"));
        assert!(is_function_word("of"));
        assert!(!is_function_word("Science"));
    }
}
