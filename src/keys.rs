//! Built-in keys that compute a value instead of reading a field
//!
//! Keys are looked up by exact (case-sensitive) name first, then matched
//! against the registry's key patterns. The built-in patterns cover the
//! numbered forms (`authN`, `authN_M`, `authorsN`, `edtrN`, `keywordN`,
//! `keywordsN`). Anything else is read as a field.

use crate::modifiers::{capitalize_word, is_function_word};
use crate::names::NameList;
use crate::resolver::resolve_field;
use crate::{Database, Entry, Error, Result};
use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::sync::Arc;

/// Signature of a key handler
pub type KeyHandler = fn(&KeyContext<'_>) -> String;

/// Signature of a handler for keys matched by pattern; it also receives the
/// captures of the pattern against the key
pub type PatternKeyHandler = fn(&KeyContext<'_>, &Captures<'_>) -> String;

lazy_static! {
    static ref NUMBERED_KEYS: Vec<PatternKey> = {
        let table: [(&str, PatternKeyHandler); 6] = [
            (r"^auth(\d+)$", |ctx, caps| {
                number(caps, 1).map_or_else(String::new, |n| ctx.authors().last_name_prefix(0, n))
            }),
            (r"^auth(\d+)_(\d+)$", nth_author_prefix),
            (r"^authors(\d+)$", |ctx, caps| {
                number(caps, 1).map_or_else(String::new, |n| ctx.authors().first_n_last_names(n))
            }),
            (r"^edtr(\d+)$", |ctx, caps| {
                number(caps, 1).map_or_else(String::new, |n| ctx.editors().last_name_prefix(0, n))
            }),
            (r"^keyword(\d+)$", |ctx, caps| {
                number(caps, 1)
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| ctx.keywords().into_iter().nth(i))
                    .unwrap_or_default()
            }),
            (r"^keywords(\d+)$", |ctx, caps| {
                number(caps, 1)
                    .map(|n| ctx.keywords().into_iter().take(n).collect())
                    .unwrap_or_default()
            }),
        ];
        table
            .into_iter()
            .map(|(pattern, handler)| PatternKey {
                pattern: Regex::new(pattern).expect("numbered key patterns are valid"),
                handler,
            })
            .collect()
    };

    static ref BUILTIN: Arc<KeyRegistry> = Arc::new(KeyRegistry::default());
}

/// Everything a key handler may look at
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'c> {
    /// The record being expanded
    pub record: &'c Entry<'c>,
    /// Store for macros and cross-references, if any
    pub store: Option<&'c Database<'c>>,
    /// Separator for list-valued fields such as `keywords`
    pub separator: char,
}

impl<'c> KeyContext<'c> {
    /// Create a context
    #[must_use]
    pub const fn new(record: &'c Entry<'c>, store: Option<&'c Database<'c>>, separator: char) -> Self {
        Self {
            record,
            store,
            separator,
        }
    }

    /// Resolve a field of the record
    #[must_use]
    pub fn field(&self, name: &str) -> String {
        resolve_field(self.record, name, self.store)
    }

    /// Persons of the `author` field
    #[must_use]
    pub fn authors(&self) -> NameList {
        NameList::parse(&self.field("author"))
    }

    /// Persons of the `editor` field
    #[must_use]
    pub fn editors(&self) -> NameList {
        NameList::parse(&self.field("editor"))
    }

    /// Entries of the `keywords` field, split by the separator
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        self.field("keywords")
            .split(self.separator)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone)]
struct PatternKey {
    pattern: Regex,
    handler: PatternKeyHandler,
}

/// Mapping from key name to handler
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    handlers: AHashMap<String, KeyHandler>,
    patterns: Vec<PatternKey>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let builtins: [(&str, KeyHandler); 22] = [
            ("entrytype", entry_type),
            ("bibtexkey", citation_key),
            ("auth", |ctx| ctx.authors().first_last_name()),
            ("pureauth", |ctx| ctx.authors().first_last_name()),
            ("authors", |ctx| ctx.authors().concat_last_names()),
            ("authFirstFull", |ctx| ctx.authors().first_von_last()),
            ("authForeIni", |ctx| ctx.authors().first_fore_initial()),
            ("authorLast", |ctx| ctx.authors().last_last_name()),
            ("authEtAl", |ctx| ctx.authors().et_al("", "EtAl")),
            ("auth.etal", |ctx| ctx.authors().et_al(".", ".etal")),
            ("authorIni", |ctx| ctx.authors().last_name_initials()),
            ("edtr", |ctx| ctx.editors().first_last_name()),
            ("editors", |ctx| ctx.editors().concat_last_names()),
            ("editorLast", |ctx| ctx.editors().last_last_name()),
            ("firstpage", first_page),
            ("lastpage", last_page),
            ("pageprefix", page_prefix),
            ("shortyear", short_year),
            ("shorttitle", |ctx| short_title(&ctx.field("title"), 3)),
            ("veryshorttitle", |ctx| short_title(&ctx.field("title"), 1)),
            ("camel", camel),
            ("citationkey", citation_key),
        ];
        for (name, handler) in builtins {
            registry.register(name, handler);
        }
        registry.patterns.extend(NUMBERED_KEYS.iter().cloned());
        registry
    }
}

impl KeyRegistry {
    /// A registry without any keys; every key reads a field
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: AHashMap::new(),
            patterns: Vec::new(),
        }
    }

    /// The shared registry of built-in keys
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Add or replace a key handler
    pub fn register(&mut self, name: impl Into<String>, handler: KeyHandler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Add a handler for every key matching `pattern`
    ///
    /// Exact names win over patterns; patterns are tried in registration
    /// order.
    pub fn register_pattern(&mut self, pattern: &str, handler: PatternKeyHandler) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.push(PatternKey {
            pattern: regex,
            handler,
        });
        Ok(())
    }

    /// Whether `key` is handled without falling back to a field lookup
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key) || self.patterns.iter().any(|p| p.pattern.is_match(key))
    }

    /// Compute the value of `key`
    #[must_use]
    pub fn resolve(&self, key: &str, ctx: &KeyContext<'_>) -> String {
        if let Some(handler) = self.handlers.get(key) {
            return handler(ctx);
        }
        let matched = self
            .patterns
            .iter()
            .find_map(|p| p.pattern.captures(key).map(|caps| (p.handler, caps)));
        if let Some((handler, caps)) = matched {
            return handler(ctx, &caps);
        }

        let value = ctx.field(key);
        if value.is_empty() {
            tracing::debug!(key, "key resolved to an empty value");
        }
        value
    }
}

/// Capture group `group` of a numbered key, as a number
fn number(caps: &Captures<'_>, group: usize) -> Option<usize> {
    caps.get(group)?.as_str().parse().ok()
}

/// `authN_M`: first N characters of the M-th author's last name
fn nth_author_prefix(ctx: &KeyContext<'_>, caps: &Captures<'_>) -> String {
    match (number(caps, 1), number(caps, 2).and_then(|m| m.checked_sub(1))) {
        (Some(n), Some(index)) => ctx.authors().last_name_prefix(index, n),
        _ => String::new(),
    }
}

fn entry_type(ctx: &KeyContext<'_>) -> String {
    ctx.record.entry_type().display_name().into_owned()
}

fn citation_key(ctx: &KeyContext<'_>) -> String {
    ctx.record.citation_key().unwrap_or_default().to_string()
}

const RANGE_SEPARATORS: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

/// Split `pages` into the parts before and after its range separator
fn page_range(pages: &str) -> (&str, Option<&str>) {
    match pages.find(RANGE_SEPARATORS) {
        Some(pos) => (
            &pages[..pos],
            Some(pages[pos..].trim_start_matches(RANGE_SEPARATORS)),
        ),
        None => (pages, None),
    }
}

/// The first run of ASCII digits in `s`
fn digit_run(s: &str) -> &str {
    let Some(start) = s.find(|c: char| c.is_ascii_digit()) else {
        return "";
    };
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    &rest[..end]
}

fn first_page(ctx: &KeyContext<'_>) -> String {
    let pages = ctx.field("pages");
    digit_run(page_range(&pages).0).to_string()
}

fn last_page(ctx: &KeyContext<'_>) -> String {
    let pages = ctx.field("pages");
    match page_range(&pages) {
        (first, None) => digit_run(first),
        (first, Some(last)) => match digit_run(last) {
            "" => digit_run(first),
            run => run,
        },
    }
    .to_string()
}

fn page_prefix(ctx: &KeyContext<'_>) -> String {
    let pages = ctx.field("pages");
    let first = page_range(&pages).0.trim_start();
    let end = first
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(first.len());
    first[..end].trim_end().to_string()
}

fn short_year(ctx: &KeyContext<'_>) -> String {
    let year = ctx.field("year");
    let digits = digit_run(&year);
    let skip = digits.len().saturating_sub(2);
    digits[skip..].to_string()
}

/// Words of a title with braces and punctuation removed
fn title_words(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
}

fn short_title(title: &str, words: usize) -> String {
    title_words(title)
        .filter(|w| !is_function_word(w))
        .take(words)
        .map(|w| capitalize_word(&w))
        .collect()
}

fn camel(ctx: &KeyContext<'_>) -> String {
    title_words(&ctx.field("title"))
        .map(|w| capitalize_word(&w))
        .collect()
}
