//! Compiled bracketed patterns and their expansion against records
//!
//! ```
//! use bracketed_pattern::{BracketedPattern, Entry, EntryType};
//!
//! let record = Entry::new(EntryType::Article)
//!     .with_field("author", "Kitsune, O.")
//!     .with_field("year", "2017");
//!
//! let pattern = BracketedPattern::new("[auth:lower][year]");
//! assert_eq!(pattern.expand(&record, None)?, "kitsune2017");
//! # Ok::<(), bracketed_pattern::Error>(())
//! ```

use crate::keys::{KeyContext, KeyRegistry};
use crate::modifiers::ModifierRegistry;
use crate::parser::{self, Segment};
use crate::{Database, Entry, Error, Result};
use std::fmt;
use std::sync::Arc;

/// Separator used for list-valued fields unless configured otherwise
pub const DEFAULT_SEPARATOR: char = ';';

/// A pattern compiled into literal and expression segments
///
/// Compiling never fails. A default-constructed pattern has no source and
/// refuses to expand.
#[derive(Debug, Clone)]
pub struct BracketedPattern {
    source: Option<String>,
    segments: Vec<Segment>,
    separator: char,
    modifiers: Arc<ModifierRegistry>,
    keys: Arc<KeyRegistry>,
}

impl Default for BracketedPattern {
    fn default() -> Self {
        Self {
            source: None,
            segments: Vec::new(),
            separator: DEFAULT_SEPARATOR,
            modifiers: ModifierRegistry::builtin(),
            keys: KeyRegistry::builtin(),
        }
    }
}

impl BracketedPattern {
    /// Compile a pattern with the default separator and built-in registries
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self::builder(source).build()
    }

    /// Same as [`BracketedPattern::new`]
    #[must_use]
    pub fn compile(source: impl Into<String>) -> Self {
        Self::new(source)
    }

    /// Compile a pattern that splits list fields on `separator`
    #[must_use]
    pub fn with_separator(source: impl Into<String>, separator: char) -> Self {
        Self::builder(source).separator(separator).build()
    }

    /// Start configuring a pattern
    #[must_use]
    pub fn builder(source: impl Into<String>) -> PatternBuilder {
        PatternBuilder::new(source)
    }

    /// The source text, if the pattern was compiled
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Compiled segments in source order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The configured separator
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Expand the pattern for `record`
    ///
    /// `store` supplies string macros and cross-referenced parents; without
    /// one, fields are read from the record alone.
    pub fn expand<'r>(
        &self,
        record: impl Into<Option<&'r Entry<'r>>>,
        store: Option<&'r Database<'r>>,
    ) -> Result<String> {
        self.expand_with_separator(record, self.separator, store)
    }

    /// Expand with a separator overriding the configured one
    pub fn expand_with_separator<'r>(
        &self,
        record: impl Into<Option<&'r Entry<'r>>>,
        separator: char,
        store: Option<&'r Database<'r>>,
    ) -> Result<String> {
        let record = record.into().ok_or(Error::MissingRecord)?;
        if self.source.is_none() {
            return Err(Error::UncompiledPattern);
        }

        Ok(self.render(&KeyContext::new(record, store, separator)))
    }

    fn render(&self, ctx: &KeyContext<'_>) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Expression(expr) => {
                    let value = self.keys.resolve(&expr.key, ctx);
                    let value = self.modifiers.apply_chain(&expr.modifiers, value);
                    tracing::trace!(key = expr.key.as_str(), value = value.as_str(), "expanded");
                    output.push_str(&value);
                }
            }
        }
        output
    }

    /// Check every modifier against the registry
    ///
    /// Reports the first unknown modifier, wrong argument count or invalid
    /// regular expression. Expansion tolerates all of these.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(Error::UncompiledPattern);
        }
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Expression(expr) => Some(&expr.modifiers),
                Segment::Literal(_) => None,
            })
            .flatten()
            .try_for_each(|call| self.modifiers.check(call))
    }
}

impl fmt::Display for BracketedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source.as_deref().unwrap_or_default())
    }
}

/// Builder for [`BracketedPattern`]
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    source: String,
    separator: char,
    modifiers: Arc<ModifierRegistry>,
    keys: Arc<KeyRegistry>,
}

impl PatternBuilder {
    /// Create a builder for `source`
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            separator: DEFAULT_SEPARATOR,
            modifiers: ModifierRegistry::builtin(),
            keys: KeyRegistry::builtin(),
        }
    }

    /// Set the list separator
    #[must_use]
    pub const fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Use a custom modifier registry
    #[must_use]
    pub fn modifiers(mut self, registry: impl Into<Arc<ModifierRegistry>>) -> Self {
        self.modifiers = registry.into();
        self
    }

    /// Use a custom key registry
    #[must_use]
    pub fn keys(mut self, registry: impl Into<Arc<KeyRegistry>>) -> Self {
        self.keys = registry.into();
        self
    }

    /// Compile the pattern
    #[must_use]
    pub fn build(self) -> BracketedPattern {
        let segments = parser::parse_pattern(&self.source);
        tracing::trace!(
            source = self.source.as_str(),
            segments = segments.len(),
            "compiled pattern"
        );
        BracketedPattern {
            source: Some(self.source),
            segments,
            separator: self.separator,
            modifiers: self.modifiers,
            keys: self.keys,
        }
    }
}

/// Compile `source` and expand it for `record` in one step
#[must_use]
pub fn expand_brackets(
    source: &str,
    separator: char,
    record: &Entry<'_>,
    store: Option<&Database<'_>>,
) -> String {
    BracketedPattern::with_separator(source, separator)
        .render(&KeyContext::new(record, store, separator))
}
