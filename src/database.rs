//! Record store with string macros

use crate::Entry;
use ahash::AHashMap;
use std::borrow::Cow;

/// A collection of records plus the `@string` macros they may reference
///
/// Records are looked up by citation key. Macro names are
/// case-insensitive, as in BibTeX.
#[derive(Debug, Clone, Default)]
pub struct Database<'a> {
    /// Bibliography entries
    entries: Vec<Entry<'a>>,
    /// String definitions, keyed by lowercase name
    strings: AHashMap<Cow<'a, str>, Cow<'a, str>>,
}

impl<'a> Database<'a> {
    /// Create a new empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all entries
    #[must_use]
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Get all string definitions
    #[must_use]
    pub const fn strings(&self) -> &AHashMap<Cow<'a, str>, Cow<'a, str>> {
        &self.strings
    }

    /// Add an entry
    ///
    /// An entry whose citation key is already taken replaces the stored
    /// entry, which is returned. Entries without a key are always appended.
    pub fn add_entry(&mut self, entry: Entry<'a>) -> Option<Entry<'a>> {
        if let Some(key) = entry.citation_key() {
            if let Some(pos) = self
                .entries
                .iter()
                .position(|e| e.citation_key() == Some(key))
            {
                return Some(std::mem::replace(&mut self.entries[pos], entry));
            }
        }
        self.entries.push(entry);
        None
    }

    /// Remove the entry with the given citation key
    pub fn remove_entry(&mut self, key: &str) -> Option<Entry<'a>> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.citation_key() == Some(key))?;
        Some(self.entries.remove(pos))
    }

    /// Find an entry by citation key
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&Entry<'a>> {
        self.entries.iter().find(|e| e.citation_key() == Some(key))
    }

    /// Add a string definition, replacing any previous one of the same name
    pub fn add_string(&mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) {
        self.strings.insert(normalize_name(name.into()), value.into());
    }

    /// Look up the replacement text of a string macro
    #[must_use]
    pub fn lookup_macro(&self, name: &str) -> Option<&str> {
        let value = if name.chars().any(char::is_uppercase) {
            self.strings.get(name.to_lowercase().as_str())
        } else {
            self.strings.get(name)
        };
        value.map(AsRef::as_ref)
    }

    /// Replace every `#name#` alias in `text` with its macro text
    ///
    /// Macro bodies are expanded in turn. Aliases that are undefined, or
    /// that would recurse into themselves, are left verbatim. Text without
    /// any `#` is returned borrowed.
    #[must_use]
    pub fn expand_macros<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if memchr::memchr(b'#', text.as_bytes()).is_none() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut stack = Vec::new();
        self.expand_macros_into(text, &mut out, &mut stack);
        Cow::Owned(out)
    }

    fn expand_macros_into(&self, text: &str, out: &mut String, stack: &mut Vec<String>) {
        let mut rest = text;

        while let Some(start) = memchr::memchr(b'#', rest.as_bytes()) {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let Some(end) = memchr::memchr(b'#', after.as_bytes()) else {
                // Lone '#', nothing left to pair it with
                out.push_str(&rest[start..]);
                return;
            };

            let name = &after[..end];
            let lowered = name.to_lowercase();
            match self.lookup_macro(name) {
                Some(body) if !name.is_empty() && !stack.contains(&lowered) => {
                    stack.push(lowered);
                    self.expand_macros_into(body, out, stack);
                    stack.pop();
                }
                Some(_) => {
                    tracing::debug!(alias = name, "recursive macro alias left verbatim");
                    push_alias(out, name);
                }
                None => {
                    tracing::debug!(alias = name, "undefined macro alias left verbatim");
                    push_alias(out, name);
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
    }

    /// Convert to owned version (no borrowed data)
    #[must_use]
    pub fn into_owned(self) -> Database<'static> {
        Database {
            entries: self.entries.into_iter().map(Entry::into_owned).collect(),
            strings: self
                .strings
                .into_iter()
                .map(|(k, v)| (Cow::Owned(k.into_owned()), Cow::Owned(v.into_owned())))
                .collect(),
        }
    }
}

fn push_alias(out: &mut String, name: &str) {
    out.push('#');
    out.push_str(name);
    out.push('#');
}

fn normalize_name(name: Cow<'_, str>) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        name
    }
}

/// Builder for creating databases programmatically
#[derive(Debug, Default)]
pub struct DatabaseBuilder<'a> {
    db: Database<'a>,
}

impl<'a> DatabaseBuilder<'a> {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    #[must_use]
    pub fn entry(mut self, entry: Entry<'a>) -> Self {
        self.db.add_entry(entry);
        self
    }

    /// Add a string definition
    #[must_use]
    pub fn string(mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        self.db.add_string(name, value);
        self
    }

    /// Build the database
    #[must_use]
    pub fn build(self) -> Database<'a> {
        self.db
    }
}
