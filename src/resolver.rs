//! Field resolution with macro expansion and cross-reference inheritance
//!
//! A record that cross-references a parent inherits a fixed set of content
//! fields from it, one level deep. The citation key is never inherited.

use crate::{Database, Entry};
use std::borrow::Cow;

/// Fields a record inherits from the parent named by its `crossref`
pub const INHERITABLE_FIELDS: &[&str] = &[
    "author",
    "editor",
    "title",
    "booktitle",
    "maintitle",
    "journal",
    "journaltitle",
    "publisher",
    "organization",
    "institution",
    "school",
    "address",
    "location",
    "series",
    "volume",
    "number",
    "edition",
    "year",
    "date",
    "month",
    "isbn",
    "issn",
    "language",
];

/// Pseudo-field names that read the record's own citation key
pub const CITATION_KEY_FIELDS: &[&str] = &["bibtexkey", "citationkey"];

/// Whether `field` is inherited through a cross-reference
#[must_use]
pub fn is_inheritable(field: &str) -> bool {
    INHERITABLE_FIELDS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(field))
}

/// Whether `field` names the citation key
#[must_use]
pub fn is_citation_key_field(field: &str) -> bool {
    CITATION_KEY_FIELDS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(field))
}

/// Resolve a field of `record` to text
///
/// Never fails: anything that cannot be resolved yields the empty string.
#[must_use]
pub fn resolve_field(record: &Entry<'_>, field: &str, store: Option<&Database<'_>>) -> String {
    resolve(record, field, store).map_or_else(String::new, Cow::into_owned)
}

/// Like [`resolve_field`], but `None` when nothing resolves
///
/// Borrows from the record or the store when no macro had to be expanded.
#[must_use]
pub fn resolve<'r>(
    record: &'r Entry<'_>,
    field: &str,
    store: Option<&'r Database<'_>>,
) -> Option<Cow<'r, str>> {
    if field.is_empty() {
        return None;
    }

    if is_citation_key_field(field) {
        return record.citation_key().map(Cow::Borrowed);
    }

    if let Some(value) = record.get(field) {
        return Some(match store {
            Some(db) => db.expand_macros(value),
            None => Cow::Borrowed(value),
        });
    }

    if !is_inheritable(field) {
        return None;
    }

    let parent_key = record.crossref()?;
    let Some(db) = store else {
        tracing::debug!(field, parent = parent_key, "no store to resolve cross-reference");
        return None;
    };
    let Some(parent) = db.find_by_key(parent_key) else {
        tracing::debug!(field, parent = parent_key, "cross-referenced parent not found");
        return None;
    };

    parent.get(field).map(|value| db.expand_macros(value))
}
