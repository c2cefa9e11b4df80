//! # bracketed-pattern
//!
//! Expand bracketed citation-key patterns such as `[auth][year]` against
//! bibliographic records.
//!
//! ## Features
//!
//! - Patterns compile once and expand against any number of records
//! - Built-in keys for authors, editors, pages, titles and keywords
//! - Modifier chains: `[auth:lower:trunc4]`, `[journal:regex("a", "b")]`
//! - Field inheritance through `crossref` and `#macro#` expansion
//! - Malformed patterns and missing data degrade to empty text, never panic
//!
//! ## Example
//!
//! ```
//! use bracketed_pattern::{BracketedPattern, DatabaseBuilder, Entry, EntryType};
//!
//! let db = DatabaseBuilder::new()
//!     .string("os", "Organization Science")
//!     .build();
//!
//! let record = Entry::new(EntryType::Article)
//!     .with_key("HipKro03")
//!     .with_field("author", "Eric von Hippel and Georg von Krogh")
//!     .with_field("journal", "#os#")
//!     .with_field("year", "2003");
//!
//! let pattern = BracketedPattern::new(r#"[auth:lower][year]-[journal:regex("Organization", "Org")]"#);
//! assert_eq!(pattern.expand(&record, Some(&db))?, "hippel2003-Org Science");
//! # Ok::<(), bracketed_pattern::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs,
    missing_debug_implementations
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod keys;
pub mod model;
pub mod modifiers;
pub mod names;
pub mod parser;
pub mod resolver;

mod database;
mod pattern;

pub use database::{Database, DatabaseBuilder};
pub use error::{Error, Result};
pub use keys::{KeyContext, KeyHandler, KeyRegistry, PatternKeyHandler};
pub use model::{Entry, EntryType, Field};
pub use modifiers::{ModifierFn, ModifierRegistry, PatternModifierFn};
pub use pattern::{expand_brackets, BracketedPattern, PatternBuilder, DEFAULT_SEPARATOR};

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::{
        BracketedPattern, Database, DatabaseBuilder, Entry, EntryType, Error, PatternBuilder,
        Result,
    };
}

/// Compile a pattern with the default separator
#[must_use]
pub fn compile(source: &str) -> BracketedPattern {
    BracketedPattern::compile(source)
}
