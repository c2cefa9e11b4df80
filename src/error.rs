//! Error types for the bracketed-pattern crate

use thiserror::Error;

/// Result type for bracketed-pattern operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bracketed-pattern
///
/// Expansion only ever fails with [`Error::MissingRecord`] or
/// [`Error::UncompiledPattern`]. The remaining variants are reported by
/// [`BracketedPattern::validate`](crate::BracketedPattern::validate).
#[derive(Error, Debug)]
pub enum Error {
    /// Expansion was requested without a record to expand against
    #[error("Cannot expand a pattern without a record")]
    MissingRecord,

    /// The pattern was never compiled from a source string
    #[error("Pattern has no compiled source")]
    UncompiledPattern,

    /// A modifier name that the registry does not know
    #[error("Unknown modifier '{name}'")]
    UnknownModifier {
        /// The modifier name as written in the pattern
        name: String,
    },

    /// A modifier called with the wrong number of arguments
    #[error("Modifier '{name}' expects {expected} argument(s), found {found}")]
    ModifierArity {
        /// The modifier name
        name: String,
        /// Number of arguments the modifier takes
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },

    /// A `regex` modifier whose pattern does not compile
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        /// The offending expression
        pattern: String,
        /// Error reported by the regex engine
        #[source]
        source: regex::Error,
    },
}
