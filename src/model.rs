//! Data models for bibliographic records

use std::borrow::Cow;
use std::fmt;

/// Name of the field that carries a record's cross-reference key
pub const CROSSREF_FIELD: &str = "crossref";

/// A bibliographic record (article, book, etc.)
///
/// Field names are matched case-insensitively and are unique within a
/// record: setting a field that already exists replaces its value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry<'a> {
    /// Entry type (article, book, inproceedings, etc.)
    pub ty: EntryType<'a>,
    /// Citation key, if the record has one
    pub key: Option<Cow<'a, str>>,
    /// Fields (author, title, year, etc.)
    pub fields: Vec<Field<'a>>,
}

impl<'a> Entry<'a> {
    /// Create a new entry without a citation key or fields
    #[must_use]
    pub const fn new(ty: EntryType<'a>) -> Self {
        Self {
            ty,
            key: None,
            fields: Vec::new(),
        }
    }

    /// Set the citation key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Cow<'a, str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a field
    #[must_use]
    pub fn with_field(
        mut self,
        name: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) -> Self {
        self.set(name, value);
        self
    }

    /// Get the entry type
    #[must_use]
    pub const fn entry_type(&self) -> &EntryType<'a> {
        &self.ty
    }

    /// Change the entry type
    pub fn set_type(&mut self, ty: EntryType<'a>) {
        self.ty = ty;
    }

    /// Get the record's own citation key
    ///
    /// An empty key is reported as no key.
    #[must_use]
    pub fn citation_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    /// Set the citation key
    pub fn set_citation_key(&mut self, key: impl Into<Cow<'a, str>>) {
        self.key = Some(key.into());
    }

    /// Get the key of the parent record this record cross-references
    #[must_use]
    pub fn crossref(&self) -> Option<&str> {
        self.get(CROSSREF_FIELD)
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Get a field value by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_ref())
    }

    /// Check whether a field is present
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, replacing any existing value under the same name
    ///
    /// Returns the previous value, if any.
    pub fn set(
        &mut self,
        name: impl Into<Cow<'a, str>>,
        value: impl Into<Cow<'a, str>>,
    ) -> Option<Cow<'a, str>> {
        let name = name.into();
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(&name))
        {
            Some(field) => Some(std::mem::replace(&mut field.value, value)),
            None => {
                self.fields.push(Field { name, value });
                None
            }
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Cow<'a, str>> {
        let pos = self
            .fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))?;
        Some(self.fields.remove(pos).value)
    }

    /// Get all fields
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Entry<'static> {
        Entry {
            ty: self.ty.into_owned(),
            key: self.key.map(|k| Cow::Owned(k.into_owned())),
            fields: self.fields.into_iter().map(Field::into_owned).collect(),
        }
    }
}

/// BibTeX entry type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EntryType<'a> {
    /// Article from a journal
    Article,
    /// Book with publisher
    Book,
    /// Part of a book
    InBook,
    /// Article in conference proceedings
    InProceedings,
    /// Conference proceedings
    Proceedings,
    /// Master's thesis
    MastersThesis,
    /// `PhD` thesis
    PhdThesis,
    /// Technical report
    TechReport,
    /// Unpublished work
    Unpublished,
    /// Miscellaneous
    #[default]
    Misc,
    /// Custom entry type
    Custom(Cow<'a, str>),
}

impl<'a> EntryType<'a> {
    /// Parse from string (case-insensitive)
    #[must_use]
    pub fn parse(s: &'a str) -> Self {
        match s.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "inbook" => Self::InBook,
            "inproceedings" | "conference" => Self::InProceedings,
            "proceedings" => Self::Proceedings,
            "mastersthesis" => Self::MastersThesis,
            "phdthesis" => Self::PhdThesis,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            "misc" => Self::Misc,
            _ => Self::Custom(Cow::Borrowed(s)),
        }
    }

    /// Name shown to users, e.g. `Misc` or `InProceedings`
    ///
    /// Custom types get their first letter uppercased.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        let name = match self {
            Self::Article => "Article",
            Self::Book => "Book",
            Self::InBook => "InBook",
            Self::InProceedings => "InProceedings",
            Self::Proceedings => "Proceedings",
            Self::MastersThesis => "MastersThesis",
            Self::PhdThesis => "PhdThesis",
            Self::TechReport => "TechReport",
            Self::Unpublished => "Unpublished",
            Self::Misc => "Misc",
            Self::Custom(s) => {
                let mut chars = s.chars();
                return match chars.next() {
                    Some(first) if !first.is_uppercase() => {
                        Cow::Owned(first.to_uppercase().chain(chars).collect())
                    }
                    _ => Cow::Borrowed(s.as_ref()),
                };
            }
        };
        Cow::Borrowed(name)
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> EntryType<'static> {
        match self {
            Self::Custom(s) => EntryType::Custom(Cow::Owned(s.into_owned())),
            Self::Article => EntryType::Article,
            Self::Book => EntryType::Book,
            Self::InBook => EntryType::InBook,
            Self::InProceedings => EntryType::InProceedings,
            Self::Proceedings => EntryType::Proceedings,
            Self::MastersThesis => EntryType::MastersThesis,
            Self::PhdThesis => EntryType::PhdThesis,
            Self::TechReport => EntryType::TechReport,
            Self::Unpublished => EntryType::Unpublished,
            Self::Misc => EntryType::Misc,
        }
    }
}

impl fmt::Display for EntryType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Book => write!(f, "book"),
            Self::InBook => write!(f, "inbook"),
            Self::InProceedings => write!(f, "inproceedings"),
            Self::Proceedings => write!(f, "proceedings"),
            Self::MastersThesis => write!(f, "mastersthesis"),
            Self::PhdThesis => write!(f, "phdthesis"),
            Self::TechReport => write!(f, "techreport"),
            Self::Unpublished => write!(f, "unpublished"),
            Self::Misc => write!(f, "misc"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A field in a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Field name
    pub name: Cow<'a, str>,
    /// Field value
    pub value: Cow<'a, str>,
}

impl<'a> Field<'a> {
    /// Create a new field
    #[must_use]
    pub const fn new(name: &'a str, value: &'a str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value: Cow::Borrowed(value),
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Field<'static> {
        Field {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}
