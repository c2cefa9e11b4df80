//! Personal-name parsing for author and editor fields
//!
//! A name list is a sequence of persons joined by the word `and` at brace
//! depth zero. Each person is written in one of the BibTeX forms:
//!
//! - `First von Last`
//! - `von Last, First`
//! - `von Last, Jr, First`
//!
//! A trailing `and others` marks the list as truncated instead of adding a
//! person. Braced groups such as `{Barnes and Noble}` are kept together.

/// Name particles that count as a von part in the comma form even when
/// capitalized, e.g. `Von Rosquist, Christine`
const PARTICLES: &[&str] = &[
    "von", "van", "de", "der", "den", "des", "di", "da", "du", "del", "della", "dos", "das", "la",
    "le", "ten", "ter", "zu", "zum", "zur", "vom", "af", "av", "bin", "ibn",
];

/// One person of a name list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Person {
    /// Given names or initials
    pub first: Option<String>,
    /// Surname particle such as `von` or `van der`
    pub von: Option<String>,
    /// Surname
    pub last: String,
    /// Suffix such as `Jr.`
    pub jr: Option<String>,
}

impl Person {
    /// Parse a single person
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let parts = split_top_level(name, ',');
        let parts: Vec<&str> = parts.iter().map(|p| p.trim()).collect();

        if parts.len() == 1 {
            return Self::from_words(&words(parts[0]));
        }

        let mut person = Self::from_von_last(&words(parts[0]))?;
        let (jr, first) = match parts.len() {
            2 => (None, parts[1].to_string()),
            _ => (Some(parts[1]), parts[2..].join(", ")),
        };
        person.jr = jr.and_then(non_empty);
        person.first = non_empty(&first);
        Some(person)
    }

    /// `First von Last`, split by the case of each word
    fn from_words(tokens: &[&str]) -> Option<Self> {
        let (&last_token, rest) = tokens.split_last()?;

        let Some(von_start) = rest.iter().position(|t| is_lowercase_leading(t)) else {
            return Some(Self {
                first: join_words(rest),
                last: strip_braces(last_token),
                ..Self::default()
            });
        };

        let von_end = rest
            .iter()
            .rposition(|t| is_lowercase_leading(t))
            .unwrap_or(von_start);

        Some(Self {
            first: join_words(&tokens[..von_start]),
            von: join_words(&tokens[von_start..=von_end]),
            last: join_words(&tokens[von_end + 1..]).unwrap_or_default(),
            jr: None,
        })
    }

    /// `von Last` in front of the first comma
    fn from_von_last(tokens: &[&str]) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }

        let von_len = tokens[..tokens.len() - 1]
            .iter()
            .take_while(|t| is_particle(t))
            .count();

        Some(Self {
            von: join_words(&tokens[..von_len]),
            last: join_words(&tokens[von_len..]).unwrap_or_default(),
            ..Self::default()
        })
    }

    /// Von part and surname, separated by a space
    #[must_use]
    pub fn von_last(&self) -> String {
        match &self.von {
            Some(von) => format!("{von} {}", self.last),
            None => self.last.clone(),
        }
    }

    /// First letter of the given names, case kept
    #[must_use]
    pub fn first_initial(&self) -> Option<char> {
        self.first
            .as_deref()
            .and_then(|f| f.chars().find(|c| c.is_alphanumeric()))
    }
}

/// The persons of an author or editor field, in source order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameList {
    persons: Vec<Person>,
    et_al: bool,
}

impl NameList {
    /// Parse a name list
    ///
    /// Empty or blank input gives an empty list.
    #[must_use]
    pub fn parse(field: &str) -> Self {
        let mut list = Self::default();
        let tokens = words(field);

        let mut groups: Vec<&[&str]> = tokens
            .split(|t| t.eq_ignore_ascii_case("and"))
            .filter(|g| !g.is_empty())
            .collect();

        if let Some(last) = groups.last() {
            if last.len() == 1 && last[0].eq_ignore_ascii_case("others") && groups.len() > 1 {
                list.et_al = true;
                groups.pop();
            }
        }

        list.persons = groups
            .into_iter()
            .filter_map(|g| Person::parse(&g.join(" ")))
            .collect();
        list
    }

    /// All persons
    #[must_use]
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Number of persons
    #[must_use]
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether the list has no persons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Whether the list ended in `and others`
    #[must_use]
    pub const fn is_et_al(&self) -> bool {
        self.et_al
    }

    /// First person
    #[must_use]
    pub fn first(&self) -> Option<&Person> {
        self.persons.first()
    }

    /// Surname of the first person
    #[must_use]
    pub fn first_last_name(&self) -> String {
        self.first().map(|p| p.last.clone()).unwrap_or_default()
    }

    /// Surname of the last person
    #[must_use]
    pub fn last_last_name(&self) -> String {
        self.persons
            .last()
            .map(|p| p.last.clone())
            .unwrap_or_default()
    }

    /// Surnames of all persons, concatenated
    #[must_use]
    pub fn concat_last_names(&self) -> String {
        self.persons.iter().map(|p| p.last.as_str()).collect()
    }

    /// Von part and surname of the first person
    #[must_use]
    pub fn first_von_last(&self) -> String {
        self.first().map(Person::von_last).unwrap_or_default()
    }

    /// Initial of the first person's given names
    #[must_use]
    pub fn first_fore_initial(&self) -> String {
        self.first()
            .and_then(Person::first_initial)
            .map(String::from)
            .unwrap_or_default()
    }

    /// First `chars` characters of the surname of person `index` (0-based)
    #[must_use]
    pub fn last_name_prefix(&self, index: usize, chars: usize) -> String {
        self.persons
            .get(index)
            .map(|p| p.last.chars().take(chars).collect())
            .unwrap_or_default()
    }

    /// Surnames of the first `n` persons, then `EtAl` if more follow
    #[must_use]
    pub fn first_n_last_names(&self, n: usize) -> String {
        let mut out: String = self
            .persons
            .iter()
            .take(n)
            .map(|p| p.last.as_str())
            .collect();
        if self.total() > n {
            out.push_str("EtAl");
        }
        out
    }

    /// One surname, two surnames joined by `delimiter`, or the first
    /// surname followed by `append` when there are more
    #[must_use]
    pub fn et_al(&self, delimiter: &str, append: &str) -> String {
        match (self.total(), self.persons.as_slice()) {
            (_, []) => String::new(),
            (1, [only]) => only.last.clone(),
            (2, [a, b]) => format!("{}{delimiter}{}", a.last, b.last),
            (_, [first, ..]) => format!("{}{append}", first.last),
        }
    }

    /// First five characters of the first surname, then the initial of
    /// every other surname
    #[must_use]
    pub fn last_name_initials(&self) -> String {
        let Some((first, rest)) = self.persons.split_first() else {
            return String::new();
        };
        let mut out: String = first.last.chars().take(5).collect();
        out.extend(rest.iter().filter_map(|p| p.last.chars().next()));
        out
    }

    /// Number of persons, counting `and others` as one more
    fn total(&self) -> usize {
        self.persons.len() + usize::from(self.et_al)
    }
}

/// Split at whitespace outside braces
fn words(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in s.char_indices() {
        match c {
            '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(st) = start.take() {
                    out.push(&s[st..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(st) = start {
        out.push(&s[st..]);
    }
    out
}

/// Split at `sep` outside braces
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

/// BibTeX's case test: the first letter outside braces decides, and a word
/// opening with a brace never counts as lowercase
fn is_lowercase_leading(word: &str) -> bool {
    for c in word.chars() {
        if c == '{' {
            return false;
        }
        if c.is_alphabetic() {
            return c.is_lowercase();
        }
    }
    false
}

fn is_particle(word: &str) -> bool {
    is_lowercase_leading(word) || PARTICLES.iter().any(|p| p.eq_ignore_ascii_case(word))
}

fn strip_braces(s: &str) -> String {
    s.chars().filter(|&c| c != '{' && c != '}').collect()
}

fn join_words(tokens: &[&str]) -> Option<String> {
    let joined = tokens
        .iter()
        .map(|t| strip_braces(t))
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(&joined)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
