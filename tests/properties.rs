use bracketed_pattern::{BracketedPattern, DatabaseBuilder, Entry};
use proptest::prelude::*;

fn kitsune() -> Entry<'static> {
    Entry::default()
        .with_field("author", "O. Kitsune")
        .with_field("year", "2017")
        .with_field("pages", "213--216")
}

proptest! {
    #[test]
    fn expansion_is_deterministic(source in r#"[\[\]a-z:_()" 0-9]{0,30}"#) {
        let pattern = BracketedPattern::new(source.as_str());
        let record = kitsune();
        let first = pattern.expand(&record, None).unwrap();
        let second = pattern.expand(&record, None).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_patterns_never_fail(source in "\\PC{0,40}") {
        let pattern = BracketedPattern::new(source.as_str());
        prop_assert!(pattern.expand(&kitsune(), None).is_ok());
    }

    #[test]
    fn resolvable_key_survives_unmatched_brackets(
        prefix in r#"[a-z_ "\[\]]{0,8}"#,
        suffix in r#"[a-z_ "\[\]]{0,8}"#,
        closed in any::<bool>(),
    ) {
        let source = if closed {
            format!("{prefix}[year]{suffix}")
        } else {
            format!("{prefix}[year")
        };
        let expanded = BracketedPattern::new(source).expand(&kitsune(), None).unwrap();
        prop_assert!(expanded.contains("2017"));
    }

    #[test]
    fn macro_expands_like_literal(value in "[A-Za-z][A-Za-z ]{0,19}") {
        let db = DatabaseBuilder::new().string("alias", value.clone()).build();
        let via_macro = Entry::default().with_field("author", "#alias#");
        let literal = Entry::default().with_field("author", value);

        for source in ["[author]", "[auth]", "[authors:lower]"] {
            let pattern = BracketedPattern::new(source);
            prop_assert_eq!(
                pattern.expand(&via_macro, Some(&db)).unwrap(),
                pattern.expand(&literal, Some(&db)).unwrap()
            );
        }
    }

    #[test]
    fn lowercase_is_idempotent(value in "\\PC{0,20}") {
        let record = Entry::default().with_field("title", value);
        let once = BracketedPattern::new("[title:lower]").expand(&record, None).unwrap();
        let twice = BracketedPattern::new("[title:lower:lower]").expand(&record, None).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn child_inherits_parent_author(author in "[A-Z][a-z]{1,10}( and [A-Z][a-z]{1,10})?") {
        let db = DatabaseBuilder::new()
            .entry(Entry::default().with_key("parent").with_field("author", author.clone()))
            .build();
        let child = Entry::default().with_field("crossref", "parent");

        let pattern = BracketedPattern::new("[author]|[bibtexkey]");
        prop_assert_eq!(pattern.expand(&child, Some(&db)).unwrap(), format!("{author}|"));
    }
}
