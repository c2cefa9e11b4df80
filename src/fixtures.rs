// src/fixtures.rs
// Realistic records and patterns for benchmarks
// Pulled in with include!, so paths are spelled out in full

/// String macros shared by the fixture store
pub static COMMON_STRINGS: &[(&str, &str)] = &[
    ("neurips", "Advances in Neural Information Processing Systems"),
    ("icml", "International Conference on Machine Learning"),
    ("orgsci", "Organization Science"),
    ("ieee", "IEEE Transactions"),
];

/// A fixture record as plain data
pub struct TestRecord {
    pub key: &'static str,
    pub ty: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

pub const VENUE_RECORDS: &[TestRecord] = &[
    TestRecord {
        key: "HipKro03",
        ty: "article",
        fields: &[
            ("author", "Eric von Hippel and Georg von Krogh"),
            ("title", "Open Source Software and the \"Private-Collective\" Innovation Model: Issues for Organization Science"),
            ("journal", "#orgsci#"),
            ("year", "2003"),
            ("volume", "14"),
            ("number", "2"),
            ("pages", "209--223"),
            ("keywords", "open source; innovation; collective action"),
        ],
    },
    TestRecord {
        key: "smith2024learning",
        ty: "article",
        fields: &[
            ("author", "Smith, John and Doe, Jane and Johnson, Robert"),
            ("title", "Deep Learning for Natural Language Processing: A Comprehensive Survey"),
            ("journal", "Journal of Machine Learning Research"),
            ("year", "2024"),
            ("pages", "123--187"),
        ],
    },
    TestRecord {
        key: "conf2023",
        ty: "inproceedings",
        fields: &[
            ("author", "Williams, Alice and Brown, Bob and Davis, Carol and Evans, David"),
            ("title", "Real-Time Anomaly Detection in Large-Scale Distributed Systems"),
            ("crossref", "icml2023"),
            ("pages", "L5678--L5689"),
        ],
    },
    TestRecord {
        key: "icml2023",
        ty: "proceedings",
        fields: &[
            ("editor", "Krause, Andreas and Brunskill, Emma"),
            ("booktitle", "#icml#"),
            ("year", "2023"),
            ("publisher", "PMLR"),
        ],
    },
];

/// Patterns exercised by the benchmarks
pub const PATTERNS: &[&str] = &[
    "[auth][year]",
    "[auth:lower][shortyear]_[veryshorttitle:lower]",
    "[authors2]-[year]-[firstpage]",
    r#"[journal:regex("Organization", "Org"):abbr]_[auth3_2:upper]"#,
    "[authEtAl][year][shorttitle]",
];

/// Build a fixture record
pub fn record(fixture: &TestRecord) -> bracketed_pattern::Entry<'static> {
    fixture.fields.iter().fold(
        bracketed_pattern::Entry::new(bracketed_pattern::EntryType::parse(fixture.ty))
            .with_key(fixture.key),
        |entry, (name, value)| entry.with_field(*name, *value),
    )
}

/// Build a store holding the fixture macros and `n_records` records
pub fn generate_store(n_records: usize) -> bracketed_pattern::Database<'static> {
    let builder = COMMON_STRINGS
        .iter()
        .fold(bracketed_pattern::DatabaseBuilder::new(), |b, (name, value)| {
            b.string(*name, *value)
        });

    (0..n_records)
        .fold(builder, |b, i| {
            let template = &VENUE_RECORDS[i % VENUE_RECORDS.len()];
            let mut entry = record(template);
            // Parents keep their key so crossrefs still resolve
            if template.ty != "proceedings" {
                entry.set_citation_key(format!("entry{i}"));
                entry.set("year", format!("{}", 2000 + (i % 25)));
            }
            b.entry(entry)
        })
        .build()
}
