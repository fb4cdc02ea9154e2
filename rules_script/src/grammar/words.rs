//! Reserved word tables
//!
//! Words are matched case-insensitively against whole identifiers. When a
//! word appears in more than one table the earlier table in [`WORD_TABLES`]
//! wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Classification of a reserved word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordClass {
    /// Rule structure and logical connectives
    Keyword,
    /// Rule attribute names (`TYPE:`, `SCORE:`)
    Clause,
    /// Rule type values
    #[serde(rename = "type")]
    TypeName,
    Boolean,
}

impl WordClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            WordClass::Keyword => "keyword",
            WordClass::Clause => "clause",
            WordClass::TypeName => "type",
            WordClass::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for WordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const KEYWORDS: &[&str] = &[
    "RULE",
    "WHEN",
    "AND",
    "OR",
    "NOT",
    "BETWEEN",
    "IN",
    "CONTAINS",
    "IS",
    "EMPTY",
    "STARTS",
    "ENDS",
    "WITH",
    "DEPENDS",
    "ON",
    "STOP",
    "FAIL",
    "PASS",
    "EFFECTIVE",
    "FROM",
    "TO",
];

pub const CLAUSES: &[&str] = &[
    "TYPE",
    "CATEGORY",
    "MANDATORY",
    "ORDER",
    "SCORE",
    "WEIGHT",
    "MESSAGE",
];

pub const TYPES: &[&str] = &[
    "INCLUSION",
    "EXCLUSION",
    "PRIORITY",
    "BONUS",
    "DEMOGRAPHIC",
    "ECONOMIC",
    "AGRICULTURAL",
    "VULNERABILITY",
    "HOUSEHOLD",
];

pub const BOOLEANS: &[&str] = &["YES", "NO", "true", "false", "Y", "N"];

/// Tables in lookup priority order
pub const WORD_TABLES: &[(WordClass, &[&str])] = &[
    (WordClass::Keyword, KEYWORDS),
    (WordClass::Clause, CLAUSES),
    (WordClass::TypeName, TYPES),
    (WordClass::Boolean, BOOLEANS),
];

static WORD_INDEX: OnceLock<HashMap<String, WordClass>> = OnceLock::new();

fn word_index() -> &'static HashMap<String, WordClass> {
    WORD_INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for (class, words) in WORD_TABLES {
            for word in words.iter() {
                // First table to claim a word keeps it
                index.entry(word.to_ascii_lowercase()).or_insert(*class);
            }
        }
        index
    })
}

/// Class of a reserved word, `None` for ordinary identifiers
pub fn classify_word(word: &str) -> Option<WordClass> {
    if word.bytes().any(|b| b.is_ascii_uppercase()) {
        word_index().get(&word.to_ascii_lowercase()).copied()
    } else {
        word_index().get(word).copied()
    }
}

/// Linear lookup over the ordered tables
pub fn classify_word_ordered(word: &str) -> Option<WordClass> {
    WORD_TABLES.iter().find_map(|(class, words)| {
        words
            .iter()
            .any(|w| w.eq_ignore_ascii_case(word))
            .then_some(*class)
    })
}

pub fn is_reserved_word(word: &str) -> bool {
    classify_word(word).is_some()
}

/// Every reserved word with its effective class, in table order
pub fn reserved_words() -> impl Iterator<Item = (&'static str, WordClass)> {
    WORD_TABLES
        .iter()
        .flat_map(|(class, words)| words.iter().map(move |w| (*w, *class)))
}
