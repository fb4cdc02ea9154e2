//! Token classification

use crate::grammar::WordClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification returned for every scanned span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Clause,
    Type,
    Boolean,
    Operator,
    Punctuation,
    Bracket,
    Number,
    String,
    Comment,
    Identifier,
    /// Whitespace and unrecognized characters
    None,
}

impl TokenKind {
    pub const ALL: [TokenKind; 12] = [
        TokenKind::Keyword,
        TokenKind::Clause,
        TokenKind::Type,
        TokenKind::Boolean,
        TokenKind::Operator,
        TokenKind::Punctuation,
        TokenKind::Bracket,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Comment,
        TokenKind::Identifier,
        TokenKind::None,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Clause => "clause",
            TokenKind::Type => "type",
            TokenKind::Boolean => "boolean",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Bracket => "bracket",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Identifier => "identifier",
            TokenKind::None => "none",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Editor style name. `None` means the span is rendered unstyled.
    pub const fn style(self) -> Option<&'static str> {
        match self {
            TokenKind::Keyword => Some("keyword"),
            TokenKind::Clause => Some("def"),
            TokenKind::Type => Some("type"),
            TokenKind::Boolean => Some("atom"),
            TokenKind::Operator => Some("operator"),
            TokenKind::Punctuation => Some("punctuation"),
            TokenKind::Bracket => Some("bracket"),
            TokenKind::Number => Some("number"),
            TokenKind::String => Some("string"),
            TokenKind::Comment => Some("comment"),
            TokenKind::Identifier => Some("variable"),
            TokenKind::None => None,
        }
    }

    /// Tokens a parser would consume: everything except whitespace,
    /// unrecognized characters and comments
    pub const fn is_significant(self) -> bool {
        !matches!(self, TokenKind::None | TokenKind::Comment)
    }

    pub const fn is_reserved_word(self) -> bool {
        matches!(
            self,
            TokenKind::Keyword | TokenKind::Clause | TokenKind::Type | TokenKind::Boolean
        )
    }
}

impl From<WordClass> for TokenKind {
    fn from(class: WordClass) -> Self {
        match class {
            WordClass::Keyword => TokenKind::Keyword,
            WordClass::Clause => TokenKind::Clause,
            WordClass::TypeName => TokenKind::Type,
            WordClass::Boolean => TokenKind::Boolean,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_mapping() {
        assert_eq!(TokenKind::Keyword.style(), Some("keyword"));
        assert_eq!(TokenKind::Clause.style(), Some("def"));
        assert_eq!(TokenKind::Type.style(), Some("type"));
        assert_eq!(TokenKind::Boolean.style(), Some("atom"));
        assert_eq!(TokenKind::Identifier.style(), Some("variable"));
        assert_eq!(TokenKind::None.style(), None);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::parse(kind.as_str()), Some(kind));
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
        assert_eq!(TokenKind::parse("variable"), None);
    }

    #[test]
    fn test_significance() {
        assert!(!TokenKind::None.is_significant());
        assert!(!TokenKind::Comment.is_significant());
        assert!(TokenKind::String.is_significant());
        assert!(TokenKind::Boolean.is_reserved_word());
        assert!(!TokenKind::Identifier.is_reserved_word());
    }
}
