//! Operator and punctuation sets

/// Operators in match order. Two-character operators come first so `>=`
/// is never split into `>` and `=`.
pub const OPERATORS: &[&str] = &[">=", "<=", "!=", "<>", "=", ">", "<", "+", "-"];

pub const COMMENT_START: char = '#';

pub const PUNCTUATION: char = ':';

pub const STRING_ESCAPE: char = '\\';

pub fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'')
}

pub fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | ',')
}

pub fn is_word_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_char_operators_precede_their_prefixes() {
        for (i, op) in OPERATORS.iter().enumerate() {
            for later in &OPERATORS[i + 1..] {
                assert!(
                    !later.starts_with(op) || later.len() <= op.len(),
                    "{} shadows {}",
                    op,
                    later
                );
            }
        }
    }

    #[test]
    fn test_character_classes() {
        assert!(is_quote('\''));
        assert!(!is_quote('`'));
        assert!(is_bracket(','));
        assert!(!is_bracket('['));
        assert!(is_word_start('_'));
        assert!(!is_word_start('1'));
        assert!(is_word_char('1'));
        assert!(!is_word_char('é'));
    }
}
