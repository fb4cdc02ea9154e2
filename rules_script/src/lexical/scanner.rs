//! The Rules Script tokenizer
//!
//! [`scan`] classifies one token per call. It is pure: no logging, no
//! allocation, no failure. Callers loop until the stream reaches end of line,
//! threading one [`ScanState`] through every line of a document.

use super::state::ScanState;
use super::stream::LineStream;
use crate::grammar::symbols::{
    is_bracket, is_quote, is_word_char, is_word_start, COMMENT_START, OPERATORS, PUNCTUATION,
    STRING_ESCAPE,
};
use crate::grammar::words::classify_word;
use crate::tokens::TokenKind;
use serde::{Deserialize, Serialize};

/// Consume one token from `stream` and classify it.
///
/// Consumes at least one character whenever the stream is not at end of
/// line. Calling it at end of line returns [`TokenKind::None`] without
/// consuming anything; the line drivers in this crate never do that.
pub fn scan(stream: &mut LineStream<'_>, state: &mut ScanState) -> TokenKind {
    stream.begin_token();

    if let Some(quote) = state.string_char() {
        scan_string_body(stream, state, quote);
        return TokenKind::String;
    }

    if stream.eat_space() {
        return TokenKind::None;
    }

    let Some(ch) = stream.peek() else {
        return TokenKind::None;
    };

    if ch == COMMENT_START {
        stream.skip_to_end();
        return TokenKind::Comment;
    }

    if is_quote(ch) {
        stream.next();
        state.enter_string(ch);
        return TokenKind::String;
    }

    if let Some(len) = number_prefix_len(stream.remaining()) {
        stream.advance_bytes(len);
        return TokenKind::Number;
    }

    if OPERATORS.iter().any(|op| stream.match_str(op)) {
        return TokenKind::Operator;
    }

    if ch == PUNCTUATION {
        stream.next();
        return TokenKind::Punctuation;
    }

    if is_bracket(ch) {
        stream.next();
        return TokenKind::Bracket;
    }

    if is_word_start(ch) {
        stream.eat_while(is_word_char);
        return classify_word(stream.current())
            .map(TokenKind::from)
            .unwrap_or(TokenKind::Identifier);
    }

    stream.next();
    TokenKind::None
}

/// Consume string content up to and including the closing `quote`, or to end
/// of line when the string continues. A backslash consumes the character
/// after it, so an escaped quote never closes the string.
fn scan_string_body(stream: &mut LineStream<'_>, state: &mut ScanState, quote: char) {
    while let Some(ch) = stream.next() {
        if ch == quote {
            state.leave_string();
            return;
        }
        if ch == STRING_ESCAPE {
            stream.next();
        }
    }
}

/// Byte length of a `[+-]?[0-9]+(\.[0-9]+)?` prefix
fn number_prefix_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = count_digits(&bytes[len..]);
    if int_digits == 0 {
        return None;
    }
    len += int_digits;

    if bytes.get(len) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[len + 1..]);
        if frac_digits > 0 {
            len += 1 + frac_digits;
        }
    }

    Some(len)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// A classified span within one line, as byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineToken {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl LineToken {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Scan a whole line. A trailing `\r` is ignored. Empty lines produce no
/// tokens and leave `state` untouched.
pub fn scan_line(line: &str, state: &mut ScanState) -> Vec<LineToken> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut stream = LineStream::new(line);
    let mut tokens = Vec::new();

    while !stream.eol() {
        let kind = scan(&mut stream, state);
        tokens.push(LineToken {
            kind,
            start: stream.start(),
            end: stream.pos(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(line: &str, state: &mut ScanState) -> Vec<(TokenKind, String)> {
        scan_line(line, state)
            .iter()
            .map(|t| (t.kind, t.text(line).to_string()))
            .collect()
    }

    fn significant(line: &str) -> Vec<(TokenKind, String)> {
        kinds_and_text(line, &mut ScanState::new())
            .into_iter()
            .filter(|(kind, _)| *kind != TokenKind::None)
            .collect()
    }

    fn pairs(expected: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
        expected
            .iter()
            .map(|(kind, text)| (*kind, text.to_string()))
            .collect()
    }

    #[test]
    fn test_rule_header_line() {
        assert_eq!(
            significant("RULE \"Adult Farmer\" TYPE: INCLUSION WHEN age >= 18"),
            pairs(&[
                (TokenKind::Keyword, "RULE"),
                (TokenKind::String, "\""),
                (TokenKind::String, "Adult Farmer\""),
                (TokenKind::Clause, "TYPE"),
                (TokenKind::Punctuation, ":"),
                (TokenKind::Type, "INCLUSION"),
                (TokenKind::Keyword, "WHEN"),
                (TokenKind::Identifier, "age"),
                (TokenKind::Operator, ">="),
                (TokenKind::Number, "18"),
            ])
        );
    }

    #[test]
    fn test_case_insensitive_words_keep_their_text() {
        assert_eq!(
            significant("rule Rule TRUE y"),
            pairs(&[
                (TokenKind::Keyword, "rule"),
                (TokenKind::Keyword, "Rule"),
                (TokenKind::Boolean, "TRUE"),
                (TokenKind::Boolean, "y"),
            ])
        );
    }

    #[test]
    fn test_compound_identifiers_are_not_keywords() {
        assert_eq!(
            significant("hasCrops = true"),
            pairs(&[
                (TokenKind::Identifier, "hasCrops"),
                (TokenKind::Operator, "="),
                (TokenKind::Boolean, "true"),
            ])
        );
        assert_eq!(significant("RULES"), pairs(&[(TokenKind::Identifier, "RULES")]));
        assert_eq!(significant("_on"), pairs(&[(TokenKind::Identifier, "_on")]));
    }

    #[test]
    fn test_operator_longest_match() {
        assert_eq!(
            significant(">= <= != <> = > < + -"),
            pairs(&[
                (TokenKind::Operator, ">="),
                (TokenKind::Operator, "<="),
                (TokenKind::Operator, "!="),
                (TokenKind::Operator, "<>"),
                (TokenKind::Operator, "="),
                (TokenKind::Operator, ">"),
                (TokenKind::Operator, "<"),
                (TokenKind::Operator, "+"),
                (TokenKind::Operator, "-"),
            ])
        );
        assert_eq!(
            significant("a>=b"),
            pairs(&[
                (TokenKind::Identifier, "a"),
                (TokenKind::Operator, ">="),
                (TokenKind::Identifier, "b"),
            ])
        );
    }

    #[test]
    fn test_signed_numbers_bind_before_operators() {
        assert_eq!(significant("-10"), pairs(&[(TokenKind::Number, "-10")]));
        assert_eq!(significant("+2.5"), pairs(&[(TokenKind::Number, "+2.5")]));
        assert_eq!(
            significant("count -1"),
            pairs(&[
                (TokenKind::Identifier, "count"),
                (TokenKind::Number, "-1"),
            ])
        );
        assert_eq!(
            significant("count-1"),
            pairs(&[
                (TokenKind::Identifier, "count"),
                (TokenKind::Number, "-1"),
            ])
        );
        assert_eq!(
            significant("- 1"),
            pairs(&[(TokenKind::Operator, "-"), (TokenKind::Number, "1")])
        );
    }

    #[test]
    fn test_decimal_requires_fraction_digits() {
        assert_eq!(
            kinds_and_text("10.", &mut ScanState::new()),
            pairs(&[(TokenKind::Number, "10"), (TokenKind::None, ".")])
        );
        assert_eq!(significant("3.14"), pairs(&[(TokenKind::Number, "3.14")]));
        assert_eq!(
            significant("1.2.3"),
            pairs(&[(TokenKind::Number, "1.2"), (TokenKind::Number, "3")])
        );
    }

    #[test]
    fn test_comment_swallows_quotes() {
        let mut state = ScanState::new();
        assert_eq!(
            kinds_and_text("# note: \"unterminated", &mut state),
            pairs(&[(TokenKind::Comment, "# note: \"unterminated")])
        );
        assert!(!state.in_string());

        assert_eq!(
            significant("age # trailing"),
            pairs(&[
                (TokenKind::Identifier, "age"),
                (TokenKind::Comment, "# trailing"),
            ])
        );
    }

    #[test]
    fn test_string_continues_across_lines() {
        let mut state = ScanState::new();

        let first = kinds_and_text("MESSAGE: \"line one", &mut state);
        assert_eq!(first.last().map(|(k, _)| *k), Some(TokenKind::String));
        assert!(state.in_string());
        assert_eq!(state.string_char(), Some('"'));

        let second = kinds_and_text("still going\" AND x", &mut state);
        assert_eq!(second[0], (TokenKind::String, "still going\"".to_string()));
        assert!(!state.in_string());
        assert_eq!(second[2], (TokenKind::Keyword, "AND".to_string()));
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let mut state = ScanState::new();
        let line = r#""a\"b""#;
        assert_eq!(
            kinds_and_text(line, &mut state),
            pairs(&[(TokenKind::String, "\""), (TokenKind::String, r#"a\"b""#)])
        );
        assert!(!state.in_string());
    }

    #[test]
    fn test_trailing_backslash_keeps_string_open() {
        let mut state = ScanState::new();
        scan_line("'abc\\", &mut state);
        assert_eq!(state.string_char(), Some('\''));

        // The escape does not carry over: the first quote on the next line closes
        let next = kinds_and_text("' done", &mut state);
        assert_eq!(next[0], (TokenKind::String, "'".to_string()));
        assert!(!state.in_string());
    }

    #[test]
    fn test_other_quote_inside_string() {
        let mut state = ScanState::new();
        let tokens = kinds_and_text("'say \"hi\"' x", &mut state);
        assert_eq!(tokens[1], (TokenKind::String, "say \"hi\"'".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "x".to_string()));
    }

    #[test]
    fn test_brackets_punctuation_and_unknown() {
        assert_eq!(
            kinds_and_text("IN (1, 2);@é", &mut ScanState::new()),
            pairs(&[
                (TokenKind::Keyword, "IN"),
                (TokenKind::None, " "),
                (TokenKind::Bracket, "("),
                (TokenKind::Number, "1"),
                (TokenKind::Bracket, ","),
                (TokenKind::None, " "),
                (TokenKind::Number, "2"),
                (TokenKind::Bracket, ")"),
                (TokenKind::None, ";"),
                (TokenKind::None, "@"),
                (TokenKind::None, "é"),
            ])
        );
    }

    #[test]
    fn test_whitespace_run_is_one_token() {
        assert_eq!(
            kinds_and_text(" \t\u{a0} x", &mut ScanState::new()),
            pairs(&[
                (TokenKind::None, " \t\u{a0} "),
                (TokenKind::Identifier, "x"),
            ])
        );
    }

    #[test]
    fn test_tokens_cover_line_and_make_progress() {
        let lines = [
            "RULE \"Female Headed Household Bonus\"",
            "  WHEN income BETWEEN 100 AND 2000.50 OR region IN ('N', 'S')",
            "weird ~ ` chars ¿ \\ \"open",
            "\u{feff}x:y,z",
        ];
        let mut state = ScanState::new();

        for line in lines {
            let tokens = scan_line(line, &mut state);
            let mut cursor = 0;
            for token in &tokens {
                assert_eq!(token.start, cursor, "gap before {:?} in {:?}", token, line);
                assert!(token.end > token.start, "no progress in {:?}", line);
                cursor = token.end;
            }
            assert_eq!(cursor, line.len());
        }
    }

    #[test]
    fn test_empty_line_keeps_state() {
        let mut state = ScanState::new();
        state.enter_string('"');
        assert!(scan_line("", &mut state).is_empty());
        assert!(scan_line("\r", &mut state).is_empty());
        assert_eq!(state.string_char(), Some('"'));
    }

    #[test]
    fn test_scan_at_eol_does_not_consume() {
        let mut stream = LineStream::new("");
        let mut state = ScanState::new();
        assert_eq!(scan(&mut stream, &mut state), TokenKind::None);
        assert_eq!(stream.pos(), 0);
    }

    #[test]
    fn test_number_prefix_len() {
        assert_eq!(number_prefix_len("18 "), Some(2));
        assert_eq!(number_prefix_len("-0.5x"), Some(4));
        assert_eq!(number_prefix_len("+"), None);
        assert_eq!(number_prefix_len(".5"), None);
        assert_eq!(number_prefix_len("7."), Some(1));
    }
}
