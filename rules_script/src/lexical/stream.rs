//! Character cursor over a single line

/// Whitespace class used by editors: Unicode white space minus NEL, plus BOM
pub fn is_space(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\u{85}') || ch == '\u{feff}'
}

/// Read cursor over one line of text. `start` marks where the token being
/// scanned began; `pos` is the next unread byte.
#[derive(Debug, Clone)]
pub struct LineStream<'a> {
    line: &'a str,
    pos: usize,
    start: usize,
}

impl<'a> LineStream<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            start: 0,
        }
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Mark the current position as the start of a new token
    pub fn begin_token(&mut self) {
        self.start = self.pos;
    }

    pub fn eol(&self) -> bool {
        self.pos >= self.line.len()
    }

    pub fn sol(&self) -> bool {
        self.pos == 0
    }

    pub fn remaining(&self) -> &'a str {
        &self.line[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consume the next character if it satisfies `pred`
    pub fn eat(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(ch) if pred(ch) => self.next(),
            _ => None,
        }
    }

    /// Consume the longest prefix satisfying `pred`; true if anything was eaten
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let before = self.pos;
        while self.eat(&pred).is_some() {}
        self.pos > before
    }

    pub fn eat_space(&mut self) -> bool {
        self.eat_while(is_space)
    }

    /// Consume `literal` if the remaining text starts with it
    pub fn match_str(&mut self, literal: &str) -> bool {
        if self.remaining().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume `len` bytes already validated by the caller
    pub(crate) fn advance_bytes(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.line.len());
    }

    pub fn skip_to_end(&mut self) {
        self.pos = self.line.len();
    }

    /// Text of the token being scanned
    pub fn current(&self) -> &'a str {
        &self.line[self.start..self.pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basics() {
        let mut stream = LineStream::new("ab c");
        assert!(stream.sol());
        assert_eq!(stream.peek(), Some('a'));
        assert_eq!(stream.next(), Some('a'));
        assert!(!stream.sol());
        assert!(stream.eat(|c| c == 'b').is_some());
        assert!(stream.eat(|c| c == 'b').is_none());
        assert_eq!(stream.current(), "ab");

        stream.begin_token();
        assert!(stream.eat_space());
        assert_eq!(stream.current(), " ");
        stream.skip_to_end();
        assert!(stream.eol());
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_match_str_does_not_consume_on_miss() {
        let mut stream = LineStream::new(">=1");
        assert!(!stream.match_str("<="));
        assert_eq!(stream.pos(), 0);
        assert!(stream.match_str(">="));
        assert_eq!(stream.remaining(), "1");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut stream = LineStream::new("é\u{a0}x");
        assert_eq!(stream.next(), Some('é'));
        assert_eq!(stream.pos(), 2);
        assert!(stream.eat_space());
        assert_eq!(stream.remaining(), "x");
    }

    #[test]
    fn test_space_class() {
        assert!(is_space('\t'));
        assert!(is_space('\u{a0}'));
        assert!(is_space('\u{feff}'));
        assert!(!is_space('\u{85}'));
        assert!(!is_space('_'));
    }
}
