//! Line splitting that accepts `\n`, `\r\n` and lone `\r` terminators

/// One line of a document, without its terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 0-based line index
    pub index: usize,
    /// Byte offset of the first character in the document
    pub offset: usize,
    pub text: &'a str,
}

/// Iterator over the lines of a document
pub struct Lines<'a> {
    source: &'a str,
    pos: usize,
    index: usize,
    finished: bool,
}

/// Split `source` into lines. A trailing terminator yields a final empty
/// line, matching how an editor counts lines.
pub fn split_lines(source: &str) -> Lines<'_> {
    Lines {
        source,
        pos: 0,
        index: 0,
        finished: false,
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let rest = &self.source[self.pos..];
        let start = self.pos;
        let line = match rest.find(|c| c == '\n' || c == '\r') {
            Some(i) => {
                let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                self.pos += i + terminator;
                &rest[..i]
            }
            None => {
                self.finished = true;
                rest
            }
        };

        let item = SourceLine {
            index: self.index,
            offset: start,
            text: line,
        };
        self.index += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        split_lines(source).map(|l| l.text).collect()
    }

    #[test]
    fn test_mixed_terminators() {
        assert_eq!(texts("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_trailing_newline_yields_empty_line() {
        assert_eq!(texts("RULE\n"), vec!["RULE", ""]);
        assert_eq!(texts(""), vec![""]);
    }

    #[test]
    fn test_offsets_skip_terminators() {
        let offsets: Vec<_> = split_lines("ab\r\ncd\nef").map(|l| l.offset).collect();
        assert_eq!(offsets, vec![0, 4, 7]);
    }
}
