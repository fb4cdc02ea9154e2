//! HTML rendering of highlighted Rules Script
//!
//! Styled tokens become `<span class="cm-STYLE">` elements using the editor
//! style names from [`TokenKind::style`]. Unstyled text is emitted escaped
//! without a wrapper.

use crate::lexical::{scan_line, LineToken, ScanState};
use crate::session::HighlightSession;
use crate::tokens::TokenKind;
use crate::utils::split_lines;

/// Render a whole document; lines are joined with `\n`
pub fn render_html(source: &str) -> String {
    let mut state = ScanState::new();
    let mut out = String::with_capacity(source.len() * 2);

    for (index, line) in split_lines(source).enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let tokens = scan_line(line.text, &mut state);
        push_tokens(&mut out, line.text, &tokens);
    }

    out
}

/// Render one line, advancing `state` past it
pub fn render_line(line: &str, state: &mut ScanState) -> String {
    let tokens = scan_line(line, state);
    let mut out = String::with_capacity(line.len() * 2);
    push_tokens(&mut out, line, &tokens);
    out
}

/// Render a session from its cached tokens
pub fn render_session(session: &HighlightSession) -> String {
    let mut out = String::new();
    for (index, (line, tokens)) in session.iter_lines().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        push_tokens(&mut out, line, tokens);
    }
    out
}

fn push_tokens(out: &mut String, line: &str, tokens: &[LineToken]) {
    for token in tokens {
        push_token(out, token.kind, token.text(line));
    }
}

fn push_token(out: &mut String, kind: TokenKind, text: &str) {
    match kind.style() {
        Some(style) => {
            out.push_str("<span class=\"cm-");
            out.push_str(style);
            out.push_str("\">");
            escape_into(out, text);
            out.push_str("</span>");
        }
        None => escape_into(out, text),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::SAMPLE_SCRIPT;

    #[test]
    fn test_render_line_wraps_styled_tokens() {
        let mut state = ScanState::new();
        assert_eq!(
            render_line("WHEN age >= 18", &mut state),
            "<span class=\"cm-keyword\">WHEN</span> \
             <span class=\"cm-variable\">age</span> \
             <span class=\"cm-operator\">&gt;=</span> \
             <span class=\"cm-number\">18</span>"
        );
    }

    #[test]
    fn test_escapes_markup_in_strings_and_unknown_chars() {
        let mut state = ScanState::new();
        assert_eq!(
            render_line("\"<b>&'\" @", &mut state),
            "<span class=\"cm-string\">&quot;</span>\
             <span class=\"cm-string\">&lt;b&gt;&amp;&#39;&quot;</span> @"
        );
    }

    #[test]
    fn test_render_html_carries_state_across_lines() {
        let html = render_html("MESSAGE: 'a\nb' OR c");
        let lines: Vec<&str> = html.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("<span class=\"cm-string\">b&#39;</span>"));
        assert!(lines[1].ends_with("<span class=\"cm-variable\">c</span>"));
    }

    #[test]
    fn test_session_render_matches_document_render() {
        let session = HighlightSession::new(SAMPLE_SCRIPT);
        let html = render_html(SAMPLE_SCRIPT);
        assert_eq!(render_session(&session), html);
        assert!(html.contains("<span class=\"cm-def\">TYPE</span>"));
        assert!(html.contains("<span class=\"cm-type\">INCLUSION</span>"));
        assert!(html.contains("<span class=\"cm-atom\">YES</span>"));
        assert!(html.contains("<span class=\"cm-comment\"># Sample Rules Script</span>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(render_html(""), "");
    }
}
