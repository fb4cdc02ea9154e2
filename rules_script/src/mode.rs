//! Editor language mode registration
//!
//! A [`LanguageMode`] bundles the identifiers an editor host uses to find the
//! Rules Script tokenizer with the tokenizer entry points themselves.

use crate::lexical::{scan, LineStream, ScanState};
use crate::tokens::TokenKind;
use serde::Serialize;

pub const MODE_NAME: &str = "jre";
pub const MODE_MIME: &str = "text/x-jre";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageMode {
    pub name: &'static str,
    pub mime: &'static str,
    pub display_name: &'static str,
    pub extensions: &'static [&'static str],
}

impl LanguageMode {
    /// State for the first line of a document
    pub fn start_state(&self) -> ScanState {
        ScanState::new()
    }

    /// Editor-facing tokenizer: consume one token and return its style name
    pub fn token(&self, stream: &mut LineStream<'_>, state: &mut ScanState) -> Option<&'static str> {
        scan(stream, state).style()
    }

    /// Consume one token and return its kind
    pub fn token_kind(&self, stream: &mut LineStream<'_>, state: &mut ScanState) -> TokenKind {
        scan(stream, state)
    }

    pub fn handles_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
    }
}

pub static RULES_SCRIPT: LanguageMode = LanguageMode {
    name: MODE_NAME,
    mime: MODE_MIME,
    display_name: "Rules Script",
    extensions: &["rules", "jre"],
};

static MODES: &[&LanguageMode] = &[&RULES_SCRIPT];

pub fn modes() -> &'static [&'static LanguageMode] {
    MODES
}

pub fn find_mode_by_name(name: &str) -> Option<&'static LanguageMode> {
    MODES.iter().copied().find(|mode| mode.name == name)
}

pub fn find_mode_by_mime(mime: &str) -> Option<&'static LanguageMode> {
    MODES
        .iter()
        .copied()
        .find(|mode| mode.mime.eq_ignore_ascii_case(mime.trim()))
}

pub fn find_mode_by_extension(extension: &str) -> Option<&'static LanguageMode> {
    MODES
        .iter()
        .copied()
        .find(|mode| mode.handles_extension(extension))
}

/// Example document shown by the editor on first load
pub const SAMPLE_SCRIPT: &str = r#"# Sample Rules Script

RULE "Adult Farmer"
  TYPE: INCLUSION
  MANDATORY: YES
  ORDER: 10
  WHEN age >= 18
  FAIL MESSAGE: "Must be 18 years or older"

RULE "Has Agricultural Activity"
  TYPE: INCLUSION
  MANDATORY: YES
  ORDER: 20
  WHEN hasCrops = true OR hasLivestock = true
  FAIL MESSAGE: "Must be engaged in farming"

RULE "Female Headed Household Bonus"
  TYPE: BONUS
  SCORE: 10
  WHEN femaleHeadedHousehold = true
  PASS MESSAGE: "Priority given to female-headed households""#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookups() {
        assert_eq!(find_mode_by_name("jre"), Some(&RULES_SCRIPT));
        assert_eq!(find_mode_by_mime("text/x-jre"), Some(&RULES_SCRIPT));
        assert_eq!(find_mode_by_extension(".RULES"), Some(&RULES_SCRIPT));
        assert_eq!(find_mode_by_extension("jre"), Some(&RULES_SCRIPT));
        assert!(find_mode_by_name("javascript").is_none());
        assert!(find_mode_by_extension("txt").is_none());
        assert_eq!(modes().len(), 1);
    }

    #[test]
    fn test_token_returns_styles() {
        let mode = find_mode_by_name(MODE_NAME).unwrap();
        let mut state = mode.start_state();
        let mut stream = LineStream::new("MANDATORY: YES");

        let mut styles = Vec::new();
        while !stream.eol() {
            styles.push(mode.token(&mut stream, &mut state));
        }
        assert_eq!(
            styles,
            vec![Some("def"), Some("punctuation"), None, Some("atom")]
        );

        let mut state = mode.start_state();
        let mut stream = LineStream::new("MANDATORY: YES");
        let mut kinds = Vec::new();
        while !stream.eol() {
            kinds.push(mode.token_kind(&mut stream, &mut state));
        }
        assert_eq!(
            kinds,
            vec![
                TokenKind::Clause,
                TokenKind::Punctuation,
                TokenKind::None,
                TokenKind::Boolean
            ]
        );
    }

    #[test]
    fn test_sample_script_shape() {
        assert!(SAMPLE_SCRIPT.starts_with("# Sample Rules Script\n\nRULE"));
        assert!(!SAMPLE_SCRIPT.ends_with('\n'));
        assert_eq!(SAMPLE_SCRIPT.lines().count(), 21);
    }
}
