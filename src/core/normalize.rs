//! Source views consumed by the similarity metrics.
//!
//! A [`Fingerprint`] bundles the five representations of one text:
//!   - raw characters
//!   - identifier tokens (`[A-Za-z_]\w*`, order and duplicates kept)
//!   - lines
//!   - variable-normalized characters (names rewritten to `v<rank>`)
//!   - control-flow keywords in document order
//!
//! Building a view never fails. When the grammar cannot parse a text,
//! the variable-normalized view is the text itself.

use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap},
    fmt,
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parsers::PythonNameCollector;

/// Errors raised while collecting names or building a normalizer.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("failed to load {language} grammar: {reason}")]
    Grammar {
        language: &'static str,
        reason: String,
    },

    #[error("parser produced no syntax tree")]
    NoTree,

    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Grammar-specific collection of bound and referenced names.
pub trait NameCollector: Send + Sync {
    /// Return the distinct names in `source`, or an error when the
    /// source does not parse under this collector's grammar.
    fn collect_names(&self, source: &str) -> Result<BTreeSet<String>, NormalizeError>;

    /// Grammar label used in logs.
    fn language(&self) -> &'static str;
}

/// Keywords tracked by the control-flow view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKeyword {
    If,
    For,
    While,
    Elif,
    Else,
    Try,
    Except,
    With,
}

impl ControlKeyword {
    pub const ALL: [ControlKeyword; 8] = [
        ControlKeyword::If,
        ControlKeyword::For,
        ControlKeyword::While,
        ControlKeyword::Elif,
        ControlKeyword::Else,
        ControlKeyword::Try,
        ControlKeyword::Except,
        ControlKeyword::With,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKeyword::If => "if",
            ControlKeyword::For => "for",
            ControlKeyword::While => "while",
            ControlKeyword::Elif => "elif",
            ControlKeyword::Else => "else",
            ControlKeyword::Try => "try",
            ControlKeyword::Except => "except",
            ControlKeyword::With => "with",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kw| kw.as_str() == word)
    }
}

impl fmt::Display for ControlKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precomputed views of one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// Raw text as Unicode scalar values.
    pub chars: Vec<char>,
    /// Identifier tokens in order.
    pub tokens: Vec<String>,
    /// Lines without their terminators.
    pub lines: Vec<String>,
    /// Text after variable normalization (raw text on parse failure).
    pub normalized: Vec<char>,
    /// Control-flow keywords in order.
    pub keywords: Vec<ControlKeyword>,
}

/// Produces [`Fingerprint`]s. Cheap to share across threads.
pub struct Normalizer {
    identifier: Regex,
    keyword: Regex,
    word: Regex,
    collector: Box<dyn NameCollector>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("language", &self.collector.language())
            .finish()
    }
}

impl Normalizer {
    /// Normalizer backed by the Python grammar.
    pub fn new() -> Result<Self, NormalizeError> {
        Self::with_collector(Box::new(PythonNameCollector::new()?))
    }

    /// Normalizer backed by a caller-supplied name collector.
    pub fn with_collector(collector: Box<dyn NameCollector>) -> Result<Self, NormalizeError> {
        let keyword_alt = ControlKeyword::ALL
            .iter()
            .map(|kw| kw.as_str())
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            identifier: Regex::new(r"[A-Za-z_]\w*")?,
            keyword: Regex::new(&format!(r"\b(?:{keyword_alt})\b"))?,
            word: Regex::new(r"\w+")?,
            collector,
        })
    }

    /// Build every view of `text`.
    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        Fingerprint {
            chars: text.chars().collect(),
            tokens: self
                .identifier_tokens(text)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            lines: split_lines(text)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            normalized: self
                .normalize_variables(text)
                .chars()
                .collect(),
            keywords: self.control_keywords(text),
        }
    }

    /// Identifier-like substrings, duplicates kept.
    pub fn identifier_tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.identifier
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }

    /// Whole-word control-flow keywords in document order.
    pub fn control_keywords(&self, text: &str) -> Vec<ControlKeyword> {
        self.keyword
            .find_iter(text)
            .filter_map(|m| ControlKeyword::from_word(m.as_str()))
            .collect()
    }

    /// Rewrite every collected name to `v<rank>`, where rank is its
    /// position in lexicographic order. Falls back to `text` unchanged
    /// when the grammar rejects it.
    pub fn normalize_variables<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let names = match self.collector.collect_names(text) {
            Ok(names) => names,
            Err(err) => {
                debug!(
                    language = self.collector.language(),
                    error = %err,
                    "variable normalization skipped"
                );
                return Cow::Borrowed(text);
            }
        };

        if names.is_empty() {
            return Cow::Borrowed(text);
        }

        // BTreeSet iteration is already sorted.
        let placeholders: HashMap<&str, String> = names
            .iter()
            .enumerate()
            .map(|(rank, name)| (name.as_str(), format!("v{rank}")))
            .collect();

        // One pass over word runs: a whole-word hit is exactly a run equal
        // to the name, and placeholders are never rewritten twice.
        self.word
            .replace_all(text, |caps: &Captures| {
                let word = &caps[0];
                placeholders
                    .get(word)
                    .cloned()
                    .unwrap_or_else(|| word.to_owned())
            })
    }
}

/// Split on line boundaries. A trailing terminator does not yield an
/// extra empty line, and `\r\n` counts as one break.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }

        lines.push(&text[start..idx]);

        let mut end = idx + ch.len_utf8();
        if ch == '\r'
            && let Some(&(_, '\n')) = chars.peek()
        {
            chars.next();
            end += 1;
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collector that always rejects its input.
    struct Rejecting;

    impl NameCollector for Rejecting {
        fn collect_names(&self, _source: &str) -> Result<BTreeSet<String>, NormalizeError> {
            Err(NormalizeError::Syntax { line: 1, column: 0 })
        }

        fn language(&self) -> &'static str {
            "rejecting"
        }
    }

    #[test]
    fn tokens_keep_order_and_duplicates() {
        let n = Normalizer::new().unwrap();
        let toks = n.identifier_tokens("x = x + _y1 * 2abc");
        assert_eq!(toks, vec!["x", "x", "_y1", "abc"]);
    }

    #[test]
    fn split_lines_handles_terminators() {
        assert_eq!(split_lines(""), Vec::<&str>::new());
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\u{2028}b"), vec!["a", "b"]);
    }

    #[test]
    fn control_keywords_are_whole_words() {
        let n = Normalizer::new().unwrap();
        let src = "if x:\n    for_each = 1\nelif y:\n    pass\nelse:\n    while z: pass\n";
        let kws = n.control_keywords(src);
        assert_eq!(
            kws,
            vec![
                ControlKeyword::If,
                ControlKeyword::Elif,
                ControlKeyword::Else,
                ControlKeyword::While,
            ]
        );
    }

    #[test]
    fn variables_rewritten_by_rank() {
        let n = Normalizer::new().unwrap();
        let out = n.normalize_variables("b = 1\na = b + 1\n");
        assert_eq!(out, "v1 = 1\nv0 = v1 + 1\n");
    }

    #[test]
    fn placeholders_are_not_rewritten_again() {
        let n = Normalizer::new().unwrap();
        // Sorted names: a, v0 -> a => v0, v0 => v1.
        let out = n.normalize_variables("a = 1\nv0 = a\n");
        assert_eq!(out, "v0 = 1\nv1 = v0\n");
    }

    #[test]
    fn parse_failure_falls_back_to_raw_text() {
        let n = Normalizer::new().unwrap();
        let src = "def broken(:\n    return )\n";
        assert_eq!(n.normalize_variables(src), src);
    }

    #[test]
    fn custom_collector_failure_is_recovered() {
        let n = Normalizer::with_collector(Box::new(Rejecting)).unwrap();
        let fp = n.fingerprint("x = 1");
        assert_eq!(fp.normalized, fp.chars);
    }

    #[test]
    fn python2_source_keeps_raw_text() {
        let n = Normalizer::new().unwrap();
        let src = "print 'hi'\nx = 1\n";
        assert_eq!(n.normalize_variables(src), src);
    }

    #[test]
    fn empty_text_yields_empty_views() {
        let n = Normalizer::new().unwrap();
        let fp = n.fingerprint("");
        assert!(fp.chars.is_empty());
        assert!(fp.tokens.is_empty());
        assert!(fp.lines.is_empty());
        assert!(fp.normalized.is_empty());
        assert!(fp.keywords.is_empty());
    }
}
