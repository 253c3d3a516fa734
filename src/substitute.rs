//! # Substitution Engine
//!
//! Merges a data record into template text, producing one [`StyledLine`] per
//! line of content.
//!
//! ## Placeholders
//!
//! A placeholder is `{{key}}` with an exact, case-sensitive key. Keys may not
//! contain braces; anything that does not form a valid token is kept as
//! literal text. A key missing from the record substitutes to `""`.
//!
//! ## Segments
//!
//! Plain text and ordinary substitutions merge into one segment. A placeholder
//! listed in `placeholderSizes` becomes its own segment carrying that size:
//!
//! ```text
//! "Price: {{price}} VND"   placeholderSizes = { price: 30 }
//!
//! ┌──────────┬──────────────┬────────┐
//! │ "Price: "│ "250000" @30 │ " VND" │
//! └──────────┴──────────────┴────────┘
//! ```
//!
//! Substitution is total: it never fails and never changes the line count.

use std::collections::BTreeMap;

use crate::template::Template;

/// A data record: placeholder key to value.
pub type Record = BTreeMap<String, String>;

/// A run of text sharing one font size.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    /// Size from `placeholderSizes`; `None` means the line's size
    pub font_size: Option<f32>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
        }
    }

    pub fn sized(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size: Some(font_size),
        }
    }
}

/// One line of substituted content.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    /// 0-based position in the template content
    pub index: usize,
    pub segments: Vec<Segment>,
}

impl StyledLine {
    /// 1-based line number, as used by `lineN` style keys.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Full text of the line with segment boundaries removed.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

// ============================================================================
// TOKENIZER
// ============================================================================

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Iterator over the tokens of one piece of template text.
pub struct Tokens<'a> {
    rest: &'a str,
}

/// Split text into literal runs and `{{key}}` placeholders.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

/// Parse a placeholder at the start of `s`, returning the key and bytes consumed.
fn placeholder_at(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix("{{")?;
    let end = inner.find("}}")?;
    let key = &inner[..end];
    if key.is_empty() || key.contains(['{', '}', '\n']) {
        return None;
    }
    Some((key, end + 4))
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        if let Some((key, consumed)) = placeholder_at(self.rest) {
            self.rest = &self.rest[consumed..];
            return Some(Token::Placeholder(key));
        }

        // Literal text runs up to the next position where a placeholder parses.
        // A '{' that does not start one is consumed as text.
        let mut end = self.rest.len();
        for (i, _) in self.rest.match_indices('{') {
            if i > 0 && placeholder_at(&self.rest[i..]).is_some() {
                end = i;
                break;
            }
        }
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Token::Text(text))
    }
}

/// All placeholder keys in `text`, in order, with repeats.
pub fn placeholder_keys(text: &str) -> impl Iterator<Item = &str> {
    tokenize(text).filter_map(|token| match token {
        Token::Placeholder(key) => Some(key),
        Token::Text(_) => None,
    })
}

// ============================================================================
// SUBSTITUTION
// ============================================================================

/// Substitute `record` into `template`, one styled line per content line.
pub fn substitute(template: &Template, record: &Record) -> Vec<StyledLine> {
    template
        .lines()
        .enumerate()
        .map(|(index, line)| StyledLine {
            index,
            segments: substitute_line(line, record, &template.placeholder_sizes),
        })
        .collect()
}

fn substitute_line(
    line: &str,
    record: &Record,
    placeholder_sizes: &BTreeMap<String, f32>,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending = String::new();

    for token in tokenize(line) {
        match token {
            Token::Text(text) => pending.push_str(text),
            Token::Placeholder(key) => {
                let value = record.get(key).map(String::as_str).unwrap_or("");
                match placeholder_sizes.get(key) {
                    Some(&size) => {
                        if !pending.is_empty() {
                            segments.push(Segment::plain(std::mem::take(&mut pending)));
                        }
                        segments.push(Segment::sized(value, size));
                    }
                    None => pending.push_str(value),
                }
            }
        }
    }

    if !pending.is_empty() {
        segments.push(Segment::plain(pending));
    }

    segments
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let tokens: Vec<Token> = tokenize("#{{a}} - {{b}}").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Text("#"),
                Token::Placeholder("a"),
                Token::Text(" - "),
                Token::Placeholder("b"),
            ]
        );
    }

    #[test]
    fn test_tokenize_malformed_is_literal() {
        let tokens: Vec<Token> = tokenize("{{}} {{open").collect();
        assert_eq!(tokens, vec![Token::Text("{{}} {{open")]);

        let tokens: Vec<Token> = tokenize("{{{a}}}").collect();
        assert_eq!(
            tokens,
            vec![Token::Text("{"), Token::Placeholder("a"), Token::Text("}")]
        );
    }

    #[test]
    fn test_single_line_single_segment() {
        let template = Template::new("t", "#{{sessionIndex}} - {{phone}}");
        let lines = substitute(
            &template,
            &record(&[("sessionIndex", "123"), ("phone", "0901234567")]),
        );
        assert_eq!(
            lines,
            vec![StyledLine {
                index: 0,
                segments: vec![Segment::plain("#123 - 0901234567")],
            }]
        );
    }

    #[test]
    fn test_sized_placeholder_splits_segments() {
        let template = Template::new("t", "Price: {{price}}").with_placeholder_size("price", 30.0);
        let lines = substitute(&template, &record(&[("price", "250000")]));
        assert_eq!(
            lines[0].segments,
            vec![Segment::plain("Price: "), Segment::sized("250000", 30.0)]
        );
    }

    #[test]
    fn test_adjacent_sized_placeholders_stay_separate() {
        let template = Template::new("t", "{{a}}{{b}}!")
            .with_placeholder_size("a", 10.0)
            .with_placeholder_size("b", 20.0);
        let lines = substitute(&template, &record(&[("a", "x"), ("b", "y")]));
        assert_eq!(
            lines[0].segments,
            vec![
                Segment::sized("x", 10.0),
                Segment::sized("y", 20.0),
                Segment::plain("!"),
            ]
        );
    }

    #[test]
    fn test_missing_values_substitute_empty() {
        let template = Template::new("t", "Name: {{name}}\n{{missing}}");
        let lines = substitute(&template, &Record::new());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Name: ");
        assert!(lines[1].segments.is_empty());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let template = Template::new("t", "{{Name}}");
        let lines = substitute(&template, &record(&[("name", "lower")]));
        assert_eq!(lines[0].text(), "");
    }

    #[test]
    fn test_line_count_preserved() {
        for content in ["a", "a\nb", "\n\n", "{{x}}\n\n{{y}}\n"] {
            let template = Template::new("t", content);
            let lines = substitute(&template, &record(&[("x", "multi\nline")]));
            assert_eq!(lines.len(), content.split('\n').count(), "content {:?}", content);
            for (i, line) in lines.iter().enumerate() {
                assert_eq!(line.index, i);
            }
        }
    }

    #[test]
    fn test_unused_placeholder_sizes_ignored() {
        let template = Template::new("t", "plain").with_placeholder_size("unused", 40.0);
        let lines = substitute(&template, &Record::new());
        assert_eq!(lines[0].segments, vec![Segment::plain("plain")]);
    }
}
