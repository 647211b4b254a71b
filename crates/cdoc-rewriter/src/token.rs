//! Structural markup events.
//!
//! Tokens borrow from the source text. Every token keeps its raw slice so
//! content can be passed through or buffered byte-for-byte.

use std::borrow::Cow;

/// A single `name="value"` pair on a start tag.
///
/// Value-less attributes (`<x disabled>`) carry an empty value. Values are
/// entity-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name as written.
    pub name: &'a str,
    /// Decoded attribute value.
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create an attribute.
    pub fn new(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Check the attribute name, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Start tag: `<name attr="value">` or `<name />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Tag name as written.
    pub name: &'a str,
    /// Attributes in source order. Names may repeat.
    pub attrs: Vec<Attribute<'a>>,
    /// Whether the tag ends with `/>`.
    pub self_closing: bool,
    /// Exact source text of the tag.
    pub raw: &'a str,
    /// Byte offset of the tag in the source.
    pub offset: usize,
}

impl StartTag<'_> {
    /// Check the tag name, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// End tag: `</name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTag<'a> {
    /// Tag name as written.
    pub name: &'a str,
    /// Exact source text of the tag.
    pub raw: &'a str,
    /// Byte offset of the tag in the source.
    pub offset: usize,
}

impl EndTag<'_> {
    /// Check the tag name, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A structural event produced by the [`Tokenizer`](crate::Tokenizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opening (or self-closing) tag.
    StartTag(StartTag<'a>),
    /// Closing tag.
    EndTag(EndTag<'a>),
    /// Character data, undecoded.
    Text(&'a str),
    /// Comment, doctype or processing instruction, including delimiters.
    Comment(&'a str),
}

impl<'a> Token<'a> {
    /// Exact source text of the token.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        match self {
            Self::StartTag(tag) => tag.raw,
            Self::EndTag(tag) => tag.raw,
            Self::Text(raw) | Self::Comment(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tag_is_ignores_case() {
        let tag = StartTag {
            name: "Doc",
            attrs: Vec::new(),
            self_closing: false,
            raw: "<Doc>",
            offset: 0,
        };
        assert!(tag.is("doc"));
        assert!(tag.is("DOC"));
        assert!(!tag.is("docs"));
    }

    #[test]
    fn test_attribute_is_ignores_case() {
        let attr = Attribute::new(":Language", "lang");
        assert!(attr.is(":language"));
        assert!(attr.is(":LANGUAGE"));
        assert!(!attr.is("language"));
    }

    #[test]
    fn test_raw() {
        assert_eq!(Token::Text("abc").raw(), "abc");
        assert_eq!(Token::Comment("<!-- x -->").raw(), "<!-- x -->");
        let end = Token::EndTag(EndTag {
            name: "p",
            raw: "</p >",
            offset: 4,
        });
        assert_eq!(end.raw(), "</p >");
    }
}
