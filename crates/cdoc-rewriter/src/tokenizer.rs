//! Lenient markup tokenizer for template sources.
//!
//! Produces [`Token`]s that borrow from the input. Concatenating the raw text
//! of every token reproduces the input exactly, which is what lets the
//! rewrite engine pass untouched markup through verbatim.
//!
//! Recognized constructs:
//! - start tags with quoted, unquoted and value-less attributes, and `/>`
//! - end tags
//! - comments (`<!-- -->`), plus `<!...>` and `<?...>` reported as comments
//! - raw-text elements (`script`, `style`, `textarea`, `title`, `xmp`) whose
//!   content is a single text token up to the matching close tag
//!
//! A `<` that does not start one of these is plain text. The only errors are
//! an input ending inside a tag or comment.

use std::borrow::Cow;

use memchr::memchr;

use crate::error::TokenizeError;
use crate::token::{Attribute, EndTag, StartTag, Token};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Elements whose content is never tokenized as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title", "xmp"];

/// Longest entity name (without `&` and `;`) worth attempting to decode.
const MAX_ENTITY_LEN: usize = 10;

/// Iterator over the tokens of a source text.
///
/// Stops after the first error.
///
/// # Example
///
/// ```
/// use cdoc_rewriter::{Token, Tokenizer};
///
/// let tokens: Vec<Token<'_>> = Tokenizer::new("<p class=x>Hi</p>")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], Token::Text("Hi"));
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    /// Set after the start tag of a raw-text element.
    raw_text: Option<&'static str>,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text: None,
            failed: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, TokenizeError> {
        let source = self.source;
        let bytes = source.as_bytes();
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        if let Some(element) = self.raw_text.take() {
            let end = find_raw_text_close(bytes, self.pos, element).unwrap_or(bytes.len());
            if end > self.pos {
                let text = &source[self.pos..end];
                self.pos = end;
                return Ok(Some(Token::Text(text)));
            }
        }

        if starts_markup(bytes, self.pos) {
            return self.markup().map(Some);
        }

        let end = next_markup(bytes, self.pos + 1);
        let text = &source[self.pos..end];
        self.pos = end;
        Ok(Some(Token::Text(text)))
    }

    /// Tokenize the construct at `self.pos`, which starts markup.
    fn markup(&mut self) -> Result<Token<'a>, TokenizeError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let rest = &source[start..];

        if rest.starts_with(COMMENT_START) {
            // Searching from inside the opener lets `<!-->` close itself.
            let end = rest[2..]
                .find(COMMENT_END)
                .map(|i| start + 2 + i + COMMENT_END.len())
                .ok_or(TokenizeError::UnterminatedComment { offset: start })?;
            return Ok(self.comment(start, end));
        }

        match bytes[start + 1] {
            b'!' | b'?' => {
                let end = memchr(b'>', &bytes[start..])
                    .map(|i| start + i + 1)
                    .ok_or(TokenizeError::UnterminatedComment { offset: start })?;
                Ok(self.comment(start, end))
            }
            b'/' => self.end_tag(start),
            _ => self.start_tag(start),
        }
    }

    fn comment(&mut self, start: usize, end: usize) -> Token<'a> {
        let source = self.source;
        self.pos = end;
        Token::Comment(&source[start..end])
    }

    fn end_tag(&mut self, start: usize) -> Result<Token<'a>, TokenizeError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let name_end = scan_name(bytes, start + 2);
        let close = memchr(b'>', &bytes[name_end..])
            .map(|i| name_end + i)
            .ok_or(TokenizeError::UnterminatedTag { offset: start })?;

        self.pos = close + 1;
        Ok(Token::EndTag(EndTag {
            name: &source[start + 2..name_end],
            raw: &source[start..=close],
            offset: start,
        }))
    }

    fn start_tag(&mut self, start: usize) -> Result<Token<'a>, TokenizeError> {
        let source = self.source;
        let bytes = source.as_bytes();
        let unterminated = TokenizeError::UnterminatedTag { offset: start };

        let name_end = scan_name(bytes, start + 1);
        let name = &source[start + 1..name_end];
        let mut attrs = Vec::new();
        let mut i = name_end;

        let self_closing = loop {
            i = skip_whitespace(bytes, i);
            match bytes.get(i) {
                None => return Err(unterminated),
                Some(b'>') => {
                    i += 1;
                    break false;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        i += 2;
                        break true;
                    }
                    i += 1;
                }
                Some(_) => {
                    let (attr, next) = self.attribute(i).ok_or(unterminated.clone())?;
                    attrs.push(attr);
                    i = next;
                }
            }
        };

        if !self_closing {
            self.raw_text = RAW_TEXT_ELEMENTS
                .iter()
                .find(|element| name.eq_ignore_ascii_case(element))
                .copied();
        }

        self.pos = i;
        Ok(Token::StartTag(StartTag {
            name,
            attrs,
            self_closing,
            raw: &source[start..i],
            offset: start,
        }))
    }

    /// Parse one attribute starting at `start`.
    ///
    /// Returns the attribute and the position after it, or `None` when the
    /// input ends inside a quoted value or right after `=`.
    fn attribute(&self, start: usize) -> Option<(Attribute<'a>, usize)> {
        let source = self.source;
        let bytes = source.as_bytes();

        // The first byte belongs to the name even if it is `=`.
        let mut name_end = start + 1;
        while name_end < bytes.len() && !is_attr_name_end(bytes[name_end]) {
            name_end += 1;
        }
        let name = &source[start..name_end];

        let after_name = skip_whitespace(bytes, name_end);
        if bytes.get(after_name) != Some(&b'=') {
            return Some((Attribute::new(name, ""), name_end));
        }

        let value_start = skip_whitespace(bytes, after_name + 1);
        match *bytes.get(value_start)? {
            quote @ (b'"' | b'\'') => {
                let close = value_start + 1 + memchr(quote, &bytes[value_start + 1..])?;
                let value = decode_entities(&source[value_start + 1..close]);
                Some((Attribute::new(name, value), close + 1))
            }
            _ => {
                let mut end = value_start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>'
                {
                    end += 1;
                }
                let value = decode_entities(&source[value_start..end]);
                Some((Attribute::new(name, value), end))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

/// Whether the `<` at `i` opens a tag, comment or declaration.
fn starts_markup(bytes: &[u8], i: usize) -> bool {
    if bytes.get(i) != Some(&b'<') {
        return false;
    }
    match bytes.get(i + 1) {
        Some(b) if b.is_ascii_alphabetic() => true,
        Some(b'!' | b'?') => true,
        Some(b'/') => bytes.get(i + 2).is_some_and(u8::is_ascii_alphabetic),
        _ => false,
    }
}

/// Position of the next `<` at or after `from` that starts markup.
fn next_markup(bytes: &[u8], mut from: usize) -> usize {
    while from < bytes.len() {
        let Some(rel) = memchr(b'<', &bytes[from..]) else {
            break;
        };
        let i = from + rel;
        if starts_markup(bytes, i) {
            return i;
        }
        from = i + 1;
    }
    bytes.len()
}

/// Find `</element` (any case) followed by whitespace, `/` or `>`.
fn find_raw_text_close(bytes: &[u8], mut from: usize, element: &str) -> Option<usize> {
    let name = element.as_bytes();
    while from < bytes.len() {
        let i = from + memchr(b'<', &bytes[from..])?;
        let name_start = i + 2;
        let name_end = name_start + name.len();
        if bytes.get(i + 1) == Some(&b'/')
            && bytes
                .get(name_start..name_end)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && bytes
                .get(name_end)
                .is_some_and(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
        {
            return Some(i);
        }
        from = i + 1;
    }
    None
}

/// Scan a tag name: everything up to whitespace, `/` or `>`.
fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'/' && bytes[i] != b'>'
    {
        i += 1;
    }
    i
}

fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>' || b == b'='
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Decode character references in an attribute value.
///
/// Unknown or malformed references are kept as written.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        if let Some(semi) = after.find(';').filter(|&i| i <= MAX_ENTITY_LEN)
            && let Some(c) = decode_entity(&after[..semi])
        {
            out.push(c);
            rest = &after[semi + 1..];
        } else {
            out.push('&');
            rest = after;
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = if let Some(hex) = number.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                number.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
