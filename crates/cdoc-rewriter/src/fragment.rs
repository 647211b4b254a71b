//! Output units produced by the rewrite engine.

use std::fmt;

/// A piece of rewritten output.
///
/// Source passthrough borrows from the input; generated markup is owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Source text copied verbatim.
    Source(&'a str),
    /// Generated text, written as-is.
    Text(String),
    /// Generated start tag.
    StartTag {
        /// Tag name.
        name: String,
        /// Attributes as `(name, unescaped value)` pairs.
        attrs: Vec<(String, String)>,
    },
    /// Generated end tag.
    EndTag(String),
    /// Generated comment; the body is written between `<!--` and `-->`.
    Comment(String),
}

impl Fragment<'_> {
    /// Append the markup for this fragment to `out`.
    pub fn render_into(&self, out: &mut String) {
        match self {
            Self::Source(text) => out.push_str(text),
            Self::Text(text) => out.push_str(text),
            Self::StartTag { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (attr, value) in attrs {
                    out.push(' ');
                    out.push_str(attr);
                    out.push_str("=\"");
                    escape_attr_into(value, out);
                    out.push('"');
                }
                out.push('>');
            }
            Self::EndTag(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Self::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
        }
    }
}

impl fmt::Display for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render_into(&mut out);
        f.write_str(&out)
    }
}

/// Escape an attribute value for a double-quoted attribute.
fn escape_attr_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
