//! Text formatting applied to buffered tag content.

/// Escape HTML special characters.
///
/// `&` is handled in the same pass as the other characters, so entities
/// produced here are never escaped a second time.
///
/// # Examples
///
/// ```
/// use cdoc_rewriter::escape_html;
///
/// assert_eq!(
///     escape_html(r#"<a href="x">&'</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;&amp;&#039;&lt;/a&gt;"
/// );
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    result
}

/// Drop blank lines at the start and end of `text`.
///
/// Lines containing only whitespace count as blank. Interior blank lines and
/// the indentation of the first visible line are kept; whitespace after the
/// last visible character is removed. Applying this twice gives the same
/// result as applying it once.
#[must_use]
pub fn trim_leading_and_trailing(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let Some(first) = lines.iter().position(|line| !is_blank(line)) else {
        return String::new();
    };
    // A visible line exists, so rposition finds one at or after `first`.
    let last = lines.iter().rposition(|line| !is_blank(line)).unwrap_or(first);

    let mut result = lines[first..=last].join("\n");
    let visible_len = result.trim_end().len();
    result.truncate(visible_len);
    result
}

/// Remove the indentation shared by all non-blank lines.
///
/// Spaces and tabs each count as one column. Lines with less leading
/// whitespace than the common indent (only possible for blank lines) are
/// left untouched.
///
/// # Examples
///
/// ```
/// use cdoc_rewriter::strip_common_indent;
///
/// assert_eq!(strip_common_indent("    <a>\n      <b/>\n    </a>"), "<a>\n  <b/>\n</a>");
/// ```
#[must_use]
pub fn strip_common_indent(text: &str) -> String {
    let indent = text
        .split('\n')
        .filter(|line| !is_blank(line))
        .map(indent_width)
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return text.to_owned();
    }

    text.split('\n')
        .map(|line| {
            if indent_width(line) >= indent {
                &line[indent..]
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Count leading spaces and tabs (always ASCII, so also a byte length).
fn indent_width(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}
