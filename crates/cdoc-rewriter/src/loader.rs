//! Whole-text entry points.

use std::sync::LazyLock;

use memchr::memchr2_iter;
use regex::Regex;
use tracing::trace;

use crate::engine::Fragments;
use crate::error::RewriteError;
use crate::options::RewriteOptions;
use crate::tokenizer::Tokenizer;

/// Matches a slot selector serialized with an explicit empty value.
static EMPTY_SLOT_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\sv-slot(?::[^\s=>"'/]+)?)="""#).expect("valid empty slot value regex")
});

/// Lazily rewrite `source` into output fragments.
///
/// The fragments are not normalized; use [`rewrite`] for final text.
pub fn fragments<'a, 'o>(
    source: &'a str,
    options: &'o RewriteOptions,
) -> Fragments<'a, 'o, Tokenizer<'a>> {
    Fragments::new(Tokenizer::new(source), options)
}

/// Whether `source` mentions `tag` anywhere, ignoring ASCII case.
///
/// A `false` result means no start tag with that name can occur in
/// `source`, so the text can be passed through without tokenizing it.
pub fn mentions_tag(source: &str, tag: &str) -> bool {
    let (haystack, needle) = (source.as_bytes(), tag.as_bytes());
    let Some(&first) = needle.first() else {
        return true;
    };
    memchr2_iter(
        first.to_ascii_lowercase(),
        first.to_ascii_uppercase(),
        haystack,
    )
    .any(|at| {
        haystack
            .get(at..at + needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}

/// Rewrite every occurrence of the target tag in `source`.
///
/// Text that does not mention the tag name in any letter case is returned
/// unchanged without being tokenized.
///
/// # Errors
///
/// Returns [`RewriteError`] on malformed markup or an unclosed occurrence.
/// No partial output is returned.
///
/// # Example
///
/// ```
/// use cdoc_rewriter::{RewriteOptions, rewrite};
///
/// let options = RewriteOptions::new("doc", "demo");
/// let html = rewrite(r#"<doc language="js">  const a = 1;  </doc>"#, &options).unwrap();
/// assert_eq!(
///     html,
///     "<demo language=\"js\">\n\
///      <template v-slot:code>\nconst a = 1;\n</template>\n\
///      <template v-slot:result>\nconst a = 1;\n</template>\n\
///      </demo>"
/// );
/// ```
pub fn rewrite(source: &str, options: &RewriteOptions) -> Result<String, RewriteError> {
    if !mentions_tag(source, &options.tag) {
        trace!(tag = %options.tag, "tag not present, skipping");
        return Ok(source.to_owned());
    }

    let mut output = String::with_capacity(source.len() * 2);
    for fragment in fragments(source, options) {
        fragment?.render_into(&mut output);
    }

    Ok(collapse_empty_slot_values(&output))
}

/// Turn `v-slot:name=""` into the shorthand `v-slot:name`.
fn collapse_empty_slot_values(html: &str) -> String {
    EMPTY_SLOT_VALUE.replace_all(html, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenizeError;
    use pretty_assertions::assert_eq;

    fn options() -> RewriteOptions {
        RewriteOptions::new("doc", "demo")
    }

    #[test]
    fn test_end_to_end() {
        let output = rewrite(r#"<doc language="js">  const a = 1;  </doc>"#, &options()).unwrap();
        assert_eq!(
            output,
            "<demo language=\"js\">\n<template v-slot:code>\nconst a = 1;\n</template>\n<template v-slot:result>\nconst a = 1;\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_source_without_tag_is_unchanged() {
        let source = "<template>\n  <p>unrelated & <broken</p>\n</template>";
        assert_eq!(rewrite(source, &options()).unwrap(), source);
    }

    #[test]
    fn test_surrounding_markup_is_preserved() {
        let source = concat!(
            "<template>\n",
            "  <section id=\"intro\">\n",
            "    <doc>\n",
            "      <button :disabled=\"busy\">Go</button>\n",
            "    </doc>\n",
            "  </section>\n",
            "</template>\n",
            "<script>\nexport default { data: () => ({ busy: false }) }\n</script>\n"
        );
        let output = rewrite(source, &options().with_omit_code_slot(true)).unwrap();
        assert_eq!(
            output,
            concat!(
                "<template>\n",
                "  <section id=\"intro\">\n",
                "    <demo language=\"html\">\n",
                "<template v-slot:result>\n",
                "<button :disabled=\"busy\">Go</button>\n",
                "</template>\n",
                "</demo>\n",
                "  </section>\n",
                "</template>\n",
                "<script>\nexport default { data: () => ({ busy: false }) }\n</script>\n"
            )
        );
    }

    #[test]
    fn test_omit_code_slot_keeps_unescaped_result() {
        let output = rewrite(
            r#"<doc omit-code-slot="true"><b>&amp;</b></doc>"#,
            &options(),
        )
        .unwrap();
        assert_eq!(
            output,
            "<demo language=\"html\">\n<template v-slot:result>\n<b>&amp;</b>\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_trim_false_keeps_blank_lines() {
        let output = rewrite(
            "<doc trim=\"false\" language=\"\">\n\nx\n\n</doc>",
            &options().with_omit_code_slot(true),
        )
        .unwrap();
        assert_eq!(
            output,
            "<demo>\n<template v-slot:result>\n\n\nx\n\n\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_bound_language_keeps_sigil() {
        let output = rewrite(
            r#"<doc :language="lang" omit-result-slot="1">x</doc>"#,
            &options(),
        )
        .unwrap();
        assert!(output.starts_with(r#"<demo :language="lang">"#));
    }

    #[test]
    fn test_nested_occurrence() {
        let output = rewrite("<doc>A<doc>B</doc>C</doc>", &options().with_language("")).unwrap();
        assert_eq!(
            output,
            concat!(
                "<demo>\n",
                "<template v-slot:code>\nA&lt;doc&gt;B&lt;/doc&gt;C\n</template>\n",
                "<template v-slot:result>\nA<doc>B</doc>C\n</template>\n",
                "</demo>"
            )
        );
    }

    #[test]
    fn test_dedent_then_trim() {
        let source = "<doc>\n    <ul>\n      <li>a</li>\n    </ul>\n  </doc>";
        let output = rewrite(source, &options().with_omit_code_slot(true)).unwrap();
        assert_eq!(
            output,
            "<demo language=\"html\">\n<template v-slot:result>\n<ul>\n  <li>a</li>\n</ul>\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_tag_substring_without_occurrence() {
        let source = "<p>use the doc tag</p>";
        assert_eq!(rewrite(source, &options()).unwrap(), source);
    }

    #[test]
    fn test_user_written_slot_values_are_collapsed() {
        let output = rewrite(
            r#"<doc omit-code-slot="1"><template v-slot:x="">y</template></doc>"#,
            &options().with_language(""),
        )
        .unwrap();
        assert_eq!(
            output,
            "<demo>\n<template v-slot:result>\n<template v-slot:x>y</template>\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_collapse_keeps_non_empty_values() {
        assert_eq!(
            collapse_empty_slot_values(r#"<t v-slot:a="" v-slot="" v-slot:b="p" data-v-slot="">"#),
            r#"<t v-slot:a v-slot v-slot:b="p" data-v-slot="">"#
        );
    }

    #[test]
    fn test_malformed_markup_fails() {
        let err = rewrite("<doc>x</doc><p class=\"a", &options()).unwrap_err();
        assert_eq!(
            err,
            RewriteError::Tokenize(TokenizeError::UnterminatedTag { offset: 12 })
        );
    }

    #[test]
    fn test_unclosed_occurrence_fails() {
        let err = rewrite("<p>\n<doc>x", &options()).unwrap_err();
        assert_eq!(
            err,
            RewriteError::UnclosedTag {
                tag: "doc".to_owned(),
                offset: 4,
            }
        );
    }

    #[test]
    fn test_fragments_are_lazy() {
        let options = options();
        let mut stream = fragments("a<doc>b</doc>", &options);
        assert_eq!(
            stream.next().unwrap().unwrap(),
            crate::Fragment::Source("a")
        );
        assert!(!stream.engine().is_inside());
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.engine().is_inside());
    }

    #[test]
    fn test_mentions_tag_ignores_ascii_case() {
        assert!(mentions_tag("<DOC>x</DOC>", "doc"));
        assert!(mentions_tag("<p>Doc</p>", "doc"));
        assert!(mentions_tag("<doc>", "DOC"));
        assert!(!mentions_tag("<p>do c</p>", "doc"));
        assert!(!mentions_tag("d", "doc"));
        assert!(mentions_tag("", ""));
    }

    #[test]
    fn test_uppercase_tag_is_rewritten() {
        let options = RewriteOptions::new("doc", "demo")
            .with_language("")
            .with_omit_code_slot(true);
        assert_eq!(
            rewrite("<DOC>x</DOC>", &options).unwrap(),
            "<demo>\n<template v-slot:result>\nx\n</template>\n</demo>"
        );
    }

    #[test]
    fn test_source_without_tag_in_any_case_is_unchanged() {
        let source = "<Template><P>Nothing</P></Template>";
        assert_eq!(rewrite(source, &options()).unwrap(), source);
    }

    #[test]
    fn test_mixed_case_control_attribute_is_applied_and_dropped() {
        let output = rewrite(
            r#"<doc Omit-Code-Slot="true" class="x">b</doc>"#,
            &options().with_language(""),
        )
        .unwrap();
        assert_eq!(
            output,
            "<demo class=\"x\">\n<template v-slot:result>\nb\n</template>\n</demo>"
        );
    }
}
