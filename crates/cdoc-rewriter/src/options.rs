//! Rewrite options and per-occurrence resolution.
//!
//! [`RewriteOptions`] holds the caller's root configuration. Each occurrence
//! of the target tag resolves its own [`EffectiveOptions`] by layering the
//! tag's control attributes over the root values. The root is never mutated.

use crate::token::Attribute;

/// Default target tag.
pub const DEFAULT_TAG: &str = "v-component-doc";

/// Default component the target tag is rewritten to.
pub const DEFAULT_COMPONENT: &str = "v-component-doc-prism";

/// Attributes that configure an occurrence and are removed from the output.
pub const CONTROL_ATTRIBUTES: &[&str] = &[
    "trim",
    "dedent",
    "language",
    ":language",
    "component",
    "debug",
    "code-slot",
    "result-slot",
    "omit-code-slot",
    "omit-result-slot",
];

/// Root configuration supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RewriteOptions {
    /// Tag to look for.
    pub tag: String,
    /// Tag the target tag is renamed to.
    #[cfg_attr(feature = "serde", serde(alias = "rewriteToComponent"))]
    pub component: String,
    /// Slot name for the escaped source.
    #[cfg_attr(feature = "serde", serde(alias = "code_slot"))]
    pub code_slot: String,
    /// Slot name for the live markup.
    #[cfg_attr(feature = "serde", serde(alias = "result_slot"))]
    pub result_slot: String,
    /// Highlight language passed to the component. Empty disables the attribute.
    pub language: String,
    /// Strip common indentation from slot content.
    pub dedent: bool,
    /// Drop leading and trailing blank lines from slot content.
    pub trim: bool,
    /// Skip the code slot.
    #[cfg_attr(feature = "serde", serde(alias = "omit_code_slot"))]
    pub omit_code_slot: bool,
    /// Skip the result slot.
    #[cfg_attr(feature = "serde", serde(alias = "omit_result_slot"))]
    pub omit_result_slot: bool,
    /// Append a comment echoing the generated markup after each occurrence.
    pub debug: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_owned(),
            component: DEFAULT_COMPONENT.to_owned(),
            code_slot: "code".to_owned(),
            result_slot: "result".to_owned(),
            language: "html".to_owned(),
            dedent: true,
            trim: true,
            omit_code_slot: false,
            omit_result_slot: false,
            debug: false,
        }
    }
}

impl RewriteOptions {
    /// Create options for a target tag and component, other values default.
    #[must_use]
    pub fn new(tag: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            component: component.into(),
            ..Self::default()
        }
    }

    /// Set the highlight language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the code and result slot names.
    #[must_use]
    pub fn with_slots(mut self, code: impl Into<String>, result: impl Into<String>) -> Self {
        self.code_slot = code.into();
        self.result_slot = result.into();
        self
    }

    /// Enable or disable trimming.
    #[must_use]
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Enable or disable dedenting.
    #[must_use]
    pub fn with_dedent(mut self, dedent: bool) -> Self {
        self.dedent = dedent;
        self
    }

    /// Skip the code slot.
    #[must_use]
    pub fn with_omit_code_slot(mut self, omit: bool) -> Self {
        self.omit_code_slot = omit;
        self
    }

    /// Skip the result slot.
    #[must_use]
    pub fn with_omit_result_slot(mut self, omit: bool) -> Self {
        self.omit_result_slot = omit;
        self
    }

    /// Enable the debug echo comment.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolve the options for one occurrence from its start tag attributes.
    ///
    /// `:language` wins over `language` when both are present, and the chosen
    /// spelling is kept so the emitted attribute uses it too.
    #[must_use]
    pub fn resolve(&self, attrs: &[Attribute<'_>]) -> EffectiveOptions {
        let (language, language_spelling) = if attrs.iter().any(|attr| attr.is(":language")) {
            (
                resolve_string(attrs, ":language", &self.language),
                LanguageSpelling::Bound,
            )
        } else {
            (
                resolve_string(attrs, "language", &self.language),
                LanguageSpelling::Literal,
            )
        };

        EffectiveOptions {
            component: resolve_string(attrs, "component", &self.component).to_owned(),
            code_slot: resolve_string(attrs, "code-slot", &self.code_slot).to_owned(),
            result_slot: resolve_string(attrs, "result-slot", &self.result_slot).to_owned(),
            language: language.to_owned(),
            language_spelling,
            dedent: resolve_boolean(attrs, "dedent", self.dedent),
            trim: resolve_boolean(attrs, "trim", self.trim),
            omit_code_slot: resolve_boolean(attrs, "omit-code-slot", self.omit_code_slot),
            omit_result_slot: resolve_boolean(attrs, "omit-result-slot", self.omit_result_slot),
            debug: resolve_boolean(attrs, "debug", self.debug),
        }
    }
}

/// Which attribute spelling carried the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageSpelling {
    /// `language="js"`: a literal value.
    #[default]
    Literal,
    /// `:language="expr"`: a bound expression.
    Bound,
}

impl LanguageSpelling {
    /// Attribute name to emit for this spelling.
    #[must_use]
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Literal => "language",
            Self::Bound => ":language",
        }
    }
}

/// Options in effect for a single occurrence of the target tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    /// Tag to rename the occurrence to.
    pub component: String,
    /// Code slot name.
    pub code_slot: String,
    /// Result slot name.
    pub result_slot: String,
    /// Language value; empty means no language attribute is emitted.
    pub language: String,
    /// Spelling used for the language attribute.
    pub language_spelling: LanguageSpelling,
    /// Strip common indentation.
    pub dedent: bool,
    /// Drop outer blank lines.
    pub trim: bool,
    /// Skip the code slot.
    pub omit_code_slot: bool,
    /// Skip the result slot.
    pub omit_result_slot: bool,
    /// Echo generated markup in a trailing comment.
    pub debug: bool,
}

impl EffectiveOptions {
    /// The language attribute to add to the component, if any.
    #[must_use]
    pub fn language_attribute(&self) -> Option<(&'static str, &str)> {
        (!self.language.is_empty())
            .then(|| (self.language_spelling.attribute_name(), self.language.as_str()))
    }
}

/// Value of the first attribute named `name` in any ASCII case, or
/// `fallback`.
///
/// # Examples
///
/// ```
/// use cdoc_rewriter::{Attribute, resolve_string};
///
/// let attrs = [Attribute::new("slot", "a"), Attribute::new("slot", "b")];
/// assert_eq!(resolve_string(&attrs, "slot", "x"), "a");
/// assert_eq!(resolve_string(&attrs, "other", "x"), "x");
/// ```
#[must_use]
pub fn resolve_string<'v>(attrs: &'v [Attribute<'_>], name: &str, fallback: &'v str) -> &'v str {
    attrs
        .iter()
        .find(|attr| attr.is(name))
        .map_or(fallback, |attr| attr.value.as_ref())
}

/// Boolean value of the attribute `name`, or `fallback`.
///
/// The attribute is looked up with the fallback's text (`"true"`/`"false"`)
/// as default. When the result equals that text the fallback is returned
/// as-is; otherwise only `"true"` and `"1"` (case-sensitive) are true.
/// An attribute spelled exactly like the fallback therefore counts as
/// "not overridden".
///
/// # Examples
///
/// ```
/// use cdoc_rewriter::{Attribute, resolve_boolean};
///
/// assert!(!resolve_boolean(&[Attribute::new("trim", "false")], "trim", true));
/// assert!(resolve_boolean(&[Attribute::new("trim", "1")], "trim", false));
/// assert!(!resolve_boolean(&[Attribute::new("trim", "yes")], "trim", true));
/// assert!(resolve_boolean(&[], "trim", true));
/// ```
#[must_use]
pub fn resolve_boolean(attrs: &[Attribute<'_>], name: &str, fallback: bool) -> bool {
    let fallback_text = if fallback { "true" } else { "false" };
    let value = resolve_string(attrs, name, fallback_text);
    if value == fallback_text {
        return fallback;
    }
    matches!(value, "true" | "1")
}

/// Whether `name` is one of the [`CONTROL_ATTRIBUTES`], ignoring ASCII case.
#[must_use]
pub fn is_control_attribute(name: &str) -> bool {
    CONTROL_ATTRIBUTES
        .iter()
        .any(|control| control.eq_ignore_ascii_case(name))
}
