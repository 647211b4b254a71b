//! Component-doc tag rewriter.
//!
//! This crate finds a configured tag (by default `<v-component-doc>`) in
//! template markup and rewrites each occurrence into a demo component with
//! two generated slots: one holding an escaped, formatted copy of the tag's
//! content and one holding the content itself.
//!
//! # Architecture
//!
//! - [`Tokenizer`]: borrowing markup tokenizer producing [`Token`]s
//! - [`RewriteOptions`]: caller configuration, resolved per occurrence into
//!   [`EffectiveOptions`] from the tag's control attributes
//! - [`RewriteEngine`]: explicit state machine turning tokens into [`Fragment`]s
//! - [`rewrite`]: whole-text entry point with the no-tag fast path and
//!   slot-selector normalization
//!
//! # Example
//!
//! ```
//! use cdoc_rewriter::{RewriteOptions, rewrite};
//!
//! let options = RewriteOptions::new("doc", "demo").with_omit_code_slot(true);
//! let html = rewrite("<doc language=\"vue\"><b>hi</b></doc>", &options).unwrap();
//! assert_eq!(
//!     html,
//!     "<demo language=\"vue\">\n<template v-slot:result>\n<b>hi</b>\n</template>\n</demo>"
//! );
//! ```

mod engine;
mod error;
mod fragment;
mod loader;
mod options;
mod text;
mod token;
mod tokenizer;

pub use engine::{Fragments, RewriteEngine};
pub use error::{RewriteError, TokenizeError};
pub use fragment::Fragment;
pub use loader::{fragments, mentions_tag, rewrite};
pub use options::{
    CONTROL_ATTRIBUTES, DEFAULT_COMPONENT, DEFAULT_TAG, EffectiveOptions, LanguageSpelling,
    RewriteOptions, is_control_attribute, resolve_boolean, resolve_string,
};
pub use text::{escape_html, strip_common_indent, trim_leading_and_trailing};
pub use token::{Attribute, EndTag, StartTag, Token};
pub use tokenizer::Tokenizer;
