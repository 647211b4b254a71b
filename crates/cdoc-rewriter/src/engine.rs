//! The rewrite state machine.
//!
//! [`RewriteEngine`] consumes [`Token`]s one at a time and emits
//! [`Fragment`]s. It is either outside the target tag, passing tokens
//! through, or inside an occurrence, buffering raw content until the
//! matching close tag:
//!
//! ```text
//! Outside --<tag>--> Inside(0) --<tag>--> Inside(1) --</tag>--> Inside(0)
//!    ^                   |
//!    +------</tag>-------+  (emit slots + closing component tag)
//! ```
//!
//! [`Fragments`] drives the engine from any token iterator and yields the
//! output lazily.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{RewriteError, TokenizeError};
use crate::fragment::Fragment;
use crate::options::{EffectiveOptions, RewriteOptions, is_control_attribute};
use crate::text::{escape_html, strip_common_indent, trim_leading_and_trailing};
use crate::token::{EndTag, StartTag, Token};

/// Tag wrapping each generated slot.
const SLOT_TAG: &str = "template";

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between occurrences.
    Outside,
    /// Inside an occurrence; `depth` counts nested target tags.
    Inside { depth: usize },
}

/// The occurrence currently being buffered.
#[derive(Debug)]
struct Occurrence {
    options: EffectiveOptions,
    content: String,
    offset: usize,
}

/// State machine that rewrites occurrences of the target tag.
///
/// One engine handles one token stream. It holds no state shared with other
/// engines, so separate sources can be rewritten on separate threads.
///
/// # Example
///
/// ```
/// use cdoc_rewriter::{RewriteEngine, RewriteOptions, Tokenizer};
///
/// let options = RewriteOptions::new("doc", "demo").with_omit_code_slot(true);
/// let mut engine = RewriteEngine::new(&options);
/// let mut out = Vec::new();
/// for token in Tokenizer::new("<doc><b>hi</b></doc>") {
///     engine.step(token.unwrap(), &mut out);
/// }
/// engine.finish().unwrap();
///
/// let html: String = out.iter().map(ToString::to_string).collect();
/// assert_eq!(
///     html,
///     "<demo language=\"html\">\n<template v-slot:result=\"\">\n<b>hi</b>\n</template>\n</demo>"
/// );
/// ```
#[derive(Debug)]
pub struct RewriteEngine<'o> {
    options: &'o RewriteOptions,
    state: State,
    occurrence: Option<Occurrence>,
    occurrences: usize,
}

impl<'o> RewriteEngine<'o> {
    /// Create an engine for the given root options.
    #[must_use]
    pub fn new(options: &'o RewriteOptions) -> Self {
        Self {
            options,
            state: State::Outside,
            occurrence: None,
            occurrences: 0,
        }
    }

    /// Whether an occurrence is currently open.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        matches!(self.state, State::Inside { .. })
    }

    /// Number of nested target tags open inside the current occurrence.
    ///
    /// `None` when outside.
    #[must_use]
    pub fn nesting_level(&self) -> Option<usize> {
        match self.state {
            State::Outside => None,
            State::Inside { depth } => Some(depth),
        }
    }

    /// Number of occurrences rewritten so far.
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Content buffered for the open occurrence.
    #[must_use]
    pub fn buffered(&self) -> Option<&str> {
        self.occurrence.as_ref().map(|o| o.content.as_str())
    }

    /// Feed one token, appending any output to `out`.
    pub fn step<'a>(&mut self, token: Token<'a>, out: &mut Vec<Fragment<'a>>) {
        match token {
            Token::StartTag(tag) => self.start_tag(tag, out),
            Token::EndTag(tag) => self.end_tag(&tag, out),
            Token::Text(raw) | Token::Comment(raw) => self.passthrough(raw, out),
        }
    }

    /// Check that the stream ended outside any occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnclosedTag`] if an occurrence is still open.
    pub fn finish(&self) -> Result<(), RewriteError> {
        match &self.occurrence {
            Some(occurrence) => Err(RewriteError::UnclosedTag {
                tag: self.options.tag.clone(),
                offset: occurrence.offset,
            }),
            None => Ok(()),
        }
    }

    fn passthrough<'a>(&mut self, raw: &'a str, out: &mut Vec<Fragment<'a>>) {
        match &mut self.occurrence {
            Some(occurrence) => occurrence.content.push_str(raw),
            None => out.push(Fragment::Source(raw)),
        }
    }

    fn start_tag<'a>(&mut self, tag: StartTag<'a>, out: &mut Vec<Fragment<'a>>) {
        if !tag.is(&self.options.tag) {
            self.passthrough(tag.raw, out);
            return;
        }

        match self.state {
            State::Inside { depth } => {
                // Nested occurrences are opaque content of the outer one.
                if !tag.self_closing {
                    self.state = State::Inside { depth: depth + 1 };
                }
                self.passthrough(tag.raw, out);
            }
            State::Outside => {
                self.open(&tag, out);
                if tag.self_closing {
                    self.close(out);
                }
            }
        }
    }

    fn end_tag<'a>(&mut self, tag: &EndTag<'a>, out: &mut Vec<Fragment<'a>>) {
        if !tag.is(&self.options.tag) {
            self.passthrough(tag.raw, out);
            return;
        }

        match self.state {
            State::Inside { depth } if depth > 0 => {
                self.state = State::Inside { depth: depth - 1 };
                self.passthrough(tag.raw, out);
            }
            State::Inside { .. } => self.close(out),
            // A stray close tag is left for the host to deal with.
            State::Outside => out.push(Fragment::Source(tag.raw)),
        }
    }

    /// Start an occurrence and emit the component's start tag.
    fn open(&mut self, tag: &StartTag<'_>, out: &mut Vec<Fragment<'_>>) {
        let options = self.options.resolve(&tag.attrs);

        let mut attrs: Vec<(String, String)> = tag
            .attrs
            .iter()
            .filter(|attr| !is_control_attribute(attr.name))
            .map(|attr| (attr.name.to_owned(), attr.value.clone().into_owned()))
            .collect();
        if let Some((name, value)) = options.language_attribute() {
            attrs.push((name.to_owned(), value.to_owned()));
        }

        debug!(
            offset = tag.offset,
            component = %options.component,
            language = %options.language,
            "rewriting <{}>",
            self.options.tag
        );

        out.push(Fragment::StartTag {
            name: options.component.clone(),
            attrs,
        });

        self.state = State::Inside { depth: 0 };
        self.occurrence = Some(Occurrence {
            options,
            content: String::new(),
            offset: tag.offset,
        });
    }

    /// Finish the open occurrence: emit slots and the closing component tag.
    fn close<'a>(&mut self, out: &mut Vec<Fragment<'a>>) {
        self.state = State::Outside;
        let Some(Occurrence {
            options, content, ..
        }) = self.occurrence.take()
        else {
            return;
        };
        self.occurrences += 1;

        let mut generated: Vec<Fragment<'a>> = Vec::new();

        if !options.omit_code_slot {
            generated.push(Fragment::Text("\n".to_owned()));
            push_slot(
                &options.code_slot,
                &format_content(&escape_html(&content), &options),
                &mut generated,
            );
            generated.push(Fragment::Text("\n".to_owned()));
        }

        if !options.omit_result_slot {
            if options.omit_code_slot {
                generated.push(Fragment::Text("\n".to_owned()));
            }
            push_slot(
                &options.result_slot,
                &format_content(&content, &options),
                &mut generated,
            );
            generated.push(Fragment::Text("\n".to_owned()));
        }

        generated.push(Fragment::EndTag(options.component.clone()));

        if options.debug {
            let mut echo = String::new();
            for fragment in &generated {
                fragment.render_into(&mut echo);
            }
            out.append(&mut generated);
            out.push(Fragment::Comment(echo.replace("-->", "--&gt;")));
        } else {
            out.append(&mut generated);
        }
    }
}

/// Dedent then trim, as enabled.
fn format_content(content: &str, options: &EffectiveOptions) -> String {
    let mut formatted = if options.dedent {
        strip_common_indent(content)
    } else {
        content.to_owned()
    };
    if options.trim {
        formatted = trim_leading_and_trailing(&formatted);
    }
    formatted
}

/// Emit `<template v-slot:NAME="">\nBODY\n</template>`.
fn push_slot(name: &str, body: &str, out: &mut Vec<Fragment<'_>>) {
    out.push(Fragment::StartTag {
        name: SLOT_TAG.to_owned(),
        attrs: vec![(format!("v-slot:{name}"), String::new())],
    });
    let mut text = String::with_capacity(body.len() + 2);
    text.push('\n');
    text.push_str(body);
    text.push('\n');
    out.push(Fragment::Text(text));
    out.push(Fragment::EndTag(SLOT_TAG.to_owned()));
}

/// Lazy fragment stream over a token iterator.
///
/// Each call to `next` pulls tokens from the source until at least one
/// fragment is ready. The stream stops after the first error.
pub struct Fragments<'a, 'o, I> {
    tokens: I,
    engine: RewriteEngine<'o>,
    pending: VecDeque<Fragment<'a>>,
    scratch: Vec<Fragment<'a>>,
    done: bool,
}

impl<'a, 'o, I> Fragments<'a, 'o, I>
where
    I: Iterator<Item = Result<Token<'a>, TokenizeError>>,
{
    /// Wrap a token iterator.
    pub fn new(tokens: I, options: &'o RewriteOptions) -> Self {
        Self {
            tokens,
            engine: RewriteEngine::new(options),
            pending: VecDeque::new(),
            scratch: Vec::new(),
            done: false,
        }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &RewriteEngine<'o> {
        &self.engine
    }
}

impl<'a, I> Iterator for Fragments<'a, '_, I>
where
    I: Iterator<Item = Result<Token<'a>, TokenizeError>>,
{
    type Item = Result<Fragment<'a>, RewriteError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(Ok(fragment));
            }
            if self.done {
                return None;
            }
            match self.tokens.next() {
                Some(Ok(token)) => {
                    self.engine.step(token, &mut self.scratch);
                    self.pending.extend(self.scratch.drain(..));
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
                None => {
                    self.done = true;
                    if let Err(err) = self.engine.finish() {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}
