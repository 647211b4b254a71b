//! Error types for tokenizing and rewriting.

/// Malformed markup reported by the [`Tokenizer`](crate::Tokenizer).
///
/// Offsets are byte positions of the construct's opening `<` in the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenizeError {
    /// Input ended inside a start or end tag.
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag {
        /// Byte offset of the tag's `<`.
        offset: usize,
    },

    /// Input ended inside a comment, declaration or processing instruction.
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment {
        /// Byte offset of the comment's `<`.
        offset: usize,
    },
}

impl TokenizeError {
    /// Byte offset of the offending construct.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::UnterminatedTag { offset } | Self::UnterminatedComment { offset } => *offset,
        }
    }
}

/// Error that aborts a rewrite.
///
/// No partial output is produced once one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// The tokenizer hit malformed markup.
    #[error("malformed markup: {0}")]
    Tokenize(#[from] TokenizeError),

    /// Input ended while an occurrence of the target tag was still open.
    #[error("<{tag}> opened at byte {offset} is never closed")]
    UnclosedTag {
        /// Target tag name.
        tag: String,
        /// Byte offset of the opening tag.
        offset: usize,
    },
}
