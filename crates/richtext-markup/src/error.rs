//! Parse errors for the markup dialect.

use thiserror::Error;

/// A reason the markup could not be turned into a tree.
///
/// Offsets are byte offsets into the string handed to the tokenizer (after
/// preprocessing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `<` opened a tag that never reached its `>`.
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag {
        /// Offset of the `<`.
        offset: usize,
    },

    /// A quoted attribute value ran to the end of the input.
    #[error("unterminated attribute value starting at byte {offset}")]
    UnterminatedAttributeValue {
        /// Offset of the opening quote.
        offset: usize,
    },

    /// A `<!--` with no `-->`.
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment {
        /// Offset of the `<!--`.
        offset: usize,
    },

    /// `</>` or an end tag whose name is not a letter sequence.
    #[error("empty tag name at byte {offset}")]
    EmptyTagName {
        /// Offset of the `<`.
        offset: usize,
    },

    /// An end tag that closes nothing on the stack of open elements.
    #[error("end tag </{name}> at byte {offset} has no matching start tag")]
    UnmatchedEndTag {
        /// Lower-cased tag name.
        name: String,
        /// Offset of the `<`.
        offset: usize,
    },
}
