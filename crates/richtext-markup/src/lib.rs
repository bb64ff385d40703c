//! Tokenizer and tree builder for the richtext markup dialect.
//!
//! # Scope
//!
//! The dialect is a small, lenient HTML subset:
//! - Text with character references (`&amp;`, `&lt;`, `&#8212;`, ...)
//! - Start tags with double-quoted, single-quoted, unquoted or bare attributes
//! - End tags, self-closing tags (`<node id="x"/>`) and the void `<br>`
//! - Comments, which are dropped
//!
//! Elements still open at the end of the input are closed implicitly. Anything
//! that cannot be tokenized (an unterminated tag or comment) or an end tag with
//! no matching start tag is reported as a [`ParseError`].
//!
//! # Not Implemented
//!
//! - The full named character reference table
//! - Raw text elements (`<script>`, `<style>`) and DOCTYPEs

/// Character reference decoding.
pub mod character_reference;
/// Parse errors.
pub mod error;
/// Tree construction from the token stream.
pub mod parser;
/// Source rewrites applied before tokenizing.
pub mod preprocess;
/// Markup tokenizer.
pub mod tokenizer;

pub use error::ParseError;
pub use parser::{TreeBuilder, is_void_element, print_tree};
pub use preprocess::{LRE, PDF, RLE, preprocess};
pub use tokenizer::{Attribute, MarkupTokenizer, Token, TokenizerState};

use richtext_dom::MarkupTree;

/// Tokenize and build the tree for `markup` in one step.
///
/// # Errors
///
/// Returns the first [`ParseError`] found by the tokenizer or tree builder.
pub fn parse(markup: &str) -> Result<MarkupTree, ParseError> {
    let tokens = MarkupTokenizer::new(markup).run()?;
    TreeBuilder::new(tokens).run()
}
