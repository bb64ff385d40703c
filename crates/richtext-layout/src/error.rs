//! Rebuild errors.

use richtext_markup::ParseError;
use thiserror::Error;

use crate::style::StyleError;

/// Why a rebuild failed under strict validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The markup could not be parsed.
    #[error("markup: {0}")]
    Markup(#[from] ParseError),

    /// A `style` attribute held an unsupported key or an invalid value.
    #[error("style: {0}")]
    Style(#[from] StyleError),

    /// A `<node id>` named a visual that is not in the node map.
    #[error("no embedded node registered for id `{0}`")]
    MissingEmbed(String),

    /// An anchor's `href` is not a known link placeholder.
    #[error("unresolved link `{0}`")]
    UnresolvedLink(String),
}
