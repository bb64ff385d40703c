//! The inline `style` attribute
//!
//! A restricted declaration list: `color` plus the CSS font longhands.
//! Selectors, shorthands and `!important` are not understood.

use std::str::FromStr;

use super::{ColorValue, StyleError, StyleKey};

/// One validated declaration from a `style` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `color: <color>` replaces the fill.
    Fill(ColorValue),
    /// A font longhand merged into a copy of the inherited font.
    Font {
        /// Which longhand.
        key: StyleKey,
        /// Its raw CSS value.
        value: String,
    },
}

/// Parse `key: value; key: value` into declarations in source order.
///
/// Every declaration is reported independently, so a caller running
/// leniently can keep the valid ones and drop the rest.
#[must_use]
pub fn parse_style_attribute(text: &str) -> Vec<Result<Declaration, StyleError>> {
    text.split(';')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(parse_declaration)
        .collect()
}

fn parse_declaration(raw: &str) -> Result<Declaration, StyleError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(StyleError::MalformedDeclaration(raw.to_string()));
    };
    let name = name.trim();
    let value = value.trim();
    let key = StyleKey::from_str(name).map_err(|_| StyleError::UnknownKey(name.to_string()))?;
    if value.is_empty() {
        return Err(StyleError::MalformedDeclaration(raw.to_string()));
    }
    match key {
        StyleKey::Color => ColorValue::parse(value).map(Declaration::Fill),
        _ => Ok(Declaration::Font {
            key,
            value: value.to_string(),
        }),
    }
}
