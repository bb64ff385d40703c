use strum_macros::Display;

use crate::character_reference;
use crate::error::ParseError;

/// The tokenizer state machine, a reduced version of the HTML one that only
/// covers tags, attributes and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Character data outside of tags.
    Data,
    /// Inside a start or end tag name.
    TagName,
    /// Between attributes, or after the tag name.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// After `=`, before the value.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// After a `/` inside a tag.
    SelfClosingStartTag,
}

/// An attribute on a start tag token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    /// Decoded attribute value, empty for bare attributes.
    pub value: String,
}

/// The tokenizer emits tokens of these types to the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A maximal run of character data (comments do not split it).
    Text(String),
    /// `<name attr=value ...>` or `<name .../>`.
    StartTag {
        /// Lower-cased tag name.
        name: String,
        /// Whether the tag ended in `/>`.
        self_closing: bool,
        /// Attributes in source order.
        attributes: Vec<Attribute>,
    },
    /// `</name>`. Attributes on end tags are dropped.
    EndTag {
        /// Lower-cased tag name.
        name: String,
        /// Byte offset of the `<`, reported if the tag closes nothing.
        offset: usize,
    },
}

/// Tag token under construction.
#[derive(Debug, Default)]
struct PendingTag {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Vec<Attribute>,
    offset: usize,
}

/// Converts a markup string into a flat token stream.
pub struct MarkupTokenizer<'a> {
    input: &'a str,
    pos: usize,
    state: TokenizerState,
    text: String,
    tag: PendingTag,
    attr: Option<Attribute>,
    quote_offset: usize,
    tokens: Vec<Token>,
}

impl<'a> MarkupTokenizer<'a> {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: TokenizerState::Data,
            text: String::new(),
            tag: PendingTag::default(),
            attr: None,
            quote_offset: 0,
            tokens: Vec::new(),
        }
    }

    /// Run the state machine to the end of the input.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for unterminated tags, attribute values and
    /// comments, and for `</>`.
    pub fn run(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(c) = self.peek() {
            match self.state {
                TokenizerState::Data => self.data_state(c)?,
                TokenizerState::TagName => {
                    self.pos += c.len_utf8();
                    match c {
                        c if c.is_ascii_whitespace() => {
                            self.state = TokenizerState::BeforeAttributeName;
                        }
                        '/' => self.state = TokenizerState::SelfClosingStartTag,
                        '>' => self.emit_tag(),
                        _ => self.tag.name.push(c.to_ascii_lowercase()),
                    }
                }
                TokenizerState::BeforeAttributeName => match c {
                    c if c.is_ascii_whitespace() => self.pos += 1,
                    '/' => {
                        self.pos += 1;
                        self.state = TokenizerState::SelfClosingStartTag;
                    }
                    '>' => {
                        self.pos += 1;
                        self.emit_tag();
                    }
                    _ => {
                        self.attr = Some(Attribute {
                            name: String::new(),
                            value: String::new(),
                        });
                        self.state = TokenizerState::AttributeName;
                    }
                },
                TokenizerState::AttributeName => {
                    self.pos += c.len_utf8();
                    match c {
                        c if c.is_ascii_whitespace() => {
                            self.state = TokenizerState::AfterAttributeName;
                        }
                        '=' => self.state = TokenizerState::BeforeAttributeValue,
                        '/' => {
                            self.finish_attribute();
                            self.state = TokenizerState::SelfClosingStartTag;
                        }
                        '>' => {
                            self.finish_attribute();
                            self.emit_tag();
                        }
                        _ => {
                            if let Some(attr) = self.attr.as_mut() {
                                attr.name.push(c.to_ascii_lowercase());
                            }
                        }
                    }
                }
                TokenizerState::AfterAttributeName => match c {
                    c if c.is_ascii_whitespace() => self.pos += 1,
                    '=' => {
                        self.pos += 1;
                        self.state = TokenizerState::BeforeAttributeValue;
                    }
                    _ => {
                        // A bare attribute followed by something else; reprocess.
                        self.finish_attribute();
                        self.state = TokenizerState::BeforeAttributeName;
                    }
                },
                TokenizerState::BeforeAttributeValue => match c {
                    c if c.is_ascii_whitespace() => self.pos += 1,
                    '"' | '\'' => {
                        self.quote_offset = self.pos;
                        self.pos += 1;
                        self.state = if c == '"' {
                            TokenizerState::AttributeValueDoubleQuoted
                        } else {
                            TokenizerState::AttributeValueSingleQuoted
                        };
                    }
                    '>' => {
                        self.pos += 1;
                        self.finish_attribute();
                        self.emit_tag();
                    }
                    _ => self.state = TokenizerState::AttributeValueUnquoted,
                },
                TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted => {
                    let quote = if self.state == TokenizerState::AttributeValueDoubleQuoted {
                        '"'
                    } else {
                        '\''
                    };
                    if c == quote {
                        self.pos += 1;
                        self.finish_attribute();
                        self.state = TokenizerState::BeforeAttributeName;
                    } else {
                        let decoded = self.consume_char_or_reference(c);
                        self.push_attribute_value(decoded);
                    }
                }
                TokenizerState::AttributeValueUnquoted => match c {
                    c if c.is_ascii_whitespace() => {
                        self.pos += 1;
                        self.finish_attribute();
                        self.state = TokenizerState::BeforeAttributeName;
                    }
                    '>' => {
                        self.pos += 1;
                        self.finish_attribute();
                        self.emit_tag();
                    }
                    _ => {
                        let decoded = self.consume_char_or_reference(c);
                        self.push_attribute_value(decoded);
                    }
                },
                TokenizerState::SelfClosingStartTag => {
                    if c == '>' {
                        self.pos += 1;
                        self.tag.self_closing = true;
                        self.emit_tag();
                    } else {
                        // A stray slash inside the tag; treat it as whitespace.
                        self.state = TokenizerState::BeforeAttributeName;
                    }
                }
            }
        }

        match self.state {
            TokenizerState::Data => {
                self.flush_text();
                Ok(self.tokens)
            }
            TokenizerState::AttributeValueDoubleQuoted
            | TokenizerState::AttributeValueSingleQuoted => {
                Err(ParseError::UnterminatedAttributeValue {
                    offset: self.quote_offset,
                })
            }
            _ => Err(ParseError::UnterminatedTag {
                offset: self.tag.offset,
            }),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn data_state(&mut self, c: char) -> Result<(), ParseError> {
        if c != '<' {
            let decoded = self.consume_char_or_reference(c);
            self.text.push(decoded);
            return Ok(());
        }

        let rest = self.rest();
        if rest.starts_with("<!--") {
            let offset = self.pos;
            let Some(end) = rest[4..].find("-->") else {
                return Err(ParseError::UnterminatedComment { offset });
            };
            self.pos += 4 + end + 3;
            return Ok(());
        }

        let mut after = rest[1..].chars();
        let (is_end, first) = match after.next() {
            Some('/') => (true, after.next()),
            other => (false, other),
        };
        match first {
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.flush_text();
                self.tag = PendingTag {
                    is_end,
                    offset: self.pos,
                    ..PendingTag::default()
                };
                self.pos += if is_end { 2 } else { 1 };
                self.state = TokenizerState::TagName;
            }
            _ if is_end => return Err(ParseError::EmptyTagName { offset: self.pos }),
            // A lone `<` followed by a non-letter is plain text, as in HTML.
            _ => {
                self.pos += 1;
                self.text.push('<');
            }
        }
        Ok(())
    }

    /// Consume one character at the cursor, decoding a character reference if
    /// one starts there.
    fn consume_char_or_reference(&mut self, c: char) -> char {
        if c == '&'
            && let Some((decoded, len)) = character_reference::decode(self.rest())
        {
            self.pos += len;
            return decoded;
        }
        self.pos += c.len_utf8();
        c
    }

    fn push_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.attr.as_mut() {
            attr.value.push(c);
        }
    }

    fn finish_attribute(&mut self) {
        if let Some(attr) = self.attr.take()
            && !attr.name.is_empty()
        {
            // The last occurrence of a repeated attribute wins.
            self.tag.attributes.retain(|existing| existing.name != attr.name);
            self.tag.attributes.push(attr);
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(Token::Text(std::mem::take(&mut self.text)));
        }
    }

    fn emit_tag(&mut self) {
        let tag = std::mem::take(&mut self.tag);
        let token = if tag.is_end {
            Token::EndTag {
                name: tag.name,
                offset: tag.offset,
            }
        } else {
            Token::StartTag {
                name: tag.name,
                self_closing: tag.self_closing,
                attributes: tag.attributes,
            }
        };
        self.tokens.push(token);
        self.state = TokenizerState::Data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        MarkupTokenizer::new(input).run().unwrap()
    }

    fn start(name: &str, attributes: &[(&str, &str)]) -> Token {
        Token::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes: attributes
                .iter()
                .map(|(n, v)| Attribute {
                    name: (*n).to_string(),
                    value: (*v).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_text_and_tags() {
        assert_eq!(
            tokenize("a<B>b</b>"),
            vec![
                Token::Text("a".to_string()),
                start("b", &[]),
                Token::Text("b".to_string()),
                Token::EndTag {
                    name: "b".to_string(),
                    offset: 5,
                },
            ]
        );
    }

    #[test]
    fn test_attribute_forms() {
        assert_eq!(
            tokenize(r#"<a href="{{x}}" dir='rtl' id=n1 hidden>"#),
            vec![start(
                "a",
                &[("href", "{{x}}"), ("dir", "rtl"), ("id", "n1"), ("hidden", "")]
            )]
        );
    }

    #[test]
    fn test_self_closing() {
        assert_eq!(
            tokenize(r#"<node id="icon"/>"#),
            vec![Token::StartTag {
                name: "node".to_string(),
                self_closing: true,
                attributes: vec![Attribute {
                    name: "id".to_string(),
                    value: "icon".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn test_references_decoded_in_text_and_attributes() {
        assert_eq!(
            tokenize(r#"a &amp; b<span style="color:&quot;red&quot;">"#),
            vec![
                Token::Text("a & b".to_string()),
                start("span", &[("style", "color:\"red\"")]),
            ]
        );
    }

    #[test]
    fn test_comments_do_not_split_text() {
        assert_eq!(tokenize("a<!-- note -->b"), vec![Token::Text("ab".to_string())]);
    }

    #[test]
    fn test_lone_less_than_is_text() {
        assert_eq!(tokenize("1 < 2"), vec![Token::Text("1 < 2".to_string())]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            MarkupTokenizer::new("ab<b").run(),
            Err(ParseError::UnterminatedTag { offset: 2 })
        );
        assert_eq!(
            MarkupTokenizer::new(r#"<a href="x>"#).run(),
            Err(ParseError::UnterminatedAttributeValue { offset: 8 })
        );
        assert_eq!(
            MarkupTokenizer::new("x<!-- y").run(),
            Err(ParseError::UnterminatedComment { offset: 1 })
        );
        assert_eq!(
            MarkupTokenizer::new("</>").run(),
            Err(ParseError::EmptyTagName { offset: 0 })
        );
    }
}
