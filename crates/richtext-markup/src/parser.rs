use richtext_dom::{AttributesMap, ElementData, MarkupTree, NodeId, NodeType};

use crate::error::ParseError;
use crate::tokenizer::Token;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &["br"];

/// Whether `tag_name` is a void element (`<br>`).
#[must_use]
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// Builds a [`MarkupTree`] from the token stream using a stack of open elements.
pub struct TreeBuilder {
    tokens: Vec<Token>,
    tree: MarkupTree,
    open_elements: Vec<NodeId>,
}

impl TreeBuilder {
    /// Create a tree builder for `tokens`.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: MarkupTree::new(),
            open_elements: Vec::new(),
        }
    }

    /// Consume the token stream and return the finished tree.
    ///
    /// Elements still open when the tokens run out are closed implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnmatchedEndTag`] for an end tag that does not
    /// match any open element.
    pub fn run(mut self) -> Result<MarkupTree, ParseError> {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            match token {
                Token::Text(text) => {
                    let id = self.tree.alloc(NodeType::Text(text));
                    self.tree.append_child(self.current_node(), id);
                }
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => {
                    let attrs: AttributesMap = attributes
                        .into_iter()
                        .map(|attr| (attr.name, attr.value))
                        .collect();
                    let is_void = is_void_element(&name);
                    let id = self.tree.alloc(NodeType::Element(ElementData {
                        tag_name: name,
                        attrs,
                    }));
                    self.tree.append_child(self.current_node(), id);
                    if !self_closing && !is_void {
                        self.open_elements.push(id);
                    }
                }
                Token::EndTag { name, offset } => {
                    if is_void_element(&name) {
                        continue;
                    }
                    let position = self.open_elements.iter().rposition(|&id| {
                        self.tree
                            .as_element(id)
                            .is_some_and(|data| data.tag_name == name)
                    });
                    match position {
                        // Pop the matching element and anything left open inside it.
                        Some(index) => self.open_elements.truncate(index),
                        None => return Err(ParseError::UnmatchedEndTag { name, offset }),
                    }
                }
            }
        }
        Ok(self.tree)
    }

    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }
}

/// Print the tree rooted at `id` to stdout, one node per line.
pub fn print_tree(tree: &MarkupTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    if let Some(node) = tree.get(id) {
        match &node.node_type {
            NodeType::Root => {
                println!("{prefix}#root");
            }
            NodeType::Element(data) => {
                if data.attrs.is_empty() {
                    println!("{prefix}<{}>", data.tag_name);
                } else {
                    let mut attrs: Vec<String> = data
                        .attrs
                        .iter()
                        .map(|(k, v)| {
                            if v.is_empty() {
                                k.clone()
                            } else {
                                format!("{k}=\"{v}\"")
                            }
                        })
                        .collect();
                    attrs.sort();
                    println!("{prefix}<{} {}>", data.tag_name, attrs.join(" "));
                }
            }
            NodeType::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                println!("{prefix}\"{display}\"");
            }
        }
        for &child_id in tree.children(id) {
            print_tree(tree, child_id, indent + 1);
        }
    }
}
