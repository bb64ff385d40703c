//! Integration tests for the markup tree builder.

use richtext_dom::{MarkupTree, NodeId, NodeType};
use richtext_markup::{ParseError, parse, preprocess};

/// Helper to get the tag names / texts of a node's children.
fn child_summary(tree: &MarkupTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|&child| match &tree.get(child).unwrap().node_type {
            NodeType::Element(data) => format!("<{}>", data.tag_name),
            NodeType::Text(text) => text.clone(),
            NodeType::Root => "#root".to_string(),
        })
        .collect()
}

#[test]
fn test_plain_text_is_single_top_level_node() {
    let tree = parse("plain text").unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["plain text"]);
}

#[test]
fn test_empty_string_has_no_nodes() {
    let tree = parse("").unwrap();
    assert!(tree.children(NodeId::ROOT).is_empty());
}

#[test]
fn test_br_is_void() {
    let tree = parse("a<br>b").unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["a", "<br>", "b"]);
    let br = tree.children(NodeId::ROOT)[1];
    assert!(tree.children(br).is_empty());
}

#[test]
fn test_br_end_tag_is_ignored() {
    let tree = parse("a<br></br>b").unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["a", "<br>", "b"]);
}

#[test]
fn test_nesting() {
    let tree = parse("x<b>bold <i>both</i></b>y").unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["x", "<b>", "y"]);
    let bold = tree.children(NodeId::ROOT)[1];
    assert_eq!(child_summary(&tree, bold), vec!["bold ", "<i>"]);
    assert_eq!(tree.text_content(bold), "bold both");
}

#[test]
fn test_self_closing_node_embed() {
    let tree = parse(r#"a<node id="icon" align="center"/>b"#).unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["a", "<node>", "b"]);
    let embed = tree.children(NodeId::ROOT)[1];
    let data = tree.as_element(embed).unwrap();
    assert_eq!(data.id(), Some("icon"));
    assert_eq!(data.attr("align"), Some("center"));
}

#[test]
fn test_unclosed_elements_close_at_end() {
    let tree = parse("<b>never closed").unwrap();
    let bold = tree.children(NodeId::ROOT)[0];
    assert_eq!(child_summary(&tree, bold), vec!["never closed"]);
}

#[test]
fn test_misnested_end_tag_closes_inner_elements() {
    let tree = parse("<b><i>x</b>y").unwrap();
    assert_eq!(child_summary(&tree, NodeId::ROOT), vec!["<b>", "y"]);
}

#[test]
fn test_unmatched_end_tag_is_an_error() {
    assert_eq!(
        parse("a</i>").unwrap_err(),
        ParseError::UnmatchedEndTag {
            name: "i".to_string(),
            offset: 1,
        }
    );
}

#[test]
fn test_preprocessed_direction_marks_parse_as_spans() {
    let source = preprocess("a\u{202B}b\u{202C}", false);
    let tree = parse(&source).unwrap();
    let span = tree.children(NodeId::ROOT)[1];
    assert_eq!(tree.as_element(span).unwrap().attr("dir"), Some("rtl"));
    assert_eq!(tree.text_content(span), "b");
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = parse("<b").unwrap_err();
    assert_eq!(err.to_string(), "unterminated tag starting at byte 0");
}
