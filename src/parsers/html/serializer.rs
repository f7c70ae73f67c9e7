use std::io;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};

use super::dom::{NodeData, NodeId, Tree};
use super::fragment::Fragment;

/// Handle that lets html5ever's serializer walk an arena node
pub struct SerializableNode<'a> {
    tree: &'a Tree,
    node: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(tree: &'a Tree, node: NodeId) -> Self {
        Self { tree, node }
    }

    fn serialize_children<S: Serializer>(&self, serializer: &mut S) -> io::Result<()> {
        for child in self.tree.children(self.node) {
            SerializableNode::new(self.tree, child)
                .serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match (&traversal_scope, &self.tree[self.node].data) {
            (TraversalScope::IncludeNode, NodeData::Element { name, attrs }) => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|attr| (&attr.name, &*attr.value)),
                )?;
                self.serialize_children(serializer)?;
                serializer.end_elem(name.clone())
            }
            (TraversalScope::ChildrenOnly(_), NodeData::Element { .. })
            | (_, NodeData::Document) => self.serialize_children(serializer),
            (TraversalScope::ChildrenOnly(_), _) => Ok(()),
            (TraversalScope::IncludeNode, NodeData::Doctype { name }) => {
                serializer.write_doctype(name)
            }
            (TraversalScope::IncludeNode, NodeData::Text { contents }) => {
                serializer.write_text(contents)
            }
            (TraversalScope::IncludeNode, NodeData::Comment { contents }) => {
                serializer.write_comment(contents)
            }
        }
    }
}

/// 序列化单个节点（包含节点本身）
pub fn serialize_node(tree: &Tree, node: NodeId) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    serialize(
        &mut buf,
        &SerializableNode::new(tree, node),
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 按顺序序列化 Fragment 的所有顶层节点
pub fn serialize_fragment(tree: &Tree, fragment: &Fragment) -> io::Result<String> {
    let mut contents = String::new();
    for node in fragment.nodes(tree) {
        contents.push_str(&serialize_node(tree, node)?);
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::parser::{parse_html, ParseContext};

    fn round_trip(html: &str, context: ParseContext) -> String {
        let mut tree = Tree::new();
        let doc = parse_html(&mut tree, html, context).unwrap();
        serialize_fragment(&tree, &doc).unwrap()
    }

    #[test]
    fn fragment_round_trip() {
        let html = r#"<a id="target" href="qux/page.html">x</a><!--c--><p>a &amp; b</p>"#;
        assert_eq!(round_trip(html, ParseContext::Body), html);
    }

    #[test]
    fn raw_text_and_void_elements() {
        let html = r#"<link rel="import" href="a.html"><script>if (a < b) {}</script><style>a > b {}</style>"#;
        assert_eq!(round_trip(html, ParseContext::Body), html);
    }

    #[test]
    fn document_keeps_doctype() {
        let html = "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>";
        assert_eq!(round_trip(html, ParseContext::Document), html);
    }

    #[test]
    fn created_nodes_serialize_as_html() {
        let mut tree = Tree::new();
        let script = tree.create_script("a < b;");
        assert_eq!(
            serialize_node(&tree, script).unwrap(),
            "<script>a < b;</script>"
        );

        let external = tree.create_external_script("app.js");
        assert_eq!(
            serialize_node(&tree, external).unwrap(),
            r#"<script src="app.js"></script>"#
        );
    }

    #[test]
    fn template_contents_serialize_inside_template() {
        let html = "<template><p>x</p></template>";
        assert_eq!(round_trip(html, ParseContext::Body), html);
    }
}
