//! 基于 arena 的 HTML 节点树
//!
//! 所有节点都存放在 [`Tree`] 里，通过 [`NodeId`] 下标互相引用。父节点只记录首尾
//! 两个子节点，同一父节点下的子节点组成双向链表。父/兄弟链接都是普通下标，不持有
//! 所有权，因此被摘下的子树只是不再可达，不会形成引用环。

use std::ops::{Index, IndexMut};

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::StrTendril;
use html5ever::{namespace_url, ns, LocalName};

/// Index of a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Doctype {
        name: StrTendril,
    },
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text {
        contents: StrTendril,
    },
    Comment {
        contents: StrTendril,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }
}

/// Arena owning every node parsed or created during one run.
///
/// Detached nodes stay allocated but unreachable; the arena is dropped as a
/// whole once the flattened document has been serialized.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// 创建 HTML 命名空间下的元素节点
    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(key, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*key)),
                value: StrTendril::from_slice(value),
            })
            .collect();

        self.create_node(NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(name)),
            attrs,
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create_node(NodeData::Text {
            contents: StrTendril::from_slice(text),
        })
    }

    /// `<script>` element holding `content` inline
    pub fn create_script(&mut self, content: &str) -> NodeId {
        let script = self.create_element("script", &[]);
        self.set_text_content(script, content);
        script
    }

    /// `<script src="...">` element with no content
    pub fn create_external_script(&mut self, src: &str) -> NodeId {
        self.create_element("script", &[("src", src)])
    }

    pub fn create_style(&mut self, content: &str, attrs: &[(&str, &str)]) -> NodeId {
        let style = self.create_element("style", attrs);
        self.set_text_content(style, content);
        style
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self[id].prev_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self[id].next_sibling
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self[id].first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self[id].last_child
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].first_child,
        }
    }

    /// 获取节点名称
    pub fn get_node_name(&self, id: NodeId) -> Option<&str> {
        match &self[id].data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    /// 获取节点属性值
    pub fn get_node_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        match &self[id].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|attr| &*attr.name.local == attr_name)
                .map(|attr| &*attr.value),
            _ => None,
        }
    }

    /// 按源码顺序列出元素的全部属性
    pub fn get_node_attrs(&self, id: NodeId) -> Vec<(&str, &str)> {
        match &self[id].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .map(|attr| (&*attr.name.local, &*attr.value))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 设置节点属性；`attr_value` 为 `None` 时删除该属性
    pub fn set_node_attr(&mut self, id: NodeId, attr_name: &str, attr_value: Option<&str>) {
        if let NodeData::Element { attrs, .. } = &mut self[id].data {
            let mut i = 0;
            let mut found_existing_attr: bool = false;

            while i < attrs.len() {
                if &*attrs[i].name.local == attr_name {
                    found_existing_attr = true;

                    if let Some(attr_value) = attr_value {
                        attrs[i].value.clear();
                        attrs[i].value.push_slice(attr_value);
                    } else {
                        attrs.remove(i);
                        continue;
                    }
                }

                i += 1;
            }

            if !found_existing_attr {
                if let Some(attr_value) = attr_value {
                    attrs.push(Attribute {
                        name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                        value: StrTendril::from_slice(attr_value),
                    });
                }
            }
        }
    }

    /// Concatenated contents of the node's direct text children
    pub fn get_text_content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for child in self.children(id) {
            if let NodeData::Text { contents } = &self[child].data {
                content.push_str(contents);
            }
        }
        content
    }

    /// Replaces every child of the node with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let children: Vec<NodeId> = self.children(id).collect();

        if let [only] = children[..] {
            if let NodeData::Text { contents } = &mut self[only].data {
                contents.clear();
                contents.push_slice(text);
                return;
            }
        }

        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node);
        }
    }

    /// Unlinks the node from its parent and siblings. Safe to call on a node
    /// that is already detached.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self[id];
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        if let Some(prev) = prev {
            self[prev].next_sibling = next;
        }
        if let Some(next) = next {
            self[next].prev_sibling = prev;
        }
        if let Some(parent) = parent {
            if self[parent].first_child == Some(id) {
                self[parent].first_child = next;
            }
            if self[parent].last_child == Some(id) {
                self[parent].last_child = prev;
            }
        }

        let node = &mut self[id];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Attaches `child` as the new last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.detach(child);

        let last = self[parent].last_child;
        {
            let node = &mut self[child];
            node.parent = Some(parent);
            node.prev_sibling = last;
        }

        match last {
            Some(last) => self[last].next_sibling = Some(child),
            None => self[parent].first_child = Some(child),
        }
        self[parent].last_child = Some(child);
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree[current].next_sibling;
        Some(current)
    }
}
