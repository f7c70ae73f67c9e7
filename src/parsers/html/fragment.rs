//! Fragment 视图与拼接操作
//!
//! [`Fragment`] 只记录一段兄弟节点的首尾两个下标，本身不拥有节点。解析出的 HTML
//! 文件和用于替换的子树都以 Fragment 的形式出现；所有拼接操作都在 [`Tree`] 上进行，
//! 并同时维护 Fragment 的边界。

use super::dom::{NodeId, Tree};
use super::predicate::Predicate;

/// Non-owning view over a contiguous run of sibling nodes.
///
/// Either both ends are set or neither is; an empty fragment is a valid state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    first: Option<NodeId>,
    last: Option<NodeId>,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(id: NodeId) -> Self {
        Self {
            first: Some(id),
            last: Some(id),
        }
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.first
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Number of top-level nodes, counted by walking the sibling chain
    pub fn len(&self, tree: &Tree) -> usize {
        self.nodes(tree).count()
    }

    /// Top-level nodes from first to last
    pub fn nodes<'a>(&self, tree: &'a Tree) -> FragmentNodes<'a> {
        FragmentNodes {
            tree,
            next: self.first,
            last: self.last,
        }
    }

    /// Pre-order search across every top-level node and its descendants
    pub fn search(&self, tree: &Tree, pred: &Predicate) -> Vec<NodeId> {
        let mut matches = Vec::new();
        for node in self.nodes(tree) {
            matches.extend(tree.search(node, pred));
        }
        matches
    }

    fn is_root(&self, id: NodeId) -> bool {
        self.first == Some(id) || self.last == Some(id)
    }
}

pub struct FragmentNodes<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
    last: Option<NodeId>,
}

impl Iterator for FragmentNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = if Some(current) == self.last {
            None
        } else {
            self.tree.next_sibling(current)
        };
        Some(current)
    }
}

impl Tree {
    /// Chains parentless nodes into a fragment, in the given order.
    pub fn fragment_from_nodes(&mut self, ids: &[NodeId]) -> Fragment {
        for (i, &id) in ids.iter().enumerate() {
            self.detach(id);
            if i > 0 {
                self[id].prev_sibling = Some(ids[i - 1]);
                self[ids[i - 1]].next_sibling = Some(id);
            }
        }

        Fragment {
            first: ids.first().copied(),
            last: ids.last().copied(),
        }
    }

    fn is_linked(&self, doc: &Fragment, id: NodeId) -> bool {
        let node = &self[id];
        node.parent.is_some()
            || node.prev_sibling.is_some()
            || node.next_sibling.is_some()
            || doc.is_root(id)
    }

    /// Detaches `node`, moving the fragment boundary past it when it was a
    /// top-level node of `doc`. Removing an already detached node is a no-op.
    pub fn remove(&mut self, doc: &mut Fragment, node: NodeId) {
        if !self.is_linked(doc, node) {
            return;
        }

        let (prev, next) = (self[node].prev_sibling, self[node].next_sibling);
        if doc.first == Some(node) && doc.last == Some(node) {
            *doc = Fragment::empty();
        } else if doc.first == Some(node) {
            doc.first = next;
        } else if doc.last == Some(node) {
            doc.last = prev;
        }

        self.detach(node);
    }

    /// Puts every node of `replacement` where `node` was, leaving `node`
    /// detached. An empty replacement degenerates to [`Tree::remove`].
    pub fn replace_with_fragment(
        &mut self,
        doc: &mut Fragment,
        node: NodeId,
        replacement: Fragment,
    ) {
        let (Some(first), Some(last)) = (replacement.first, replacement.last) else {
            self.remove(doc, node);
            return;
        };
        if !self.is_linked(doc, node) {
            return;
        }

        let (parent, prev, next) = {
            let old = &self[node];
            (old.parent, old.prev_sibling, old.next_sibling)
        };

        let incoming: Vec<NodeId> = replacement.nodes(self).collect();
        for id in incoming {
            self[id].parent = parent;
        }

        self[first].prev_sibling = prev;
        self[last].next_sibling = next;
        if let Some(prev) = prev {
            self[prev].next_sibling = Some(first);
        }
        if let Some(next) = next {
            self[next].prev_sibling = Some(last);
        }

        if let Some(parent) = parent {
            if self[parent].first_child == Some(node) {
                self[parent].first_child = Some(first);
            }
            if self[parent].last_child == Some(node) {
                self[parent].last_child = Some(last);
            }
        }

        if doc.first == Some(node) {
            doc.first = Some(first);
        }
        if doc.last == Some(node) {
            doc.last = Some(last);
        }

        let old = &mut self[node];
        old.parent = None;
        old.prev_sibling = None;
        old.next_sibling = None;
    }
}
