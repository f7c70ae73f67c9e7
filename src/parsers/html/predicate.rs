//! 节点谓词与深度优先查找
//!
//! [`Predicate`] 是一组可组合的布尔条件（标签名、属性、属性值以及 and/or/not），
//! 用带标签的枚举表示，方便在日志中直接打印查询条件。

use std::fmt;
use std::ops::Not;

use super::dom::{NodeId, Tree};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    Tag(String),
    HasAttr(String),
    AttrValue(String, String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn tag(name: impl Into<String>) -> Self {
        Predicate::Tag(name.into())
    }

    pub fn has_attr(key: impl Into<String>) -> Self {
        Predicate::HasAttr(key.into())
    }

    pub fn attr_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::AttrValue(key.into(), value.into())
    }

    /// True when the node carries at least one of `keys`
    pub fn any_attr<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Or(keys.into_iter().map(Predicate::has_attr).collect())
    }

    /// True when `key` is present and equal to one of `values`
    pub fn attr_value_in<I, S>(key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Or(
            values
                .into_iter()
                .map(|value| Predicate::attr_value(key, value))
                .collect(),
        )
    }

    pub fn and(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(preds.into_iter().collect())
    }

    pub fn or(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(preds.into_iter().collect())
    }

    /// Evaluates the predicate against one node. Combinators short-circuit.
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        match self {
            Predicate::Tag(tag) => tree.get_node_name(id) == Some(tag.as_str()),
            Predicate::HasAttr(key) => tree.get_node_attr(id, key).is_some(),
            Predicate::AttrValue(key, value) => {
                tree.get_node_attr(id, key) == Some(value.as_str())
            }
            Predicate::And(preds) => preds.iter().all(|pred| pred.matches(tree, id)),
            Predicate::Or(preds) => preds.iter().any(|pred| pred.matches(tree, id)),
            Predicate::Not(pred) => !pred.matches(tree, id),
        }
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Selector-like rendering, used in log output
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Tag(tag) => write!(f, "{tag}"),
            Predicate::HasAttr(key) => write!(f, "[{key}]"),
            Predicate::AttrValue(key, value) => write!(f, "[{key}={value:?}]"),
            Predicate::And(preds) if preds.is_empty() => write!(f, "*"),
            Predicate::And(preds) => preds.iter().try_for_each(|pred| write!(f, "{pred}")),
            Predicate::Or(preds) => {
                write!(f, ":is(")?;
                for (i, pred) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{pred}")?;
                }
                write!(f, ")")
            }
            Predicate::Not(pred) => write!(f, ":not({pred})"),
        }
    }
}

/// Pre-order iterator over a node and all of its descendants.
///
/// Walks the sibling/parent links directly, so it needs no stack and never
/// leaves the subtree rooted at `root`.
pub struct Descendants<'a> {
    tree: &'a Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling(node) {
                        break Some(sibling);
                    }
                    match self.tree.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };

        Some(current)
    }
}

impl Tree {
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root,
            next: Some(root),
        }
    }

    /// Every node under `root` (inclusive) matching `pred`, in pre-order
    pub fn search(&self, root: NodeId, pred: &Predicate) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| pred.matches(self, id))
            .collect()
    }

    /// Nearest strict ancestor of `id` matching `pred`
    pub fn closest(&self, id: NodeId, pred: &Predicate) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if pred.matches(self, parent) {
                return Some(parent);
            }
            current = self.parent(parent);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId) {
        // <div id="root"><p class="a"><span></span></p><p></p></div>
        let mut tree = Tree::new();
        let root = tree.create_element("div", &[("id", "root")]);
        let p1 = tree.create_element("p", &[("class", "a")]);
        let span = tree.create_element("span", &[]);
        let p2 = tree.create_element("p", &[]);
        tree.append_child(root, p1);
        tree.append_child(p1, span);
        tree.append_child(root, p2);
        (tree, root)
    }

    #[test]
    fn search_is_pre_order() {
        let (tree, root) = sample();
        let names: Vec<&str> = tree
            .descendants(root)
            .filter_map(|id| tree.get_node_name(id))
            .collect();
        assert_eq!(names, vec!["div", "p", "span", "p"]);

        let paragraphs = tree.search(root, &Predicate::tag("p"));
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(tree.get_node_attr(paragraphs[0], "class"), Some("a"));
    }

    #[test]
    fn search_stays_inside_subtree() {
        let (tree, root) = sample();
        let p1 = tree.first_child(root).unwrap();
        let found = tree.search(p1, &Predicate::tag("p"));
        assert_eq!(found, vec![p1]);
    }

    #[test]
    fn empty_combinators() {
        let (tree, root) = sample();
        assert!(Predicate::And(vec![]).matches(&tree, root));
        assert!(!Predicate::Or(vec![]).matches(&tree, root));
    }

    #[test]
    fn attribute_predicates() {
        let (tree, root) = sample();
        assert!(Predicate::has_attr("id").matches(&tree, root));
        assert!(Predicate::attr_value("id", "root").matches(&tree, root));
        assert!(!Predicate::attr_value("id", "other").matches(&tree, root));
        assert!(Predicate::any_attr(["href", "id"]).matches(&tree, root));
        assert!(!Predicate::any_attr(["href", "src"]).matches(&tree, root));
        assert!((!Predicate::has_attr("href")).matches(&tree, root));
        assert!(Predicate::attr_value_in("id", ["x", "root"]).matches(&tree, root));
    }

    #[test]
    fn closest_skips_the_node_itself() {
        let (tree, root) = sample();
        let p1 = tree.first_child(root).unwrap();
        let span = tree.first_child(p1).unwrap();

        assert_eq!(tree.closest(span, &Predicate::tag("p")), Some(p1));
        assert_eq!(tree.closest(span, &Predicate::tag("div")), Some(root));
        assert_eq!(tree.closest(p1, &Predicate::tag("p")), None);
        assert_eq!(tree.closest(root, &Predicate::tag("div")), None);
    }

    #[test]
    fn display_reads_like_a_selector() {
        let pred = Predicate::and([
            Predicate::tag("script"),
            Predicate::has_attr("src"),
            !Predicate::has_attr("type"),
        ]);
        assert_eq!(pred.to_string(), "script[src]:not([type])");
    }
}
