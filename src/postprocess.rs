//! 展开完成后作用于整个文档的处理步骤

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::parsers::html::utils::{
    is_import, is_inline_script, is_polymer_element, WHITESPACES, WHITESPACE_SENSITIVE,
};
use crate::parsers::html::{Fragment, NodeData, NodeId, Predicate, Tree};

fn polymer_invocation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Polymer\(([^,{]+)?(?:,\s*)?(\{|\))").expect("constant pattern")
    })
}

/// Gives anonymous `Polymer(...)` calls inside a `<polymer-element>` the
/// element's name.
///
/// Only the first invocation of each inline script is considered, and only
/// when it carries no name yet: `Polymer({` becomes `Polymer('x-foo',{` and
/// `Polymer()` becomes `Polymer('x-foo')`.
pub fn use_named_polymer_invocations(tree: &mut Tree, doc: &Fragment, verbose: bool) {
    for script in doc.search(tree, &is_inline_script()) {
        let Some(element) = tree.closest(script, &is_polymer_element()) else {
            continue;
        };
        let Some(name) = tree.get_node_attr(element, "name").map(str::to_string) else {
            continue;
        };

        let content = tree.get_text_content(script);
        let Some(caps) = polymer_invocation_regex().captures(&content) else {
            continue;
        };
        if caps
            .get(1)
            .is_some_and(|existing| !existing.as_str().trim().is_empty())
        {
            continue;
        }

        let invocation = if &caps[2] == "{" {
            format!("Polymer('{name}',{{")
        } else {
            format!("Polymer('{name}')")
        };
        if verbose {
            info!("{} -> {}", &caps[0], invocation);
        }

        let found = caps.get(0).map_or(0..0, |m| m.range());
        let rewritten = format!(
            "{}{}{}",
            &content[..found.start],
            invocation,
            &content[found.end..]
        );
        tree.set_text_content(script, &rewritten);
    }
}

/// Removes every import link whose `href` repeats an earlier one
pub fn deduplicate_imports(tree: &mut Tree, doc: &mut Fragment) {
    let mut seen = HashSet::new();
    for link in doc.search(tree, &is_import()) {
        let Some(href) = tree.get_node_attr(link, "href").map(str::to_string) else {
            continue;
        };
        if !seen.insert(href) {
            debug!("removing repeated import link");
            tree.remove(doc, link);
        }
    }
}

/// Removes comments and whitespace-only text, except where whitespace is
/// significant
pub fn remove_comments_and_whitespace(tree: &mut Tree, doc: &mut Fragment) {
    let sensitive = Predicate::or(WHITESPACE_SENSITIVE.iter().map(|tag| Predicate::tag(*tag)));

    let nodes: Vec<NodeId> = doc
        .nodes(tree)
        .flat_map(|root| tree.descendants(root))
        .collect();

    for node in nodes {
        let removable = match &tree[node].data {
            NodeData::Comment { .. } => true,
            NodeData::Text { contents } => {
                contents.trim_matches(WHITESPACES).is_empty()
                    && tree.closest(node, &sensitive).is_none()
            }
            _ => false,
        };
        if removable {
            tree.remove(doc, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::parser::{parse_html, ParseContext};
    use crate::parsers::html::serializer::serialize_fragment;

    fn apply(html: &str, pass: impl FnOnce(&mut Tree, &mut Fragment)) -> String {
        let mut tree = Tree::new();
        let mut doc = parse_html(&mut tree, html, ParseContext::Body).unwrap();
        pass(&mut tree, &mut doc);
        serialize_fragment(&tree, &doc).unwrap()
    }

    fn name_invocations(html: &str) -> String {
        apply(html, |tree, doc| use_named_polymer_invocations(tree, doc, false))
    }

    #[test]
    fn names_anonymous_invocations() {
        assert_eq!(
            name_invocations(
                r#"<polymer-element name="x-a"><script>Polymer({ ready: 1 });</script></polymer-element>"#
            ),
            r#"<polymer-element name="x-a"><script>Polymer('x-a',{ ready: 1 });</script></polymer-element>"#
        );
        assert_eq!(
            name_invocations(
                r#"<polymer-element name="x-b"><script>Polymer();</script></polymer-element>"#
            ),
            r#"<polymer-element name="x-b"><script>Polymer('x-b');</script></polymer-element>"#
        );
        assert_eq!(
            name_invocations(
                r#"<polymer-element name="x-c"><script>Polymer(  {a: 1});</script></polymer-element>"#
            ),
            r#"<polymer-element name="x-c"><script>Polymer('x-c',{a: 1});</script></polymer-element>"#
        );
    }

    #[test]
    fn named_and_unrelated_scripts_are_untouched() {
        let named = r#"<polymer-element name="x-a"><script>Polymer('x-a', {});</script></polymer-element>"#;
        assert_eq!(name_invocations(named), named);

        let outside = "<script>Polymer({});</script>";
        assert_eq!(name_invocations(outside), outside);

        let external = r#"<polymer-element name="x-a"><script src="a.js"></script></polymer-element>"#;
        assert_eq!(name_invocations(external), external);
    }

    #[test]
    fn only_first_invocation_is_named() {
        assert_eq!(
            name_invocations(
                r#"<polymer-element name="x-a"><script>Polymer({}); Polymer({});</script></polymer-element>"#
            ),
            r#"<polymer-element name="x-a"><script>Polymer('x-a',{}); Polymer({});</script></polymer-element>"#
        );
    }

    #[test]
    fn repeated_import_links_are_removed() {
        assert_eq!(
            apply(
                r#"<link rel="import" href="http://x/a.html"><div><link rel="import" href="http://x/a.html"></div><link rel="import" href="http://x/b.html">"#,
                deduplicate_imports
            ),
            r#"<link rel="import" href="http://x/a.html"><div></div><link rel="import" href="http://x/b.html">"#
        );
    }

    #[test]
    fn strips_comments_and_blank_text() {
        assert_eq!(
            apply(
                "<!-- c -->\n<div>\n  <p> hi </p>\n  <!-- d -->\n</div>\n<pre>  keep\n</pre><textarea>  </textarea>",
                remove_comments_and_whitespace
            ),
            "<div><p> hi </p></div><pre>  keep\n</pre><textarea>  </textarea>"
        );
    }
}
