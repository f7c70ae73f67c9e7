//! 路径解析器
//!
//! 被导入的文档最终会出现在输出目录下的同一个文件里，因此其中所有相对引用都要
//! 从"相对于源目录"改写为"相对于输出目录"。三个步骤彼此独立，按固定顺序执行：
//!
//! 1. 属性中的路径（`href`、`src`、`action`，以及 `style` 中的 `url()`）
//! 2. `<style>` 块中的 `url()`
//! 3. 为缺少 `assetpath` 的 `<polymer-element>` 补上该属性

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::parsers::css::rewrite_css_urls;
use crate::parsers::html::fragment::Fragment;
use crate::parsers::html::predicate::Predicate;
use crate::parsers::html::utils::{is_polymer_element_missing_assetpath, is_style_block, URL_ATTRS};
use crate::parsers::html::Tree;
use crate::utils::path::{asset_path, rewrite_relative_path};

fn template_expression_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{.*\}\}").expect("constant pattern"))
}

/// Attribute values containing a `{{...}}` binding are left for the template
/// engine
pub fn is_template_expression(value: &str) -> bool {
    template_expression_regex().is_match(value)
}

/// Rewrites every relative reference in `doc` from `input_dir` to `output_dir`
pub fn resolve_paths(tree: &mut Tree, doc: &Fragment, input_dir: &Path, output_dir: &Path) {
    debug!(
        "resolving paths from {} to {}",
        input_dir.display(),
        output_dir.display()
    );
    resolve_attribute_paths(tree, doc, input_dir, output_dir);
    resolve_css_paths(tree, doc, input_dir, output_dir);
    add_assetpath_attribute(tree, doc, input_dir, output_dir);
}

pub fn resolve_attribute_paths(
    tree: &mut Tree,
    doc: &Fragment,
    input_dir: &Path,
    output_dir: &Path,
) {
    let matches = doc.search(tree, &Predicate::any_attr(URL_ATTRS.iter().copied()));

    for node in matches {
        for &attr in URL_ATTRS {
            let Some(value) = tree.get_node_attr(node, attr) else {
                continue;
            };
            if is_template_expression(value) {
                continue;
            }

            let rewritten = if attr == "style" {
                rewrite_css_urls(input_dir, output_dir, value)
            } else {
                rewrite_relative_path(input_dir, output_dir, value)
            };
            tree.set_node_attr(node, attr, Some(&rewritten));
        }
    }
}

pub fn resolve_css_paths(tree: &mut Tree, doc: &Fragment, input_dir: &Path, output_dir: &Path) {
    for style in doc.search(tree, &is_style_block()) {
        let css = rewrite_css_urls(input_dir, output_dir, &tree.get_text_content(style));
        tree.set_text_content(style, &css);
    }
}

pub fn add_assetpath_attribute(
    tree: &mut Tree,
    doc: &Fragment,
    input_dir: &Path,
    output_dir: &Path,
) {
    let assetpath = asset_path(input_dir, output_dir);
    for element in doc.search(tree, &is_polymer_element_missing_assetpath()) {
        tree.set_node_attr(element, "assetpath", Some(&assetpath));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::parser::{parse_html, ParseContext};
    use crate::parsers::html::serializer::serialize_node;

    type Pass = fn(&mut Tree, &Fragment, &Path, &Path);

    fn run(pass: Pass, html: &str, input_dir: &str, output_dir: &str) -> String {
        let mut tree = Tree::new();
        let doc = parse_html(&mut tree, html, ParseContext::Body).unwrap();
        pass(&mut tree, &doc, Path::new(input_dir), Path::new(output_dir));

        let target = doc.search(&tree, &Predicate::attr_value("id", "target"))[0];
        serialize_node(&tree, target).unwrap()
    }

    #[test]
    fn attribute_paths() {
        assert_eq!(
            run(
                resolve_attribute_paths,
                r#"<a id="target" href="qux/page.html"></a>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<a id="target" href="../bar/qux/page.html"></a>"#
        );
        assert_eq!(
            run(
                resolve_attribute_paths,
                r#"<form id="target" action="qux/page.html"></form>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<form id="target" action="../bar/qux/page.html"></form>"#
        );
        assert_eq!(
            run(
                resolve_attribute_paths,
                r#"<a id="target" style="background-image: url('qux/page.html');"></a>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<a id="target" style="background-image: url(../bar/qux/page.html);"></a>"#
        );
    }

    #[test]
    fn template_expressions_are_untouched() {
        assert_eq!(
            run(
                resolve_attribute_paths,
                r#"<img id="target" src="{{ avatar }}">"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<img id="target" src="{{ avatar }}">"#
        );
        assert_eq!(
            run(
                resolve_attribute_paths,
                r#"<a id="target" href="http://example.com/x.html"></a>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<a id="target" href="http://example.com/x.html"></a>"#
        );
    }

    #[test]
    fn css_blocks() {
        assert_eq!(
            run(
                resolve_css_paths,
                "<style id=\"target\">body {background-image: url('qux/page.html');}</style>",
                "/foo/bar",
                "/foo/baz"
            ),
            "<style id=\"target\">body {background-image: url(../bar/qux/page.html);}</style>"
        );
        assert_eq!(
            run(
                resolve_css_paths,
                "<style id=\"target\" type=\"text/less\">a {b: url(c.png)}</style>",
                "/foo/bar",
                "/foo/baz"
            ),
            "<style id=\"target\" type=\"text/less\">a {b: url(c.png)}</style>"
        );
    }

    #[test]
    fn assetpath_injection() {
        assert_eq!(
            run(
                add_assetpath_attribute,
                r#"<polymer-element id="target"></polymer-element>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<polymer-element id="target" assetpath="../bar/"></polymer-element>"#
        );
        assert_eq!(
            run(
                add_assetpath_attribute,
                r#"<polymer-element id="target" assetpath="x/"></polymer-element>"#,
                "/foo/bar",
                "/foo/baz"
            ),
            r#"<polymer-element id="target" assetpath="x/"></polymer-element>"#
        );
    }

    #[test]
    fn same_directory_is_a_no_op() {
        let html = r#"<div id="target"><a href="qux/page.html"></a><style>a{b:url(c.png)}</style></div>"#;
        assert_eq!(run(resolve_paths, html, "/foo", "/foo"), html);
    }

    #[test]
    fn nodes_inside_templates_are_rewritten() {
        assert_eq!(
            run(
                resolve_paths,
                r#"<template id="target"><img src="a.png"></template>"#,
                "/foo/bar",
                "/foo"
            ),
            r#"<template id="target"><img src="bar/a.png"></template>"#
        );
    }
}
