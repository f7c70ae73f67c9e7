//! 内联与外提
//!
//! 两个方向互为逆操作：
//!
//! - 内联：把 `<script src>` 和 `<link rel="stylesheet">` 替换成携带文件内容的
//!   `<script>` / `<style>` 节点
//! - 外提（CSP 模式）：把所有内联 JavaScript 合并为一个外部文件，文档里只留下
//!   一个引用它的 `<script src>`

use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::core::{VulcanizeError, VulcanizeResult};
use crate::parsers::css::rewrite_css_urls;
use crate::parsers::html::utils::{is_external_script, is_inline_script, is_stylesheet};
use crate::parsers::html::{Fragment, Predicate, Tree};
use crate::utils::fs::read_text;
use crate::utils::path::join_path;

/// Separator placed between extracted scripts
const SCRIPT_SEPARATOR: &str = ";\n";

pub fn is_excluded(path: &str, excludes: &[Regex]) -> bool {
    excludes.iter().any(|pattern| pattern.is_match(path))
}

/// Replaces external JavaScript references with inline copies of the files
/// they point at. `src` values are resolved against `output_dir`.
pub fn inline_scripts(
    tree: &mut Tree,
    doc: &mut Fragment,
    output_dir: &Path,
    excludes: &[Regex],
) -> VulcanizeResult<()> {
    for script in doc.search(tree, &is_external_script()) {
        let Some(src) = tree.get_node_attr(script, "src").map(str::to_string) else {
            continue;
        };
        if is_excluded(&src, excludes) {
            debug!("script {src} excluded from inlining");
            continue;
        }

        let filename = join_path(output_dir, &src);
        let content = read_text(&filename)?;
        let inlined = tree.create_script(&content);
        tree.replace_with_fragment(doc, script, Fragment::single(inlined));
        debug!("inlined script {}", filename.display());
    }

    Ok(())
}

/// Replaces stylesheet links with `<style>` blocks. The fetched CSS has its
/// `url()` references moved from the sheet's own directory to `output_dir`,
/// and every link attribute other than `rel` and `href` is carried over.
pub fn inline_sheets(
    tree: &mut Tree,
    doc: &mut Fragment,
    output_dir: &Path,
    excludes: &[Regex],
) -> VulcanizeResult<()> {
    for sheet in doc.search(tree, &is_stylesheet()) {
        let Some(href) = tree.get_node_attr(sheet, "href").map(str::to_string) else {
            continue;
        };
        if is_excluded(&href, excludes) {
            debug!("stylesheet {href} excluded from inlining");
            continue;
        }

        let filename = join_path(output_dir, &href);
        let sheet_dir = filename.parent().unwrap_or(output_dir);
        let content = rewrite_css_urls(sheet_dir, output_dir, &read_text(&filename)?);

        let attrs: Vec<(String, String)> = tree
            .get_node_attrs(sheet)
            .into_iter()
            .filter(|(key, _)| *key != "rel" && *key != "href")
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let attrs: Vec<(&str, &str)> = attrs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        let inlined = tree.create_style(&content, &attrs);
        tree.replace_with_fragment(doc, sheet, Fragment::single(inlined));
        debug!("inlined stylesheet {}", filename.display());
    }

    Ok(())
}

/// Moves every inline JavaScript block out of the document.
///
/// The scripts are removed in document order and their contents returned
/// joined by `;\n`; a single `<script src>` naming `filename`'s base name is
/// appended to `<body>`. Fails with [`VulcanizeError::MissingBody`] before
/// touching the tree when the document has no `<body>`.
pub fn separate_scripts(
    tree: &mut Tree,
    doc: &mut Fragment,
    filename: &Path,
    verbose: bool,
) -> VulcanizeResult<String> {
    if verbose {
        info!("Separating scripts into separate file");
    }

    let body = doc
        .search(tree, &Predicate::tag("body"))
        .first()
        .copied()
        .ok_or(VulcanizeError::MissingBody)?;

    let scripts = doc.search(tree, &is_inline_script());
    let mut contents = Vec::with_capacity(scripts.len());
    for script in scripts {
        contents.push(tree.get_text_content(script));
        tree.remove(doc, script);
    }

    let basename = filename
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let external = tree.create_external_script(&basename);
    tree.append_child(body, external);

    Ok(contents.join(SCRIPT_SEPARATOR))
}
