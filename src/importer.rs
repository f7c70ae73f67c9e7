//! HTML import 递归展开
//!
//! 每个文件的处理流程：读取并解析 -> 改写路径 -> 内联样式表 -> 记为已读 ->
//! 逐个处理 `<link rel="import">`。被排除的 import 原样保留；已经读过的文件只
//! 删除对应的 link 节点；其余的递归展开后替换 link 节点。
//!
//! 文件在展开自己的 import 之前就被记为已读，所以循环 import 和自我 import
//! 都会退化为"重复 import"，递归一定会终止。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::core::{VulcanizeError, VulcanizeResult};
use crate::inliner::{inline_sheets, is_excluded};
use crate::parsers::html::utils::is_import;
use crate::parsers::html::{html_to_fragment, Fragment, ParseContext, Tree};
use crate::resolver::resolve_paths;
use crate::utils::fs::read_file;
use crate::utils::path::{join_path, normalize_path};

/// Deepest chain of nested imports followed before giving up
pub const MAX_IMPORT_DEPTH: usize = 256;

/// Files already flattened during one top-level call. Only ever grows.
#[derive(Debug, Default)]
struct ImportRecord {
    read: HashSet<PathBuf>,
}

impl ImportRecord {
    fn contains(&self, path: &Path) -> bool {
        self.read.contains(path)
    }

    fn insert(&mut self, path: &Path) {
        self.read.insert(path.to_path_buf());
    }

    fn len(&self) -> usize {
        self.read.len()
    }
}

/// Absolute, lexically normalized form of `path`, used as the dedup key
fn canonical_path(path: &Path) -> VulcanizeResult<PathBuf> {
    std::path::absolute(path)
        .map(|absolute| normalize_path(&absolute))
        .map_err(|source| VulcanizeError::Read {
            path: path.to_path_buf(),
            source,
        })
}

pub struct Importer<'a> {
    import_excludes: &'a [Regex],
    style_excludes: &'a [Regex],
    output_dir: PathBuf,
}

impl<'a> Importer<'a> {
    pub fn new(
        import_excludes: &'a [Regex],
        style_excludes: &'a [Regex],
        output_dir: &Path,
    ) -> VulcanizeResult<Self> {
        Ok(Self {
            import_excludes,
            style_excludes,
            output_dir: canonical_path(output_dir)?,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Flattens the file at `path` and everything it imports, parsing the
    /// file itself as body content
    pub fn flatten(&self, tree: &mut Tree, path: &Path) -> VulcanizeResult<Fragment> {
        self.flatten_with(tree, path, ParseContext::Body)
    }

    /// Like [`Importer::flatten`], parsing the top-level file in `context`.
    /// Imported files are always parsed as body content.
    pub fn flatten_with(
        &self,
        tree: &mut Tree,
        path: &Path,
        context: ParseContext,
    ) -> VulcanizeResult<Fragment> {
        let mut record = ImportRecord::default();
        let path = canonical_path(path)?;

        let doc = self.flatten_file(tree, &mut record, &path, context, 0)?;
        debug!("flattened {} file(s) into {}", record.len(), path.display());
        Ok(doc)
    }

    fn flatten_file(
        &self,
        tree: &mut Tree,
        record: &mut ImportRecord,
        path: &Path,
        context: ParseContext,
        depth: usize,
    ) -> VulcanizeResult<Fragment> {
        if depth > MAX_IMPORT_DEPTH {
            return Err(VulcanizeError::ImportTooDeep {
                path: path.to_path_buf(),
                limit: MAX_IMPORT_DEPTH,
            });
        }

        let mut doc = self.load(tree, record, path, context)?;
        self.process_imports(tree, record, &mut doc, depth)?;
        Ok(doc)
    }

    /// Parses `path`, moves its references to the output directory and
    /// inlines its stylesheets. The file is recorded only once all of that
    /// succeeded.
    fn load(
        &self,
        tree: &mut Tree,
        record: &mut ImportRecord,
        path: &Path,
        context: ParseContext,
    ) -> VulcanizeResult<Fragment> {
        debug!("loading {}", path.display());

        let data = read_file(path)?;
        let mut doc = html_to_fragment(tree, &data, "utf-8", context).map_err(|source| {
            VulcanizeError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let input_dir = path.parent().unwrap_or(&self.output_dir);
        resolve_paths(tree, &doc, input_dir, &self.output_dir);
        inline_sheets(tree, &mut doc, &self.output_dir, self.style_excludes)?;

        record.insert(path);
        Ok(doc)
    }

    fn process_imports(
        &self,
        tree: &mut Tree,
        record: &mut ImportRecord,
        doc: &mut Fragment,
        depth: usize,
    ) -> VulcanizeResult<()> {
        for link in doc.search(tree, &is_import()) {
            let Some(href) = tree.get_node_attr(link, "href").map(str::to_string) else {
                continue;
            };
            if is_excluded(&href, self.import_excludes) {
                debug!("import {href} excluded");
                continue;
            }

            // hrefs were already rewritten relative to the output directory
            let import_file = join_path(&self.output_dir, &href);
            if record.contains(&import_file) {
                debug!("dropping duplicate import {}", import_file.display());
                tree.remove(doc, link);
            } else {
                let content =
                    self.flatten_file(tree, record, &import_file, ParseContext::Body, depth + 1)?;
                tree.replace_with_fragment(doc, link, content);
            }
        }

        Ok(())
    }
}
