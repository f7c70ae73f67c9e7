use std::io;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::importer::Importer;
use crate::inliner::{inline_scripts, separate_scripts};
use crate::parsers::html::{serialize_fragment, Fragment, ParseContext, Tree};
use crate::postprocess::{
    deduplicate_imports, remove_comments_and_whitespace, use_named_polymer_invocations,
};
use crate::utils::fs::write_file;
use crate::utils::path::ABSOLUTE_URL_PATTERN;

/// Represents errors that can occur while vulcanizing a document
///
/// Configuration errors are raised before any file is read; everything else
/// aborts the run at the first failure, and no output is written.
#[derive(Debug, Error)]
pub enum VulcanizeError {
    #[error("No input file given!")]
    NoInput,

    #[error("Config file not found: {}", .path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config JSON: {0}")]
    MalformedConfig(#[from] serde_json::Error),

    #[error("Malformed {kind} exclude pattern {pattern:?}: {source}")]
    MalformedPattern {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] io::Error),

    #[error("Document has no <body> to hold the separated scripts")]
    MissingBody,

    #[error("Imports nested deeper than {limit} levels at {}", .path.display())]
    ImportTooDeep { path: PathBuf, limit: usize },
}

pub type VulcanizeResult<T> = Result<T, VulcanizeError>;

/// Compiled exclusion patterns, one list per kind of reference
///
/// Each list starts with the absolute-URL pattern, so nothing outside the
/// local file system is ever fetched.
#[derive(Clone, Debug)]
pub struct Excludes {
    pub imports: Vec<Regex>,
    pub scripts: Vec<Regex>,
    pub styles: Vec<Regex>,
}

/// The absolute-URL pattern every exclusion list starts with
pub fn absolute_url_exclude() -> Regex {
    Regex::new(ABSOLUTE_URL_PATTERN).expect("constant pattern")
}

impl Default for Excludes {
    fn default() -> Self {
        Self {
            imports: vec![absolute_url_exclude()],
            scripts: vec![absolute_url_exclude()],
            styles: vec![absolute_url_exclude()],
        }
    }
}

/// Configuration options for one vulcanize run
///
/// Built once by [`crate::config::build_options`] and never modified
/// afterwards.
#[derive(Clone, Debug)]
pub struct VulcanizeOptions {
    /// Entry document
    pub input: PathBuf,
    /// Flattened HTML destination
    pub output: PathBuf,
    /// Directory every rewritten path is relative to
    pub output_dir: PathBuf,
    pub excludes: Excludes,
    /// Move inline scripts into [`VulcanizeOptions::csp_file`]
    pub csp: bool,
    pub csp_file: PathBuf,
    /// Replace external scripts with their contents
    pub inline: bool,
    /// Drop comments and whitespace-only text
    pub strip: bool,
    pub verbose: bool,
}

/// Serialized results of one run, not yet written anywhere
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VulcanizeOutput {
    pub html: String,
    /// Separated script contents; present in CSP mode only
    pub script: Option<String>,
}

/// Flattens the entry document and runs every whole-document pass
///
/// # Arguments
///
/// * `options` - The options describing input, output and enabled modes
///
/// # Returns
///
/// The serialized document, plus the separated scripts in CSP mode. Nothing
/// is written to disk; see [`write_output`].
pub fn create_vulcanized_document(options: &VulcanizeOptions) -> VulcanizeResult<VulcanizeOutput> {
    DocumentProcessor::new(options).process_document()
}

/// Writes the HTML to `options.output` and, in CSP mode, the separated
/// scripts to `options.csp_file`
pub fn write_output(options: &VulcanizeOptions, output: &VulcanizeOutput) -> VulcanizeResult<()> {
    write_file(&options.output, output.html.as_bytes())?;
    debug!("wrote {}", options.output.display());

    if let Some(script) = &output.script {
        write_file(&options.csp_file, script.as_bytes())?;
        debug!("wrote {}", options.csp_file.display());
    }

    Ok(())
}

/// 文档处理器，负责协调整个文档处理流程
pub struct DocumentProcessor<'a> {
    options: &'a VulcanizeOptions,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(options: &'a VulcanizeOptions) -> Self {
        Self { options }
    }

    /// 展开文档并依次执行各个处理步骤
    pub fn process_document(&self) -> VulcanizeResult<VulcanizeOutput> {
        let options = self.options;
        let mut tree = Tree::new();

        // 1. 递归展开所有 import（入口文件按完整文档解析，保留 <body>）
        let importer = Importer::new(
            &options.excludes.imports,
            &options.excludes.styles,
            &options.output_dir,
        )?;
        let mut doc = importer.flatten_with(&mut tree, &options.input, ParseContext::Document)?;

        // 2. 内联外部脚本
        if options.inline {
            inline_scripts(
                &mut tree,
                &mut doc,
                importer.output_dir(),
                &options.excludes.scripts,
            )?;
        }

        // 3. 为 Polymer() 调用补上元素名
        use_named_polymer_invocations(&mut tree, &doc, options.verbose);

        // 4. CSP 模式下外提内联脚本
        let script = if options.csp {
            Some(separate_scripts(
                &mut tree,
                &mut doc,
                &options.csp_file,
                options.verbose,
            )?)
        } else {
            None
        };

        // 5. 清理
        deduplicate_imports(&mut tree, &mut doc);
        if options.strip {
            remove_comments_and_whitespace(&mut tree, &mut doc);
        }

        // 6. 序列化
        let html = OutputFormatter::new(&tree).format_output(&doc)?;

        Ok(VulcanizeOutput { html, script })
    }
}

/// 输出格式化器
pub struct OutputFormatter<'a> {
    tree: &'a Tree,
}

impl<'a> OutputFormatter<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    pub fn format_output(&self, doc: &Fragment) -> VulcanizeResult<String> {
        let mut result = serialize_fragment(self.tree, doc).map_err(VulcanizeError::Serialize)?;
        self.ensure_trailing_newline(&mut result);
        Ok(result)
    }

    fn ensure_trailing_newline(&self, result: &mut String) {
        if !result.ends_with('\n') {
            result.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_skip_absolute_urls() {
        let excludes = Excludes::default();
        for list in [&excludes.imports, &excludes.scripts, &excludes.styles] {
            assert_eq!(list.len(), 1);
            assert!(list[0].is_match("https://example.com/a.html"));
            assert!(list[0].is_match("/root.html"));
            assert!(!list[0].is_match("a.html"));
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(VulcanizeError::NoInput.to_string(), "No input file given!");
        assert_eq!(
            VulcanizeError::ImportTooDeep {
                path: PathBuf::from("/a.html"),
                limit: 3
            }
            .to_string(),
            "Imports nested deeper than 3 levels at /a.html"
        );
    }

    #[test]
    fn output_ends_with_newline() {
        let tree = Tree::new();
        let html = OutputFormatter::new(&tree)
            .format_output(&Fragment::empty())
            .unwrap();
        assert_eq!(html, "\n");
    }

    #[test]
    fn serialize_error_names_no_file() {
        let error = VulcanizeError::Serialize(io::Error::new(io::ErrorKind::Other, "broken sink"));
        assert_eq!(
            error.to_string(),
            "Failed to serialize document: broken sink"
        );
        assert!(!matches!(error, VulcanizeError::Write { .. }));
    }
}
