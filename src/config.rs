//! 配置解析
//!
//! 命令行参数和 JSON 配置文件在这里合并为不可变的 [`VulcanizeOptions`]。
//! 所有配置错误都在读取任何 HTML 之前报告。
//!
//! 配置文件格式：
//!
//! ```json
//! {
//!   "excludes": {
//!     "imports": ["^vendor/"],
//!     "scripts": ["analytics\\.js$"],
//!     "styles": []
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::core::{absolute_url_exclude, Excludes, VulcanizeError, VulcanizeOptions, VulcanizeResult};

/// Output file name used when none is given, placed next to the input
pub const DEFAULT_FILENAME: &str = "vulcanized.html";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub excludes: ConfigExcludes,
}

/// Uncompiled exclusion patterns, in the order they appear in the file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigExcludes {
    pub imports: Vec<String>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

impl Config {
    pub fn from_file(path: &Path) -> VulcanizeResult<Self> {
        let data = fs::read_to_string(path).map_err(|source| VulcanizeError::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> VulcanizeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compiles `patterns` behind the absolute-URL pattern
pub fn compile_patterns(kind: &'static str, patterns: &[String]) -> VulcanizeResult<Vec<Regex>> {
    let mut compiled = Vec::with_capacity(patterns.len() + 1);
    compiled.push(absolute_url_exclude());

    for pattern in patterns {
        let regex = Regex::new(pattern).map_err(|source| VulcanizeError::MalformedPattern {
            kind,
            pattern: pattern.clone(),
            source,
        })?;
        compiled.push(regex);
    }

    Ok(compiled)
}

impl Excludes {
    pub fn from_config(config: &ConfigExcludes) -> VulcanizeResult<Self> {
        Ok(Self {
            imports: compile_patterns("import", &config.imports)?,
            scripts: compile_patterns("script", &config.scripts)?,
            styles: compile_patterns("style", &config.styles)?,
        })
    }
}

/// Boolean switches taken from the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub csp: bool,
    pub inline: bool,
    pub strip: bool,
    pub verbose: bool,
}

/// `<input dir>/vulcanized.html`
pub fn default_output(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_FILENAME)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Builds the options for one run.
///
/// The config file is read and parsed first, then the input is checked, then
/// the exclusion patterns are compiled; the first problem found is returned.
pub fn build_options(
    input: Option<&Path>,
    output: Option<&Path>,
    config_file: Option<&Path>,
    flags: ModeFlags,
) -> VulcanizeResult<VulcanizeOptions> {
    let config = match config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let input = match input {
        Some(input) if !input.as_os_str().is_empty() => input.to_path_buf(),
        _ => return Err(VulcanizeError::NoInput),
    };

    let excludes = Excludes::from_config(&config.excludes)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&input));
    let output_dir = parent_dir(&output);
    let csp_file = output.with_extension("js");

    Ok(VulcanizeOptions {
        input,
        output,
        output_dir,
        excludes,
        csp: flags.csp,
        csp_file,
        inline: flags.inline,
        strip: flags.strip,
        verbose: flags.verbose,
    })
}
