//! 路径工具
//!
//! 所有路径运算都是纯词法的：不访问文件系统，也不解析符号链接。
//! 输出中的路径一律使用 `/` 作为分隔符。

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// References that never point at a file next to the document
pub const ABSOLUTE_URL_PATTERN: &str = r"^(data:|https?:|/)";

fn absolute_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ABSOLUTE_URL_PATTERN).expect("constant pattern"))
}

pub fn is_absolute_url(url: &str) -> bool {
    absolute_url_regex().is_match(url)
}

/// Removes `.` segments and folds `..` into the preceding segment where one
/// exists. Leading `..` of a relative path are kept; `..` above the root is
/// dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                match last {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                        normalized.push("..")
                    }
                }
            }
            Component::Normal(name) => normalized.push(name),
        }
    }

    normalized
}

pub fn join_path(base: &Path, relative: &str) -> PathBuf {
    normalize_path(&base.join(relative))
}

/// Expresses `target` relative to the directory `base`.
///
/// Returns an empty path when both are the same location, and `None` when no
/// lexical answer exists (one side absolute and the other not, or `base`
/// climbing out through `..` further than `target` shares).
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = normalize_path(base);
    let target = normalize_path(target);

    if base.has_root() != target.has_root() {
        return None;
    }

    let base_components: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    let common = base_components
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for component in &base_components[common..] {
        match component {
            Component::Normal(_) => relative.push(".."),
            _ => return None,
        }
    }
    for component in &target_components[common..] {
        relative.push(component);
    }

    Some(relative)
}

/// `/`-separated rendering of a relative path, suitable for an attribute value
pub fn path_to_url(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Re-expresses `relative`, written relative to `input_dir`, as a path
/// relative to `output_dir`. Absolute URLs come back unchanged, as do empty
/// and fragment-only references.
pub fn rewrite_relative_path(input_dir: &Path, output_dir: &Path, relative: &str) -> String {
    if relative.is_empty() || relative.starts_with('#') || is_absolute_url(relative) {
        return relative.to_string();
    }

    let absolute = join_path(input_dir, relative);
    match relative_path(output_dir, &absolute) {
        Some(path) if path.as_os_str().is_empty() => ".".to_string(),
        Some(path) => path_to_url(&path),
        None => relative.to_string(),
    }
}

/// Value for the `assetpath` attribute: `input_dir` relative to `output_dir`
/// with a trailing `/`, or empty when the two coincide
pub fn asset_path(input_dir: &Path, output_dir: &Path) -> String {
    match relative_path(output_dir, input_dir) {
        Some(path) if path.as_os_str().is_empty() => String::new(),
        Some(path) => format!("{}/", path_to_url(&path)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls() {
        assert!(is_absolute_url("data:text/plain,hi"));
        assert!(is_absolute_url("http://example.com/a.html"));
        assert!(is_absolute_url("https://example.com/a.html"));
        assert!(is_absolute_url("/static/a.html"));
        assert!(!is_absolute_url("a.html"));
        assert!(!is_absolute_url("../a.html"));
        assert!(!is_absolute_url("ftp://example.com/a.html"));
    }

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::new());
    }

    #[test]
    fn relative_between_siblings() {
        assert_eq!(
            relative_path(Path::new("/foo/baz"), Path::new("/foo/bar/qux/page.html")),
            Some(PathBuf::from("../bar/qux/page.html"))
        );
        assert_eq!(
            relative_path(Path::new("/foo"), Path::new("/foo")),
            Some(PathBuf::new())
        );
        assert_eq!(relative_path(Path::new("/foo"), Path::new("foo")), None);
        assert_eq!(relative_path(Path::new("../a"), Path::new("b")), None);
    }

    #[test]
    fn rewrite_relative_path_moves_between_directories() {
        assert_eq!(
            rewrite_relative_path(Path::new("/foo/bar"), Path::new("/foo/baz"), "qux/page.html"),
            "../bar/qux/page.html"
        );
    }

    #[test]
    fn rewrite_to_same_directory_is_identity() {
        let dir = Path::new("/foo/bar");
        for path in ["page.html", "qux/page.html", "../up/page.html", "a/b/c.css"] {
            assert_eq!(rewrite_relative_path(dir, dir, path), path);
        }
    }

    #[test]
    fn rewrite_leaves_absolute_and_empty_references() {
        let (from, to) = (Path::new("/foo/bar"), Path::new("/foo/baz"));
        for path in ["", "#top", "/abs.html", "http://x/y", "data:,z"] {
            assert_eq!(rewrite_relative_path(from, to, path), path);
        }
    }

    #[test]
    fn asset_path_has_trailing_separator() {
        assert_eq!(asset_path(Path::new("/foo/bar"), Path::new("/foo/baz")), "../bar/");
        assert_eq!(asset_path(Path::new("/foo/bar/x"), Path::new("/foo/bar")), "x/");
        assert_eq!(asset_path(Path::new("/foo/bar"), Path::new("/foo/bar")), "");
    }
}
