//! 文件读写

use std::fs;
use std::path::Path;

use encoding_rs::UTF_8;

use crate::core::{VulcanizeError, VulcanizeResult};

pub fn read_file(path: &Path) -> VulcanizeResult<Vec<u8>> {
    fs::read(path).map_err(|source| VulcanizeError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a script or stylesheet as UTF-8, dropping a leading BOM
pub fn read_text(path: &Path) -> VulcanizeResult<String> {
    let data = read_file(path)?;
    let (text, _, _) = UTF_8.decode(&data);
    Ok(text.into_owned())
}

pub fn write_file(path: &Path, contents: &[u8]) -> VulcanizeResult<()> {
    fs::write(path, contents).map_err(|source| VulcanizeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_drops_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, b"\xEF\xBB\xBFvar a = 1;").unwrap();
        assert_eq!(read_text(&path).unwrap(), "var a = 1;");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.js");
        match read_text(&path) {
            Err(VulcanizeError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
