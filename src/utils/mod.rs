//! # 工具模块
//!
//! - `path` - 词法路径运算、绝对 URL 判断、相对路径改写
//! - `fs` - 文件读写，统一转换为 [`VulcanizeError`](crate::core::VulcanizeError)

pub mod fs;
pub mod path;

// Re-export commonly used items for convenience
pub use path::{
    asset_path, is_absolute_url, join_path, normalize_path, relative_path, rewrite_relative_path,
    ABSOLUTE_URL_PATTERN,
};
