//! # Vulcanize Library
//!
//! 把通过 `<link rel="import">` 互相引用的一组 HTML 文件展开为单一的 HTML 文件，
//! 同时改写相对路径，并可选地内联或外提脚本与样式。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、运行选项和文档处理流程
//! - `config` - 命令行与 JSON 配置文件解析
//! - `importer` - import 的递归展开
//! - `resolver` - 相对路径改写
//! - `inliner` - 脚本/样式的内联与外提
//! - `postprocess` - 展开后的整文档处理
//! - `parsers` - HTML 文档树与 CSS 处理
//! - `utils` - 路径与文件工具

pub mod config;
pub mod core;
pub mod importer;
pub mod inliner;
pub mod parsers;
pub mod postprocess;
pub mod resolver;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use importer::{Importer, MAX_IMPORT_DEPTH};
pub use parsers::*;
