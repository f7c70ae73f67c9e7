//! HTML 文档树模块
//!
//! 这个模块被拆分为多个子模块：
//!
//! - `dom`: arena 节点树、属性与文本操作、appendChild
//! - `fragment`: Fragment 视图与 remove / replace 拼接操作
//! - `predicate`: 节点谓词与深度优先查找
//! - `parser`: 基于 html5ever 的解析入口
//! - `serializer`: 序列化功能
//! - `utils`: 元素分类谓词和常量

pub mod dom;
pub mod fragment;
pub mod parser;
pub mod predicate;
pub mod serializer;
pub mod utils;

// 重新导出主要的公共 API
pub use dom::{NodeData, NodeId, Tree};
pub use fragment::Fragment;
pub use parser::{html_to_fragment, parse_html, ParseContext};
pub use predicate::Predicate;
pub use serializer::{serialize_fragment, serialize_node};
pub use utils::{
    is_external_script, is_import, is_inline_script, is_polymer_element, is_style_block,
    is_stylesheet, WHITESPACES,
};
