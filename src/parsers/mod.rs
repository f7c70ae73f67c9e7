//! # 解析器模块
//!
//! - `html` - HTML 文档树、查询、解析与序列化
//! - `css` - 样式中 `url()` 引用的路径改写

pub mod css;
pub mod html;

// Re-export commonly used items for convenience
pub use css::rewrite_css_urls;
pub use html::{
    html_to_fragment, parse_html, serialize_fragment, serialize_node, Fragment, NodeId,
    ParseContext, Predicate, Tree,
};
