//! CSS 路径重写模块
//!
//! 文档被搬到输出目录之后，样式中 `url(...)` 引用的相对路径会失效。
//! 本模块负责把这些引用改写为相对于输出目录的路径。
//!
//! # 处理规则
//!
//! - 借助 cssparser 逐个记号扫描，只处理 `url(...)` 记号，注释、字符串和其余
//!   CSS 内容按原文输出
//! - 去掉路径两侧的引号，改写后不再加回引号；只有当路径里含有必须转义的字符时
//!   才以带引号的字符串输出
//! - 绝对 URL（`data:`、`http:`、`https:` 以及以 `/` 开头的路径）不做改动
//!
//! # 使用示例
//!
//! ```rust
//! use std::path::Path;
//! use vulcanize::parsers::css::rewrite_css_urls;
//!
//! let css = rewrite_css_urls(
//!     Path::new("/foo/bar"),
//!     Path::new("/foo/baz"),
//!     "background-image: url('backgrounds/bkg.png')",
//! );
//! assert_eq!(css, "background-image: url(../bar/backgrounds/bkg.png)");
//! ```

use std::path::Path;

use cssparser::{serialize_string, ParseError, Parser, ParserInput, Token};

use crate::utils::path::rewrite_relative_path;

/// 将 CSS 文本中所有 `url(...)` 引用从 `input_dir` 改写为相对于 `output_dir`
///
/// # 参数
///
/// * `input_dir` - 样式原本所在的目录
/// * `output_dir` - 样式最终被引用的目录
/// * `css` - 要处理的 CSS 文本
///
/// # 返回值
///
/// 改写后的 CSS 文本
pub fn rewrite_css_urls(input_dir: &Path, output_dir: &Path, css: &str) -> String {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut result = String::with_capacity(css.len());
    rewrite_tokens(&mut parser, input_dir, output_dir, &mut result);
    result
}

/// 格式化 `url()` 记号，必要时给路径加上引号
pub fn format_url(path: &str) -> String {
    let needs_quotes = path
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '(' | ')' | '\'' | '"' | '\\'));

    if needs_quotes {
        let mut quoted = String::new();
        let _ = serialize_string(path, &mut quoted);
        format!("url({quoted})")
    } else {
        format!("url({path})")
    }
}

/// Copies every token of `parser` into `result`, rewriting `url()` tokens and
/// descending into blocks. Anything else is copied from the source verbatim.
fn rewrite_tokens(parser: &mut Parser, input_dir: &Path, output_dir: &Path, result: &mut String) {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::UnquotedUrl(ref value) => {
                result.push_str(&format_url(&rewrite_relative_path(
                    input_dir, output_dir, value,
                )));
            }
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                // url( 后面紧跟引号时，cssparser 给出的是 url 函数而不是 UnquotedUrl
                let mut quoted: Option<String> = None;
                let _: Result<(), ParseError<()>> = parser.parse_nested_block(|inner| {
                    if let Ok(value) = inner.expect_string_cloned() {
                        if inner.is_exhausted() {
                            quoted = Some(value.to_string());
                        }
                    }
                    while inner.next_including_whitespace_and_comments().is_ok() {}
                    Ok(())
                });

                match quoted {
                    Some(value) => result.push_str(&format_url(&rewrite_relative_path(
                        input_dir, output_dir, &value,
                    ))),
                    None => result.push_str(parser.slice_from(start)),
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                result.push_str(parser.slice_from(start));

                let mut inner_end = parser.position();
                let _: Result<(), ParseError<()>> = parser.parse_nested_block(|inner| {
                    rewrite_tokens(inner, input_dir, output_dir, result);
                    inner_end = inner.position();
                    Ok(())
                });
                // 闭合括号；块在输入末尾未闭合时为空
                result.push_str(parser.slice_from(inner_end));
            }
            _ => result.push_str(parser.slice_from(start)),
        }
    }
}
