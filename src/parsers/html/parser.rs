//! HTML 解析入口
//!
//! 真正的 HTML5 解析由 html5ever 完成：先解析进 `RcDom`，再把得到的节点逐个收养进
//! arena。`<template>` 的内容被当作普通子节点收养，这样后续的查找和路径重写也能
//! 覆盖模板内部的节点。

use std::io;

use encoding_rs::Encoding;
use html5ever::interface::QualName;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use super::dom::{NodeData, NodeId, Tree};
use super::fragment::Fragment;

/// Parsing context used when turning markup into a [`Fragment`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseContext {
    /// Parse as the contents of a `<body>`; the fragment holds the top-level
    /// nodes of the markup
    #[default]
    Body,
    /// Parse as a complete document; the fragment holds the single document
    /// node, with `<html>`, `<head>` and `<body>` underneath
    Document,
}

/// 将 HTML 字节解析为 Fragment
pub fn html_to_fragment(
    tree: &mut Tree,
    data: &[u8],
    document_encoding: &str,
    context: ParseContext,
) -> io::Result<Fragment> {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.into_owned();
    } else {
        s = String::from_utf8_lossy(data).into_owned();
    }

    parse_html(tree, &s, context)
}

pub fn parse_html(tree: &mut Tree, html: &str, context: ParseContext) -> io::Result<Fragment> {
    match context {
        ParseContext::Body => {
            let dom = parse_fragment(
                RcDom::default(),
                ParseOpts::default(),
                QualName::new(None, ns!(html), LocalName::from("body")),
                vec![],
            )
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

            // html5ever 把片段内容挂在一个合成的 <html> 根节点下面
            let mut ids = Vec::new();
            if let Some(root) = dom.document.children.borrow().first() {
                for child in root.children.borrow().iter() {
                    if let Some(id) = adopt(tree, child) {
                        ids.push(id);
                    }
                }
            }
            Ok(tree.fragment_from_nodes(&ids))
        }
        ParseContext::Document => {
            let dom = parse_document(RcDom::default(), ParseOpts::default())
                .from_utf8()
                .read_from(&mut html.as_bytes())?;

            Ok(adopt(tree, &dom.document).map_or_else(Fragment::empty, Fragment::single))
        }
    }
}

/// Copies an `RcDom` subtree into the arena. Processing instructions are
/// dropped.
fn adopt(tree: &mut Tree, handle: &Handle) -> Option<NodeId> {
    let data = match &handle.data {
        RcNodeData::Document => NodeData::Document,
        RcNodeData::Doctype { name, .. } => NodeData::Doctype { name: name.clone() },
        RcNodeData::Text { contents } => NodeData::Text {
            contents: contents.borrow().clone(),
        },
        RcNodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        RcNodeData::Element { name, attrs, .. } => NodeData::Element {
            name: name.clone(),
            attrs: attrs.borrow().clone(),
        },
        RcNodeData::ProcessingInstruction { .. } => return None,
    };
    let id = tree.create_node(data);

    let children = match &handle.data {
        RcNodeData::Element {
            template_contents, ..
        } => match template_contents.borrow().as_ref() {
            Some(contents) => contents.children.borrow().clone(),
            None => handle.children.borrow().clone(),
        },
        _ => handle.children.borrow().clone(),
    };

    for child in children.iter() {
        if let Some(child_id) = adopt(tree, child) {
            tree.append_child(id, child_id);
        }
    }

    Some(id)
}
