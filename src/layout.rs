//! Page layout tree and direct text extraction.
//!
//! A page's content stream is turned into a closed tree of [`LayoutNode`]s:
//! text runs, embedded raster images, and form XObjects as containers that
//! recurse. [`collect_text`] folds a tree into the page text; it returns a
//! freshly built string per call and shares no accumulator across pages.

use anyhow::Result;
use log::{error, warn};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use crate::naming;

/// Nested form XObjects deeper than this are ignored. Guards against
/// reference cycles in malformed documents.
const MAX_FORM_DEPTH: usize = 8;

/// One leaf or container in a page's layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// A run of text from the page's text layer.
    Text(String),
    /// An embedded raster image, raw stream bytes plus a magic-number
    /// derived file extension.
    Image {
        data: Vec<u8>,
        ext: Option<&'static str>,
    },
    /// A form XObject wrapping its own child nodes.
    Container(Vec<LayoutNode>),
}

/// Where and whether embedded images are persisted during text collection.
#[derive(Debug, Clone)]
pub struct ImageSink<'a> {
    pub save_images: bool,
    pub src_path: &'a Path,
    pub page_index: usize,
    pub dst_folder: &'a Path,
}

impl<'a> ImageSink<'a> {
    /// A sink that discards all images.
    pub fn discard(src_path: &'a Path, page_index: usize) -> Self {
        Self {
            save_images: false,
            src_path,
            page_index,
            dst_folder: Path::new("."),
        }
    }
}

/// Build the layout tree for one page.
pub fn page_nodes(doc: &Document, page_id: ObjectId) -> Result<Vec<LayoutNode>> {
    let content = doc.get_page_content(page_id)?;
    let resources = page_resources(doc, page_id);
    nodes_from_content(doc, &content, resources, 0)
}

/// Fold a layout tree into the page text: depth-first, document order,
/// newline-joined. With image saving enabled, every image leaf is written
/// to the sink folder under a collision-free name and an `<img/>` tag marks
/// its position in the text. A page with no text-bearing leaves yields the
/// empty string, which is the OCR-fallback signal.
pub fn collect_text(nodes: &[LayoutNode], sink: &ImageSink) -> String {
    let mut parts: Vec<String> = Vec::new();
    for node in nodes {
        match node {
            LayoutNode::Text(text) => {
                if !text.is_empty() {
                    parts.push(text.clone());
                }
            }
            LayoutNode::Image { data, ext } => {
                if sink.save_images {
                    match save_image(data, ext.unwrap_or("bin"), sink) {
                        Some(path) => {
                            parts.push(format!("<img src=\"{}\" />", path.display()));
                        }
                        None => {
                            error!(
                                "Error saving embedded image on page {} of '{}'",
                                sink.page_index + 1,
                                sink.src_path.display()
                            );
                        }
                    }
                }
            }
            LayoutNode::Container(children) => {
                let nested = collect_text(children, sink);
                if !nested.is_empty() {
                    parts.push(nested);
                }
            }
        }
    }
    parts.join("\n")
}

fn save_image(data: &[u8], ext: &str, sink: &ImageSink) -> Option<PathBuf> {
    let path = naming::unique_image_path(
        sink.dst_folder,
        sink.src_path,
        Some(sink.page_index),
        "IMG",
        ext,
    );
    match std::fs::write(&path, data) {
        Ok(()) => Some(path),
        Err(_) => None,
    }
}

fn nodes_from_content(
    doc: &Document,
    content: &[u8],
    resources: Option<&Dictionary>,
    depth: usize,
) -> Result<Vec<LayoutNode>> {
    let content = Content::decode(content)?;

    let mut nodes: Vec<LayoutNode> = Vec::new();
    let mut run = String::new();

    for op in &content.operations {
        match op.operator.as_ref() {
            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    push_string_operand(operand, &mut run);
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = op.operands.first() {
                    for part in parts {
                        push_string_operand(part, &mut run);
                    }
                }
            }
            // Quote operators move to the next line before showing text.
            "'" | "\"" => {
                if !run.is_empty() && !run.ends_with('\n') {
                    run.push('\n');
                }
                if let Some(operand) = op.operands.last() {
                    push_string_operand(operand, &mut run);
                }
            }
            "Td" | "TD" | "Tm" | "T*" => {
                if !run.is_empty() && !run.ends_with('\n') {
                    run.push('\n');
                }
            }
            "ET" => flush_run(&mut run, &mut nodes),
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    flush_run(&mut run, &mut nodes);
                    if let Some(node) = xobject_node(doc, resources, name, depth) {
                        nodes.push(node);
                    }
                }
            }
            _ => {}
        }
    }
    flush_run(&mut run, &mut nodes);

    Ok(nodes)
}

fn flush_run(run: &mut String, nodes: &mut Vec<LayoutNode>) {
    let text = run.trim_end_matches('\n');
    if !text.is_empty() {
        nodes.push(LayoutNode::Text(text.to_string()));
    }
    run.clear();
}

/// Strict decode: non-UTF-8 string operands are discarded rather than
/// smeared into the output as mojibake.
fn push_string_operand(operand: &Object, out: &mut String) {
    if let Object::String(bytes, _) = operand {
        if let Ok(text) = std::str::from_utf8(bytes) {
            out.push_str(text);
        }
    }
}

fn xobject_node(
    doc: &Document,
    resources: Option<&Dictionary>,
    name: &[u8],
    depth: usize,
) -> Option<LayoutNode> {
    let resources = resources?;
    let xobjects = dict_entry(doc, resources, b"XObject")?.as_dict().ok()?;
    let stream = match resolve(doc, xobjects.get(name).ok()?) {
        Object::Stream(stream) => stream,
        _ => return None,
    };

    let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
    match subtype {
        b"Image" => {
            let data = stream.content.clone();
            let ext = naming::image_ext_for_magic(&data);
            Some(LayoutNode::Image { data, ext })
        }
        b"Form" => {
            if depth >= MAX_FORM_DEPTH {
                warn!("Form XObject nesting exceeds {} levels; skipped", MAX_FORM_DEPTH);
                return None;
            }
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            let form_resources = dict_entry(doc, &stream.dict, b"Resources")
                .and_then(|obj| obj.as_dict().ok());
            let children = nodes_from_content(doc, &content, form_resources, depth + 1).ok()?;
            Some(LayoutNode::Container(children))
        }
        _ => None,
    }
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    dict_entry(doc, page, b"Resources")?.as_dict().ok()
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|obj| resolve(doc, obj))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok().unwrap_or(obj),
        _ => obj,
    }
}
