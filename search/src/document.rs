//! Parses XML text into a tree the XPath library can query and pairs
//! every node of that tree with the line it starts on.
//!
//! The XPath library's tree does not remember source positions, so the same
//! text is also parsed with roxmltree, which does. Both parsers see the same
//! elements, comments and processing instructions in the same document
//! order; pairing them by order gives each of those nodes a line. Nodes that
//! roxmltree does not model one-for-one (attributes, text, namespaces) take
//! the line of their parent.
//!
//! The XPath library does not read DTDs. A document with a DOCTYPE is
//! written back out from the roxmltree tree, entities already replaced,
//! and that text is what the XPath library parses.

use std::collections::HashMap;

use log::{debug, trace, warn};
use sxd_document::{dom, Package};
use sxd_xpath::nodeset::Node;
use xpathgrep_problems::Problem;

use crate::{
    diagnostic::{Diagnostic, Label},
    file_id::FileId,
};

/// A source line number, 1-indexed.
pub type Line = u32;

/// What the positional parse learned about a document.
#[derive(Debug, Default)]
pub struct Positions {
    /// The line of every positioned node in document order, starting with
    /// the document root.
    pub lines: Vec<Line>,

    /// The document rewritten without its DOCTYPE and with entity references
    /// replaced, present only when the document has a DOCTYPE.
    ///
    /// The XPath library does not read DTDs, so it is given this text
    /// instead of the original.
    pub expanded: Option<String>,
}

/// Parses the text and returns the line of every positioned node.
///
/// Positioned nodes are the root, elements, comments and processing
/// instructions. This is also the well-formedness check: roxmltree reports
/// the position of the first error, which the XPath library does not.
pub fn positions(text: &str, file_id: &FileId) -> Result<Positions, Diagnostic> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };

    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
        let start = offset_of(text, e.pos());
        Diagnostic::problem(
            Problem::XmlMalformed,
            Label::offset(file_id.clone(), start..start, e.to_string()),
        )
    })?;

    let lines: Vec<Line> = doc
        .root()
        .descendants()
        .filter(|n| n.is_root() || n.is_element() || n.is_comment() || n.is_pi())
        .map(|n| doc.text_pos_at(n.range().start).row)
        .collect();

    trace!("File {} has {} positioned nodes", file_id, lines.len());

    let prolog = &text[..doc.root_element().range().start];
    let expanded = if prolog.contains("<!DOCTYPE") {
        debug!("File {} has a DOCTYPE, expanding entities", file_id);
        Some(expand(&doc))
    } else {
        None
    };

    Ok(Positions { lines, expanded })
}

/// Parses the text into the tree that XPath expressions are evaluated against.
///
/// `positions` must come from [`positions`] for the same text. When the
/// document was expanded, an error cannot point into the original text and
/// refers to the whole file instead.
pub fn parse_package(
    text: &str,
    positions: &Positions,
    file_id: &FileId,
) -> Result<Package, Diagnostic> {
    let (source, in_original) = match &positions.expanded {
        Some(expanded) => (expanded.as_str(), false),
        None => (text, true),
    };

    sxd_document::parser::parse(source).map_err(|e| {
        let message = format!("XML parse error: {}", e);
        let label = if in_original && e.location() <= text.len() {
            Label::offset(file_id.clone(), e.location()..e.location(), message)
        } else {
            Label::file(file_id.clone(), message)
        };
        Diagnostic::problem(Problem::XmlMalformed, label)
    })
}

/// Writes the document back out as XML without a DOCTYPE.
///
/// Entity references are already replaced in the roxmltree tree. Every
/// element redeclares the namespaces in scope so that prefixes resolve the
/// same way they did in the original.
fn expand(doc: &roxmltree::Document) -> String {
    let mut out = String::new();
    for child in doc.root().children() {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: roxmltree::Node, out: &mut String) {
    if node.is_element() {
        out.push('<');
        let tag = node.tag_name();
        let name = qualified_name(node, tag.namespace(), tag.name(), true);
        out.push_str(&name);

        for ns in node.namespaces() {
            if ns.uri() == roxmltree::NS_XML_URI {
                continue;
            }
            match ns.name() {
                Some(prefix) => out.push_str(&format!(" xmlns:{}=\"", prefix)),
                None => out.push_str(" xmlns=\""),
            }
            escape(ns.uri(), true, out);
            out.push('"');
        }

        for attr in node.attributes() {
            out.push(' ');
            out.push_str(&qualified_name(node, attr.namespace(), attr.name(), false));
            out.push_str("=\"");
            escape(attr.value(), true, out);
            out.push('"');
        }

        out.push('>');
        for child in node.children() {
            write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    } else if node.is_text() {
        escape(node.text().unwrap_or_default(), false, out);
    } else if node.is_comment() {
        out.push_str("<!--");
        out.push_str(node.text().unwrap_or_default());
        out.push_str("-->");
    } else if let Some(pi) = node.pi() {
        out.push_str("<?");
        out.push_str(pi.target);
        if let Some(value) = pi.value {
            out.push(' ');
            out.push_str(value);
        }
        out.push_str("?>");
    }
}

/// The prefixed name for a namespace. Elements may use the default
/// namespace; attributes in a namespace always need a prefix.
fn qualified_name(
    node: roxmltree::Node,
    namespace: Option<&str>,
    local: &str,
    element: bool,
) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == roxmltree::NS_XML_URI {
        return format!("xml:{}", local);
    }
    let prefix = if element {
        node.lookup_prefix(uri)
    } else {
        node.namespaces()
            .find(|ns| ns.uri() == uri && ns.name().is_some())
            .and_then(|ns| ns.name())
    };
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn escape(value: &str, attribute: bool, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' if attribute => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}

/// Converts a row and column from roxmltree into a byte offset in the text.
fn offset_of(text: &str, pos: roxmltree::TextPos) -> usize {
    let row = pos.row.saturating_sub(1) as usize;
    let col = pos.col.saturating_sub(1) as usize;

    let line_start = if row == 0 {
        0
    } else {
        text.match_indices('\n')
            .nth(row - 1)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(text.len())
    };

    text[line_start..]
        .char_indices()
        .nth(col)
        .map(|(idx, _)| line_start + idx)
        .unwrap_or(text.len())
}

/// Maps the nodes of a parsed document to the line each starts on.
pub struct LineIndex<'d> {
    lines: HashMap<Node<'d>, Line>,
}

impl<'d> LineIndex<'d> {
    /// Pairs the positioned nodes of the document with `lines`, which must
    /// come from [`positions`] for the same text.
    pub fn new(document: &dom::Document<'d>, lines: &[Line], file_id: &FileId) -> Self {
        let nodes = positioned_nodes(document);

        if nodes.len() != lines.len() {
            warn!(
                "File {} has {} nodes but {} positions; lines after the first difference may be wrong",
                file_id,
                nodes.len(),
                lines.len()
            );
        }

        LineIndex {
            lines: nodes.into_iter().zip(lines.iter().copied()).collect(),
        }
    }

    /// Returns the line of the node itself, or of its parent when the node
    /// has no position of its own.
    ///
    /// Returns `None` only if neither the node nor its parent was paired.
    pub fn line_of(&self, node: Node<'d>) -> Option<Line> {
        self.own_line(node)
            .or_else(|| node.parent().and_then(|parent| self.own_line(parent)))
    }

    fn own_line(&self, node: Node<'d>) -> Option<Line> {
        self.lines.get(&node).copied()
    }
}

/// Returns the root, elements, comments and processing instructions in
/// document order.
fn positioned_nodes<'d>(document: &dom::Document<'d>) -> Vec<Node<'d>> {
    let root = document.root();
    let mut nodes = vec![Node::Root(root)];

    // Children are pushed in reverse so that popping yields document order.
    let mut pending: Vec<Node<'d>> = root
        .children()
        .into_iter()
        .rev()
        .map(|child| match child {
            dom::ChildOfRoot::Element(e) => Node::Element(e),
            dom::ChildOfRoot::Comment(c) => Node::Comment(c),
            dom::ChildOfRoot::ProcessingInstruction(pi) => Node::ProcessingInstruction(pi),
        })
        .collect();

    while let Some(node) = pending.pop() {
        nodes.push(node);
        if let Node::Element(element) = node {
            pending.extend(element.children().into_iter().rev().filter_map(
                |child| match child {
                    dom::ChildOfElement::Element(e) => Some(Node::Element(e)),
                    dom::ChildOfElement::Comment(c) => Some(Node::Comment(c)),
                    dom::ChildOfElement::ProcessingInstruction(pi) => {
                        Some(Node::ProcessingInstruction(pi))
                    }
                    dom::ChildOfElement::Text(_) => None,
                },
            ));
        }
    }

    nodes
}
