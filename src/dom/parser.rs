// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::entities::decode_entities;
use super::node::{Attribute, ByteSpan, DomTree, Node, NodeIndex, NodeKind};

/// Elements that never have content or a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Parses HTML source into a span-annotated tree.
///
/// The parser is tolerant the way a browser is: it never fails. Stray close
/// tags are dropped, mismatched close tags implicitly close everything above
/// the matching open tag, unclosed elements extend to end of input, and a
/// bare `<` that does not start markup is treated as text. Spans always land
/// on the ASCII delimiters that produced them, so slicing the source at any
/// recorded span is valid.
pub fn parse_document(source: &str) -> DomTree {
    Parser::new(source).run()
}

struct OpenElement {
    index: NodeIndex,
    tag: SmolStr,
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    tree: DomTree,
    stack: Vec<OpenElement>,
}

struct OpenTag {
    tag: SmolStr,
    attrs: Vec<Attribute>,
    open_end: usize,
    self_closing: bool,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            tree: DomTree::default(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> DomTree {
        let len = self.bytes.len();
        let mut pos = 0usize;

        while pos < len {
            let Some(rel) = memchr::memchr(b'<', &self.bytes[pos..]) else {
                self.emit_text(pos, len);
                pos = len;
                continue;
            };
            let lt = pos + rel;
            if lt > pos {
                self.emit_text(pos, lt);
            }

            pos = match self.bytes.get(lt + 1).copied() {
                Some(b'!') => self.consume_declaration(lt),
                Some(b'/') => self.consume_close_tag(lt),
                Some(byte) if byte.is_ascii_alphabetic() => self.consume_open_tag(lt),
                _ => self.consume_literal_lt(lt),
            };
        }

        while let Some(open) = self.stack.pop() {
            finalize_element(&mut self.tree, open.index, len, len);
        }
        self.tree
    }

    fn parent(&self) -> Option<NodeIndex> {
        self.stack.last().map(|open| open.index)
    }

    fn emit_text(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let parent = self.parent();
        self.tree
            .push(Node::new(NodeKind::Text, ByteSpan::new(start, end), parent));
    }

    /// A `<` that does not open markup becomes part of a text run extending
    /// to the next `<`.
    fn consume_literal_lt(&mut self, lt: usize) -> usize {
        let end = memchr::memchr(b'<', &self.bytes[lt + 1..])
            .map(|rel| lt + 1 + rel)
            .unwrap_or(self.bytes.len());
        self.emit_text(lt, end);
        end
    }

    fn consume_declaration(&mut self, lt: usize) -> usize {
        let parent = self.parent();
        if self.bytes[lt..].starts_with(b"<!--") {
            let end = memchr::memmem::find(&self.bytes[lt + 4..], b"-->")
                .map(|rel| lt + 4 + rel + 3)
                .unwrap_or(self.bytes.len());
            self.tree
                .push(Node::new(NodeKind::Comment, ByteSpan::new(lt, end), parent));
            return end;
        }

        let end = memchr::memchr(b'>', &self.bytes[lt..])
            .map(|rel| lt + rel + 1)
            .unwrap_or(self.bytes.len());
        self.tree
            .push(Node::new(NodeKind::Doctype, ByteSpan::new(lt, end), parent));
        end
    }

    fn consume_close_tag(&mut self, lt: usize) -> usize {
        let name_start = lt + 2;
        let name_end = scan_tag_name(self.bytes, name_start);
        if name_end == name_start {
            return self.consume_literal_lt(lt);
        }
        let name = self.source[name_start..name_end].to_ascii_lowercase();
        let tag_end = memchr::memchr(b'>', &self.bytes[name_end..])
            .map(|rel| name_end + rel + 1)
            .unwrap_or(self.bytes.len());

        if let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| open.tag.as_str() == name.as_str())
        {
            // Anything opened after the matching element closes implicitly
            // at the start of this close tag.
            while self.stack.len() > depth + 1 {
                let open = self.stack.pop().expect("stack above depth");
                finalize_element(&mut self.tree, open.index, lt, lt);
            }
            let open = self.stack.pop().expect("stack at depth");
            finalize_element(&mut self.tree, open.index, lt, tag_end);
        }
        // A close tag with no matching open tag is dropped.
        tag_end
    }

    fn consume_open_tag(&mut self, lt: usize) -> usize {
        let Some(open) = parse_open_tag(self.source, self.bytes, lt) else {
            return self.consume_literal_lt(lt);
        };

        let parent = self.parent();
        let closes_immediately = open.self_closing || is_void_element(open.tag.as_str());
        // Non-void spans grow when the close tag (or end of input) is found.
        let span_end = open.open_end;

        let element = Node::new(
            NodeKind::Element {
                tag: open.tag.clone(),
                attrs: open.attrs,
                open_span: ByteSpan::new(lt, open.open_end),
                content_span: ByteSpan::new(open.open_end, open.open_end),
                self_closing: open.self_closing,
            },
            ByteSpan::new(lt, span_end),
            parent,
        );
        let index = self.tree.push(element);

        if closes_immediately {
            return open.open_end;
        }

        if is_raw_text_element(open.tag.as_str()) {
            return self.consume_raw_text(index, open.tag.as_str(), open.open_end);
        }

        self.stack.push(OpenElement {
            index,
            tag: open.tag,
        });
        open.open_end
    }

    fn consume_raw_text(&mut self, index: NodeIndex, tag: &str, content_start: usize) -> usize {
        match find_close_tag(self.source, content_start, tag) {
            Some(close_start) => {
                if close_start > content_start {
                    self.tree.push(Node::new(
                        NodeKind::Text,
                        ByteSpan::new(content_start, close_start),
                        Some(index),
                    ));
                }
                let after_name = close_start + 2 + tag.len();
                let tag_end = memchr::memchr(b'>', &self.bytes[after_name.min(self.bytes.len())..])
                    .map(|rel| after_name + rel + 1)
                    .unwrap_or(self.bytes.len());
                finalize_element(&mut self.tree, index, close_start, tag_end);
                tag_end
            }
            None => {
                let len = self.bytes.len();
                if len > content_start {
                    self.tree.push(Node::new(
                        NodeKind::Text,
                        ByteSpan::new(content_start, len),
                        Some(index),
                    ));
                }
                finalize_element(&mut self.tree, index, len, len);
                len
            }
        }
    }
}

fn finalize_element(tree: &mut DomTree, index: NodeIndex, content_end: usize, span_end: usize) {
    let Some(node) = tree.node_mut(index) else {
        return;
    };
    if let NodeKind::Element { content_span, .. } = node.kind_mut() {
        content_span.end = content_end.max(content_span.start);
    }
    node.set_span_end(span_end);
}

fn scan_tag_name(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && matches!(bytes[i], b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b':')
    {
        i += 1;
    }
    i
}

/// Finds the start of `</tag` (ASCII case-insensitive, name boundary
/// respected) at or after `from`.
fn find_close_tag(source: &str, from: usize, tag: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut at = from;
    while let Some(rel) = memchr::memmem::find(&bytes[at..], b"</") {
        let idx = at + rel;
        let name_start = idx + 2;
        let name_end = scan_tag_name(bytes, name_start);
        if name_end > name_start && source[name_start..name_end].eq_ignore_ascii_case(tag) {
            return Some(idx);
        }
        at = idx + 2;
    }
    None
}

fn parse_open_tag(source: &str, bytes: &[u8], lt: usize) -> Option<OpenTag> {
    let len = bytes.len();
    let name_start = lt + 1;
    let name_end = scan_tag_name(bytes, name_start);
    if name_end == name_start {
        return None;
    }
    let tag = SmolStr::new(source[name_start..name_end].to_ascii_lowercase());

    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut i = name_end;
    let open_end = loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            // Unterminated open tag runs to end of input.
            break len;
        }
        match bytes[i] {
            b'>' => break i + 1,
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                break i + 2;
            }
            b'/' => {
                i += 1;
            }
            b'<' => {
                // A new tag starts before this one closed; end it here.
                break i;
            }
            _ => {
                let (attr, next) = parse_attribute(source, bytes, i);
                if let Some(attr) = attr {
                    attrs.push(attr);
                }
                i = next.max(i + 1);
            }
        }
    };

    Some(OpenTag {
        tag,
        attrs,
        open_end,
        self_closing,
    })
}

fn parse_attribute(source: &str, bytes: &[u8], start: usize) -> (Option<Attribute>, usize) {
    let len = bytes.len();
    let mut i = start;
    while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/' | b'<')
    {
        i += 1;
    }
    if i == start {
        return (None, start + 1);
    }
    let name = SmolStr::new(source[start..i].to_ascii_lowercase());

    let mut j = i;
    while j < len && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if bytes.get(j) != Some(&b'=') {
        // Boolean attribute.
        return (Some(Attribute::new(name, String::new())), i);
    }
    j += 1;
    while j < len && bytes[j].is_ascii_whitespace() {
        j += 1;
    }

    match bytes.get(j) {
        Some(&quote @ (b'"' | b'\'')) => {
            let value_start = j + 1;
            let value_end = memchr::memchr(quote, &bytes[value_start..])
                .map(|rel| value_start + rel)
                .unwrap_or(len);
            let value = decode_entities(&source[value_start..value_end]);
            let next = (value_end + 1).min(len);
            (Some(Attribute::new(name, value)), next)
        }
        _ => {
            let value_start = j;
            let mut value_end = j;
            while value_end < len
                && !bytes[value_end].is_ascii_whitespace()
                && bytes[value_end] != b'>'
            {
                value_end += 1;
            }
            let value = decode_entities(&source[value_start..value_end]);
            (Some(Attribute::new(name, value)), value_end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_document;
    use crate::dom::{NodeKind, NodeIndex};

    fn first_element_with_tag(source: &str, tag: &str) -> Option<(NodeIndex, String, String)> {
        let tree = parse_document(source);
        for index in tree.elements() {
            let node = tree.node(index).expect("node");
            if node.tag() == Some(tag) {
                let content = node.content_span().expect("element span").slice(source);
                let full = node.span().slice(source);
                return Some((index, content.to_owned(), full.to_owned()));
            }
        }
        None
    }

    #[test]
    fn parses_nested_elements_with_exact_spans() {
        let source = "<html><body><p>Hello</p></body></html>";
        let (_, content, full) = first_element_with_tag(source, "p").expect("p element");
        assert_eq!(content, "Hello");
        assert_eq!(full, "<p>Hello</p>");

        let (_, body_content, _) = first_element_with_tag(source, "body").expect("body element");
        assert_eq!(body_content, "<p>Hello</p>");
    }

    #[test]
    fn parses_attributes_quoted_and_unquoted() {
        let source = r#"<a href="/docs" target=_blank data-id='x' download>Docs</a>"#;
        let tree = parse_document(source);
        let index = tree.elements().into_iter().next().expect("a element");
        let node = tree.node(index).expect("node");
        let attrs: Vec<(&str, &str)> = node
            .attrs()
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("href", "/docs"),
                ("target", "_blank"),
                ("data-id", "x"),
                ("download", ""),
            ]
        );
    }

    #[test]
    fn decodes_entities_in_attribute_values() {
        let source = r#"<p title="a &amp; b">x</p>"#;
        let tree = parse_document(source);
        let index = tree.elements().into_iter().next().expect("p element");
        assert_eq!(tree.node(index).expect("node").attrs()[0].value, "a & b");
    }

    #[test]
    fn void_elements_have_empty_content() {
        let source = "<p>a<br>b<img src=x></p>";
        let tree = parse_document(source);
        let (_, content, _) = first_element_with_tag(source, "p").expect("p");
        assert_eq!(content, "a<br>b<img src=x>");
        let (img, ..) = first_element_with_tag(source, "img").expect("img");
        let node = tree.node(img).expect("img node");
        assert!(node.content_span().expect("span").is_empty());
    }

    #[test]
    fn doctype_and_comments_are_kept_as_nodes() {
        let source = "<!DOCTYPE html>\n<!-- note -->\n<p>x</p>";
        let tree = parse_document(source);
        let kinds: Vec<_> = tree
            .roots()
            .iter()
            .map(|&index| match tree.node(index).expect("node").kind() {
                NodeKind::Doctype => "doctype",
                NodeKind::Comment => "comment",
                NodeKind::Text => "text",
                NodeKind::Element { .. } => "element",
            })
            .collect();
        assert_eq!(kinds, vec!["doctype", "text", "comment", "text", "element"]);
    }

    #[test]
    fn script_content_is_raw_text() {
        let source = "<script>if (a < b) { run('<p>'); }</script><p>after</p>";
        let (_, content, _) = first_element_with_tag(source, "script").expect("script");
        assert_eq!(content, "if (a < b) { run('<p>'); }");
        let (_, after, _) = first_element_with_tag(source, "p").expect("p");
        assert_eq!(after, "after");
    }

    #[test]
    fn mismatched_close_tag_closes_open_children() {
        let source = "<div><p>one</div>";
        let tree = parse_document(source);
        let div = tree.elements()[0];
        let node = tree.node(div).expect("div");
        assert_eq!(node.tag(), Some("div"));
        assert_eq!(node.span().slice(source), source);
        let p = tree.elements()[1];
        let p_node = tree.node(p).expect("p");
        assert_eq!(p_node.content_span().expect("span").slice(source), "one");
    }

    #[test]
    fn stray_close_tag_is_dropped() {
        let source = "</b><p>x</p>";
        let tree = parse_document(source);
        assert_eq!(tree.elements().len(), 1);
    }

    #[test]
    fn unclosed_element_extends_to_end_of_input() {
        let source = "<p>never closed";
        let tree = parse_document(source);
        let index = tree.elements()[0];
        let node = tree.node(index).expect("p");
        assert_eq!(node.content_span().expect("span").slice(source), "never closed");
        assert_eq!(node.span().slice(source), source);
    }

    #[test]
    fn bare_angle_bracket_is_text() {
        let source = "<p>1 < 2</p>";
        let (_, content, _) = first_element_with_tag(source, "p").expect("p");
        assert_eq!(content, "1 < 2");
        let tree = parse_document(source);
        assert_eq!(tree.elements().len(), 1);
    }

    #[test]
    fn multibyte_text_keeps_valid_spans() {
        let source = "<p>héllo wörld ünïcode</p>";
        let (_, content, full) = first_element_with_tag(source, "p").expect("p");
        assert_eq!(content, "héllo wörld ünïcode");
        assert_eq!(full, source);
    }
}
