// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text preview rendering.
//!
//! Derives a terminal rendering of an HTML document together with a node
//! index mapping rendered spans back to DOM nodes, so the preview pane can
//! select elements and edit them in place. Rendering is deterministic:
//! unchanged source always produces the identical rendering and index.

use std::collections::BTreeMap;

use crate::dom::{decode_entities, DomTree, NodeIndex, NodeKind};

pub mod surface;
mod text;

pub use surface::{PreviewSurface, SurfaceError};

pub(crate) use text::truncate_with_ellipsis;

/// Tags the preview offers for in-place visual editing.
pub const EDITABLE_TAGS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "span",
    "div",
    "a",
    "li",
    "td",
    "th",
    "blockquote",
    "em",
    "strong",
    "i",
    "b",
];

pub fn is_editable_tag(tag: &str) -> bool {
    EDITABLE_TAGS.contains(&tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { width: 80 }
    }
}

/// A contiguous span of cells within a single rendered line.
///
/// Coordinates are `(line, x0, x1)` in character-cell indices, inclusive,
/// relative to the rendered lines.
pub type LineSpan = (usize, usize, usize);

/// Mapping from editable DOM nodes to the rendered spans they produced.
pub type NodeSpanIndex = BTreeMap<NodeIndex, Vec<LineSpan>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRender {
    pub lines: Vec<String>,
    pub index: NodeSpanIndex,
}

impl PreviewRender {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Indexed nodes ordered by first rendered position; the preview pane
    /// cycles selection through this order.
    pub fn nodes_in_render_order(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<(LineSpan, NodeIndex)> = self
            .index
            .iter()
            .filter_map(|(&node, spans)| spans.first().map(|&span| (span, node)))
            .collect();
        nodes.sort();
        nodes.into_iter().map(|(_, node)| node).collect()
    }
}

/// Renders `tree` (parsed from `source`) into preview text plus node index.
pub fn render_preview(source: &str, tree: &DomTree, options: &RenderOptions) -> PreviewRender {
    let mut renderer = Renderer {
        source,
        tree,
        width: options.width.max(16),
        lines: Vec::new(),
        index: NodeSpanIndex::new(),
        para: Para::default(),
        attr_stack: Vec::new(),
    };
    renderer.run();
    PreviewRender {
        lines: renderer.lines,
        index: renderer.index,
    }
}

#[derive(Debug, Default)]
struct Para {
    text: Vec<char>,
    segments: Vec<Segment>,
    hard_breaks: Vec<usize>,
}

#[derive(Debug)]
struct Segment {
    start: usize,
    end: usize,
    nodes: Vec<NodeIndex>,
}

impl Para {
    fn is_blank(&self) -> bool {
        self.text.iter().all(|&ch| ch == ' ')
    }

    fn ends_with_space(&self) -> bool {
        matches!(self.text.last(), None | Some(' '))
    }

    fn push_collapsed(&mut self, raw: &str, nodes: &[NodeIndex]) {
        let start = self.text.len();
        for ch in raw.chars() {
            if ch.is_whitespace() {
                if !self.ends_with_space() {
                    self.text.push(' ');
                }
            } else {
                self.text.push(ch);
            }
        }
        let end = self.text.len();
        if end > start && !nodes.is_empty() {
            self.segments.push(Segment {
                start,
                end,
                nodes: nodes.to_vec(),
            });
        }
    }

    /// Pushes literal decoration text (no whitespace collapsing).
    fn push_literal(&mut self, literal: &str, nodes: &[NodeIndex]) {
        let start = self.text.len();
        self.text.extend(literal.chars());
        let end = self.text.len();
        if end > start && !nodes.is_empty() {
            self.segments.push(Segment {
                start,
                end,
                nodes: nodes.to_vec(),
            });
        }
    }

    fn hard_break(&mut self) {
        let at = self.text.len();
        if at > 0 && self.hard_breaks.last() != Some(&at) {
            self.hard_breaks.push(at);
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        self.segments.clear();
        self.hard_breaks.clear();
    }
}

struct Renderer<'a> {
    source: &'a str,
    tree: &'a DomTree,
    width: usize,
    lines: Vec<String>,
    index: NodeSpanIndex,
    para: Para,
    attr_stack: Vec<NodeIndex>,
}

impl<'a> Renderer<'a> {
    fn run(&mut self) {
        let body = self
            .tree
            .elements()
            .into_iter()
            .find(|&index| self.tree.node(index).and_then(|node| node.tag()) == Some("body"));

        match body {
            Some(body) => {
                let children: Vec<NodeIndex> =
                    self.tree.node(body).expect("body node").children().to_vec();
                for child in children {
                    self.render_block(child, "", "");
                }
            }
            None => {
                let roots = self.tree.roots().to_vec();
                for root in roots {
                    self.render_block(root, "", "");
                }
            }
        }

        self.flush_para("", "");
        while matches!(self.lines.last(), Some(line) if line.is_empty()) {
            self.lines.pop();
        }
    }

    fn push_editable(&mut self, index: NodeIndex) -> bool {
        let editable = self
            .tree
            .node(index)
            .and_then(|node| node.tag())
            .is_some_and(is_editable_tag);
        if editable {
            self.attr_stack.push(index);
        }
        editable
    }

    fn pop_editable(&mut self, pushed: bool) {
        if pushed {
            self.attr_stack.pop();
        }
    }

    fn render_block(&mut self, index: NodeIndex, prefix_first: &str, prefix_rest: &str) {
        let Some(node) = self.tree.node(index) else {
            return;
        };

        match node.kind() {
            NodeKind::Text => {
                let raw = decode_entities(node.span().slice(self.source));
                let nodes = self.attr_stack.clone();
                self.para.push_collapsed(&raw, &nodes);
            }
            NodeKind::Comment | NodeKind::Doctype => {}
            NodeKind::Element { tag, .. } => {
                let tag = tag.clone();
                match tag.as_str() {
                    "script" | "style" | "head" | "title" | "meta" | "link" | "template" => {}
                    "html" | "body" => {
                        let children = node.children().to_vec();
                        for child in children {
                            self.render_block(child, prefix_first, prefix_rest);
                        }
                    }
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let level = tag.as_bytes()[1] - b'0';
                        self.flush_para(prefix_first, prefix_rest);
                        let marker = "#".repeat(level as usize) + " ";
                        let pushed = self.push_editable(index);
                        self.render_inline_children(index);
                        self.pop_editable(pushed);
                        let first = format!("{prefix_first}{marker}");
                        let rest = format!("{prefix_rest}{}", " ".repeat(marker.len()));
                        self.flush_para(&first, &rest);
                        self.blank_line();
                    }
                    "p" => {
                        self.flush_para(prefix_first, prefix_rest);
                        let pushed = self.push_editable(index);
                        self.render_inline_children(index);
                        self.pop_editable(pushed);
                        self.flush_para(prefix_first, prefix_rest);
                        self.blank_line();
                    }
                    "ul" | "ol" => {
                        self.flush_para(prefix_first, prefix_rest);
                        self.render_list(index, &tag, prefix_rest);
                        self.blank_line();
                    }
                    "li" => {
                        // Stray list item outside a list.
                        self.flush_para(prefix_first, prefix_rest);
                        self.render_list_item(index, "• ", prefix_rest);
                    }
                    "blockquote" => {
                        self.flush_para(prefix_first, prefix_rest);
                        let pushed = self.push_editable(index);
                        let first = format!("{prefix_first}│ ");
                        let rest = format!("{prefix_rest}│ ");
                        let children = node.children().to_vec();
                        for child in children {
                            self.render_block(child, &first, &rest);
                        }
                        self.flush_para(&first, &rest);
                        self.pop_editable(pushed);
                        self.blank_line();
                    }
                    "pre" => {
                        self.flush_para(prefix_first, prefix_rest);
                        self.render_pre(index, prefix_rest);
                        self.blank_line();
                    }
                    "br" => self.para.hard_break(),
                    "hr" => {
                        self.flush_para(prefix_first, prefix_rest);
                        let rule_width = self.width.saturating_sub(prefix_rest.chars().count());
                        self.lines
                            .push(format!("{prefix_rest}{}", "─".repeat(rule_width)));
                        self.blank_line();
                    }
                    "table" => {
                        self.flush_para(prefix_first, prefix_rest);
                        self.render_table(index, prefix_rest);
                        self.blank_line();
                    }
                    "tr" => {
                        self.flush_para(prefix_first, prefix_rest);
                        self.render_table_row(index, prefix_rest);
                    }
                    "div" | "section" | "article" | "header" | "footer" | "main" | "nav"
                    | "aside" | "figure" | "figcaption" | "form" => {
                        self.flush_para(prefix_first, prefix_rest);
                        let pushed = self.push_editable(index);
                        let children = node.children().to_vec();
                        for child in children {
                            self.render_block(child, prefix_first, prefix_rest);
                        }
                        self.flush_para(prefix_first, prefix_rest);
                        self.pop_editable(pushed);
                    }
                    _ => {
                        // Inline content at block level flows into the
                        // current paragraph.
                        self.render_inline(index);
                    }
                }
            }
        }
    }

    fn render_inline_children(&mut self, index: NodeIndex) {
        let children = match self.tree.node(index) {
            Some(node) => node.children().to_vec(),
            None => return,
        };
        for child in children {
            self.render_inline(child);
        }
    }

    fn render_inline(&mut self, index: NodeIndex) {
        let Some(node) = self.tree.node(index) else {
            return;
        };

        match node.kind() {
            NodeKind::Text => {
                let raw = decode_entities(node.span().slice(self.source));
                let nodes = self.attr_stack.clone();
                self.para.push_collapsed(&raw, &nodes);
            }
            NodeKind::Comment | NodeKind::Doctype => {}
            NodeKind::Element { tag, .. } => {
                let tag = tag.clone();
                match tag.as_str() {
                    "script" | "style" => {}
                    "br" => self.para.hard_break(),
                    "img" => {
                        let alt = attr_value(self.tree, index, "alt")
                            .or_else(|| attr_value(self.tree, index, "src"))
                            .unwrap_or_default();
                        let nodes = self.attr_stack.clone();
                        self.para.push_literal(&format!("[image: {alt}]"), &nodes);
                    }
                    "a" => {
                        let pushed = self.push_editable(index);
                        let nodes = self.attr_stack.clone();
                        let href = attr_value(self.tree, index, "href").unwrap_or_default();
                        if href.is_empty() {
                            self.render_inline_children(index);
                        } else {
                            self.para.push_literal("[", &nodes);
                            self.render_inline_children(index);
                            self.para.push_literal(&format!("]({href})"), &nodes);
                        }
                        self.pop_editable(pushed);
                    }
                    "em" | "i" => self.render_decorated(index, "_"),
                    "strong" | "b" => self.render_decorated(index, "**"),
                    "code" => self.render_decorated(index, "`"),
                    _ => {
                        let pushed = self.push_editable(index);
                        self.render_inline_children(index);
                        self.pop_editable(pushed);
                    }
                }
            }
        }
    }

    fn render_decorated(&mut self, index: NodeIndex, marker: &str) {
        let pushed = self.push_editable(index);
        let nodes = self.attr_stack.clone();
        self.para.push_literal(marker, &nodes);
        self.render_inline_children(index);
        let nodes = self.attr_stack.clone();
        self.para.push_literal(marker, &nodes);
        self.pop_editable(pushed);
    }

    fn render_list(&mut self, index: NodeIndex, tag: &str, prefix: &str) {
        let items: Vec<NodeIndex> = self
            .tree
            .element_children(Some(index))
            .into_iter()
            .filter(|&item| self.tree.node(item).and_then(|node| node.tag()) == Some("li"))
            .collect();

        let mut ordinal = itoa::Buffer::new();
        for (position, item) in items.into_iter().enumerate() {
            let marker = if tag == "ol" {
                format!("{}. ", ordinal.format(position as u64 + 1))
            } else {
                "• ".to_owned()
            };
            self.render_list_item(item, &marker, prefix);
        }
    }

    fn render_list_item(&mut self, index: NodeIndex, marker: &str, prefix: &str) {
        let pushed = self.push_editable(index);
        let first = format!("{prefix}{marker}");
        let rest = format!("{prefix}{}", " ".repeat(marker.chars().count()));

        let children = match self.tree.node(index) {
            Some(node) => node.children().to_vec(),
            None => Vec::new(),
        };
        let mut nested: Vec<NodeIndex> = Vec::new();
        for child in children {
            let child_tag = self.tree.node(child).and_then(|node| node.tag());
            if matches!(child_tag, Some("ul") | Some("ol")) {
                nested.push(child);
            } else {
                self.render_inline(child);
            }
        }
        self.flush_para(&first, &rest);

        for list in nested {
            let tag = self
                .tree
                .node(list)
                .and_then(|node| node.tag())
                .unwrap_or("ul")
                .to_owned();
            self.render_list(list, &tag, &rest);
        }
        self.pop_editable(pushed);
    }

    fn render_pre(&mut self, index: NodeIndex, prefix: &str) {
        let Some(node) = self.tree.node(index) else {
            return;
        };
        let Some(span) = node.content_span() else {
            return;
        };
        let raw = decode_entities(span.slice(self.source));
        for line in raw.trim_matches('\n').split('\n') {
            self.lines.push(format!("{prefix}  {line}"));
        }
    }

    fn render_table(&mut self, index: NodeIndex, prefix: &str) {
        let mut rows: Vec<NodeIndex> = Vec::new();
        collect_rows(self.tree, index, &mut rows);
        for row in rows {
            self.render_table_row(row, prefix);
        }
    }

    fn render_table_row(&mut self, index: NodeIndex, prefix: &str) {
        let cells: Vec<NodeIndex> = self
            .tree
            .element_children(Some(index))
            .into_iter()
            .filter(|&cell| {
                matches!(
                    self.tree.node(cell).and_then(|node| node.tag()),
                    Some("td") | Some("th")
                )
            })
            .collect();

        for (position, cell) in cells.into_iter().enumerate() {
            if position > 0 {
                self.para.push_literal(" │ ", &[]);
            }
            let pushed = self.push_editable(cell);
            self.render_inline_children(cell);
            self.pop_editable(pushed);
        }
        self.flush_para(prefix, prefix);
    }

    fn blank_line(&mut self) {
        if !matches!(self.lines.last(), Some(line) if line.is_empty()) && !self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }

    fn flush_para(&mut self, prefix_first: &str, prefix_rest: &str) {
        if self.para.text.is_empty() || self.para.is_blank() {
            self.para.clear();
            return;
        }

        let text: String = self.para.text.iter().collect();
        let prefix_first_len = prefix_first.chars().count();
        let prefix_rest_len = prefix_rest.chars().count();

        // Split at hard breaks, then word-wrap each piece.
        let mut pieces: Vec<(usize, usize)> = Vec::new();
        let mut start = 0usize;
        for &brk in &self.para.hard_breaks {
            if brk > start {
                pieces.push((start, brk));
            }
            start = brk;
        }
        if self.para.text.len() > start {
            pieces.push((start, self.para.text.len()));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut emitted_any = false;
        for (piece_start, piece_end) in pieces {
            let piece: String = chars[piece_start..piece_end].iter().collect();
            let wrap_width = self
                .width
                .saturating_sub(prefix_rest_len.max(prefix_first_len))
                .max(8);
            for (line_start, line_end) in text::wrap_ranges(&piece, wrap_width) {
                let abs_start = piece_start + line_start;
                let abs_end = piece_start + line_end;
                let prefix = if emitted_any { prefix_rest } else { prefix_first };
                let prefix_len = if emitted_any {
                    prefix_rest_len
                } else {
                    prefix_first_len
                };
                let line_no = self.lines.len();
                let rendered: String = chars[abs_start..abs_end].iter().collect();
                self.lines.push(format!("{prefix}{rendered}"));
                emitted_any = true;

                for segment in &self.para.segments {
                    let overlap_start = segment.start.max(abs_start);
                    let overlap_end = segment.end.min(abs_end);
                    if overlap_start >= overlap_end {
                        continue;
                    }
                    let x0 = prefix_len + (overlap_start - abs_start);
                    let x1 = prefix_len + (overlap_end - 1 - abs_start);
                    for &node in &segment.nodes {
                        self.index.entry(node).or_default().push((line_no, x0, x1));
                    }
                }
            }
        }

        self.para.clear();
    }
}

fn collect_rows(tree: &DomTree, index: NodeIndex, rows: &mut Vec<NodeIndex>) {
    for child in tree.element_children(Some(index)) {
        match tree.node(child).and_then(|node| node.tag()) {
            Some("tr") => rows.push(child),
            Some("thead") | Some("tbody") | Some("tfoot") => collect_rows(tree, child, rows),
            _ => {}
        }
    }
}

fn attr_value(tree: &DomTree, index: NodeIndex, name: &str) -> Option<String> {
    tree.node(index)?
        .attrs()
        .iter()
        .find(|attr| attr.name.as_str() == name)
        .map(|attr| attr.value.clone())
}

#[cfg(test)]
mod tests {
    use super::{render_preview, RenderOptions};
    use crate::dom::parse_document;

    fn render(source: &str) -> super::PreviewRender {
        let tree = parse_document(source);
        render_preview(source, &tree, &RenderOptions::default())
    }

    #[test]
    fn renders_headings_and_paragraphs() {
        let source = "<html><body><h1>Title</h1><p>Hello world</p></body></html>";
        let preview = render(source);
        assert_eq!(preview.lines[0], "# Title");
        assert!(preview.lines.contains(&"Hello world".to_owned()));
    }

    #[test]
    fn rendering_is_idempotent_on_unchanged_source() {
        let source = "<body><h1>Title</h1><ul><li>one</li><li>two</li></ul><p>x <em>y</em></p></body>";
        let first = render(source);
        let second = render(source);
        assert_eq!(first, second);
    }

    #[test]
    fn whitespace_is_collapsed_like_a_browser_would() {
        let source = "<p>Hello\n\n   world</p>";
        let preview = render(source);
        assert_eq!(preview.lines[0], "Hello world");
    }

    #[test]
    fn long_paragraphs_wrap_at_the_requested_width() {
        let source = "<p>aaa bbb ccc ddd eee</p>";
        let tree = parse_document(source);
        let preview = render_preview(source, &tree, &RenderOptions { width: 16 });
        assert!(preview.lines.len() > 1);
        for line in &preview.lines {
            assert!(line.chars().count() <= 16, "line too wide: {line:?}");
        }
    }

    #[test]
    fn ordered_and_unordered_lists_get_markers() {
        let source = "<ul><li>alpha</li></ul><ol><li>beta</li><li>gamma</li></ol>";
        let preview = render(source);
        let text = preview.text();
        assert!(text.contains("• alpha"));
        assert!(text.contains("1. beta"));
        assert!(text.contains("2. gamma"));
    }

    #[test]
    fn links_and_images_render_as_tokens() {
        let source = r#"<p><a href="/docs">Docs</a> <img src="x.png" alt="logo"></p>"#;
        let preview = render(source);
        assert_eq!(preview.lines[0], "[Docs](/docs) [image: logo]");
    }

    #[test]
    fn index_maps_rendered_spans_back_to_nodes() {
        let source = "<body><p>Hello</p></body>";
        let tree = parse_document(source);
        let preview = render_preview(source, &tree, &RenderOptions::default());

        let p_index = tree
            .elements()
            .into_iter()
            .find(|&index| tree.node(index).expect("node").tag() == Some("p"))
            .expect("p element");
        let spans = preview.index.get(&p_index).expect("p spans");
        assert_eq!(spans, &vec![(0, 0, 4)]);
        assert_eq!(&preview.lines[0][0..5], "Hello");
    }

    #[test]
    fn inline_spans_attribute_to_every_editable_ancestor() {
        let source = "<body><p>say <em>hi</em></p></body>";
        let tree = parse_document(source);
        let preview = render_preview(source, &tree, &RenderOptions::default());

        let find = |tag: &str| {
            tree.elements()
                .into_iter()
                .find(|&index| tree.node(index).expect("node").tag() == Some(tag))
                .expect("element")
        };
        let p_spans = preview.index.get(&find("p")).expect("p spans");
        let em_spans = preview.index.get(&find("em")).expect("em spans");

        // "say _hi_" — the em covers its marked run, the p covers all of it.
        assert_eq!(preview.lines[0], "say _hi_");
        assert_eq!(em_spans.first(), Some(&(0, 4, 4)));
        assert_eq!(p_spans.first(), Some(&(0, 0, 3)));
    }

    #[test]
    fn script_and_style_content_never_render() {
        let source = "<body><script>var x = 1;</script><style>p{}</style><p>visible</p></body>";
        let preview = render(source);
        assert_eq!(preview.text(), "visible");
    }

    #[test]
    fn selection_order_follows_render_order() {
        let source = "<body><h1>A</h1><p>B</p><p>C</p></body>";
        let tree = parse_document(source);
        let preview = render_preview(source, &tree, &RenderOptions::default());
        let order = preview.nodes_in_render_order();
        let tags: Vec<_> = order
            .iter()
            .map(|&index| tree.node(index).expect("node").tag().expect("tag"))
            .collect();
        assert_eq!(tags, vec!["h1", "p", "p"]);
    }
}
