// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use halimede::dom::DomTree;
use halimede::preview::PreviewRender;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("halimede_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create bench temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumNested,
    LargeLongText,
}

impl Case {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumNested => "medium_nested",
            Self::LargeLongText => "large_long_text",
        }
    }
}

/// Deterministic HTML documents of increasing size and nesting.
pub fn html_fixture(case: Case) -> String {
    let (sections, paragraphs_per_section, words) = match case {
        Case::Small => (2, 3, 8),
        Case::MediumNested => (12, 10, 12),
        Case::LargeLongText => (40, 20, 40),
    };

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<title>Fixture</title>\n</head>\n<body>\n");
    out.push_str("<h1>Benchmark fixture</h1>\n");
    for section in 0..sections {
        out.push_str(&format!(
            "<section id=\"s{section}\" class=\"block even\">\n<h2>Section {section}</h2>\n"
        ));
        for paragraph in 0..paragraphs_per_section {
            out.push_str(&format!("<p class=\"copy\">para {section}-{paragraph}"));
            for word in 0..words {
                out.push_str(&format!(" word{word}"));
            }
            if paragraph % 3 == 0 {
                out.push_str(" <em>emphasis</em> and <strong>strong</strong>");
            }
            out.push_str("</p>\n");
        }
        out.push_str("<ul>\n");
        for item in 0..3 {
            out.push_str(&format!(
                "<li><a href=\"/s{section}/i{item}\">item {item}</a></li>\n"
            ));
        }
        out.push_str("</ul>\n</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

pub fn checksum_tree(tree: &DomTree) -> u64 {
    let mut sum = tree.nodes().len() as u64;
    for node in tree.nodes() {
        sum = sum
            .wrapping_mul(31)
            .wrapping_add(node.span().end as u64)
            .wrapping_add(node.children().len() as u64);
    }
    sum
}

pub fn checksum_render(render: &PreviewRender) -> u64 {
    let mut sum = render.lines.len() as u64;
    for line in &render.lines {
        sum = sum.wrapping_mul(31).wrapping_add(line.len() as u64);
    }
    sum.wrapping_add(render.index.len() as u64)
}
