// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use halimede::dom::{parse_document, path_of, NodePath};
use halimede::edit::{reconcile, EditTarget};
use smol_str::SmolStr;

mod fixtures;
mod profiler;

fn last_paragraph_path(html: &str) -> NodePath {
    let tree = parse_document(html);
    let index = tree
        .elements()
        .into_iter()
        .filter(|&index| tree.node(index).expect("node").tag() == Some("p"))
        .last()
        .expect("paragraph present");
    path_of(&tree, index).expect("path")
}

// Benchmark identity (keep stable):
// - Group names in this file: `edit.reconcile_by_path`, `edit.reconcile_by_content`
fn benches_reconcile(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("edit.reconcile_by_path");

        for case in [
            fixtures::Case::Small,
            fixtures::Case::MediumNested,
            fixtures::Case::LargeLongText,
        ] {
            let html = fixtures::html_fixture(case);
            let path = last_paragraph_path(&html);
            let tree = parse_document(&html);
            let index = halimede::dom::resolve_path(&tree, &path).expect("resolve");
            let original = tree
                .node(index)
                .expect("node")
                .content_span()
                .expect("content span")
                .slice(&html)
                .to_owned();
            let target = EditTarget {
                path: Some(path),
                tag: SmolStr::new("p"),
                original_content: original,
            };

            group.throughput(Throughput::Bytes(html.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let outcome = reconcile(
                        black_box(&html),
                        black_box(&target),
                        black_box("replacement text"),
                        &[],
                    )
                    .expect("reconcile");
                    black_box(outcome.new_source.len())
                })
            });
        }

        group.finish();
    }

    {
        let mut group = c.benchmark_group("edit.reconcile_by_content");

        for case in [
            fixtures::Case::Small,
            fixtures::Case::MediumNested,
            fixtures::Case::LargeLongText,
        ] {
            let html = fixtures::html_fixture(case);
            let path = last_paragraph_path(&html);
            let tree = parse_document(&html);
            let index = halimede::dom::resolve_path(&tree, &path).expect("resolve");
            let original = tree
                .node(index)
                .expect("node")
                .content_span()
                .expect("content span")
                .slice(&html)
                .to_owned();
            let target = EditTarget {
                path: None,
                tag: SmolStr::new("p"),
                original_content: original,
            };

            group.throughput(Throughput::Bytes(html.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let outcome = reconcile(
                        black_box(&html),
                        black_box(&target),
                        black_box("replacement text"),
                        &[],
                    )
                    .expect("reconcile");
                    black_box(outcome.new_source.len())
                })
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_reconcile
}
criterion_main!(benches);
