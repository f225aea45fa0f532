// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use halimede::dom::parse_document;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `dom.parse_document`
// - Case IDs (the string after the `/`) must remain stable across refactors
//   so results stay comparable over time.
fn benches_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dom.parse_document");

    for case in [
        fixtures::Case::Small,
        fixtures::Case::MediumNested,
        fixtures::Case::LargeLongText,
    ] {
        let html = fixtures::html_fixture(case);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_function(case.id(), move |b| {
            b.iter(|| {
                let tree = parse_document(black_box(&html));
                black_box(fixtures::checksum_tree(black_box(&tree)))
            })
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_parse
}
criterion_main!(benches);
