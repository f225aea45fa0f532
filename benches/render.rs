// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use halimede::dom::parse_document;
use halimede::preview::{render_preview, RenderOptions};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `preview.render`
fn benches_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview.render");

    for case in [
        fixtures::Case::Small,
        fixtures::Case::MediumNested,
        fixtures::Case::LargeLongText,
    ] {
        let html = fixtures::html_fixture(case);
        let tree = parse_document(&html);
        let options = RenderOptions { width: 100 };
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_function(case.id(), move |b| {
            b.iter(|| {
                let render = render_preview(black_box(&html), black_box(&tree), &options);
                black_box(fixtures::checksum_render(black_box(&render)))
            })
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_render
}
criterion_main!(benches);
