// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! MappedBuffer benchmarks: index/rindex + split + lines

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vellum::MappedBuffer;

fn filled(content: &[u8]) -> MappedBuffer {
    let mut buffer = MappedBuffer::anonymous(content.len().max(1)).expect("failed to map buffer");
    buffer
        .replace_range(.., content)
        .expect("failed to fill buffer");

    buffer
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapped_buffer/index");
    let mut content = vec![b'a'; 1 << 20];
    content.extend_from_slice(b"needle");
    let buffer = filled(&content);

    group.bench_function("index/1MiB", |b| {
        b.iter(|| buffer.index(black_box("needle"), None).expect("failed to index"));
    });

    group.bench_function("rindex/1MiB", |b| {
        b.iter(|| buffer.rindex(black_box(&b'b'), None).expect("failed to rindex"));
    });

    group.finish();
}

fn bench_split_and_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapped_buffer/records");
    let buffer = filled(&b"field,field,field\n".repeat(8192));

    group.bench_function("split/comma", |b| {
        b.iter(|| buffer.split(black_box(","), 0).expect("failed to split"));
    });

    group.bench_function("lines/newline", |b| {
        b.iter(|| buffer.lines(b"\n").expect("failed to lines").count());
    });

    group.bench_function("bytes/sum", |b| {
        b.iter(|| {
            buffer
                .bytes()
                .expect("failed to bytes")
                .map(u64::from)
                .sum::<u64>()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_index, bench_split_and_lines);
criterion_main!(benches);
