// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the transformation engine in blattwerk-document.
// Runs the page-list operations and the PDF-rewriting ones over a synthetic
// 64-page document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use blattwerk_core::Operation;
use blattwerk_document::{Document, OperationParams, Page, apply};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 64 blank US Letter pages, round-tripped through PDF so every page points
/// into a real parsed source.
fn sample_document() -> Document {
    let blank = Document::from_pages(vec![Page::blank(612.0, 792.0); 64]);
    let bytes = blank.to_pdf_bytes().unwrap();
    Document::load(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_page_operations(c: &mut Criterion) {
    let doc = sample_document();
    let params = OperationParams::default();

    for op in [Operation::Delete, Operation::Crop, Operation::Sign] {
        c.bench_function(&format!("{op} (64 pages)"), |b| {
            b.iter(|| black_box(apply(black_box(&doc), op, &params).unwrap()));
        });
    }
}

fn bench_pdf_rewrite(c: &mut Criterion) {
    let doc = sample_document();
    let params = OperationParams::default();

    c.bench_function("compress (64 pages)", |b| {
        b.iter(|| black_box(apply(black_box(&doc), Operation::Compress, &params).unwrap()));
    });

    c.bench_function("save + load (64 pages)", |b| {
        b.iter(|| {
            let bytes = black_box(&doc).to_pdf_bytes().unwrap();
            black_box(Document::load(&bytes).unwrap());
        });
    });
}

criterion_group!(benches, bench_page_operations, bench_pdf_rewrite);
criterion_main!(benches);
