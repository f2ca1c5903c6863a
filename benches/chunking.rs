//! Benchmarks for ingestion, re-segmentation, and retrieval.

use std::sync::Arc;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use quarry::testing::HashEmbedder;
use quarry::{
    BoilerplateFilter, Chunk, Chunker, ContentItem, Document, Locator, Page, Retriever,
    SourceKind, StopWords, Strategy, TfIdfScorer, Tokenizer,
};

const SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog. ",
    "Pack my box with five dozen liquor jugs. ",
    "How vexingly quick daft zebras jump! ",
    "The five boxing wizards jump quickly. ",
    "Sphinx of black quartz, judge my vow. ",
];

/// Page-sized chunks (~400 bytes each) totalling roughly `size` bytes.
fn sample_chunks(size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut page = 1u32;
    let mut text = String::new();
    let mut produced = 0usize;
    let mut i = 0usize;
    while produced < size {
        text.push_str(SENTENCES[i % SENTENCES.len()]);
        i += 1;
        if text.len() >= 400 {
            produced += text.len();
            chunks.push(Chunk::new(
                "bench.pdf",
                SourceKind::Document,
                Locator::page(page),
                text.trim_end(),
            ));
            page += 1;
            text.clear();
        }
    }
    if !text.trim().is_empty() {
        chunks.push(Chunk::new(
            "bench.pdf",
            SourceKind::Document,
            Locator::page(page),
            text.trim_end(),
        ));
    }
    chunks
}

/// One-sentence fragments, the shape merge-small exists for.
fn fragment_chunks(size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut produced = 0usize;
    let mut i = 0usize;
    while produced < size {
        let sentence = SENTENCES[i % SENTENCES.len()];
        produced += sentence.len();
        chunks.push(Chunk::new(
            "bench.pdf",
            SourceKind::Document,
            Locator::page(i as u32 + 1),
            sentence.trim_end(),
        ));
        i += 1;
    }
    chunks
}

/// A document of ~400-byte pages totalling roughly `size` bytes.
fn sample_document(size: usize) -> Document {
    Document::new(
        "pdf",
        sample_chunks(size)
            .into_iter()
            .map(|chunk| Page::new(chunk.locator.start, vec![ContentItem::text(chunk.text)]))
            .collect(),
    )
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [1_000, 10_000, 100_000] {
        let document = sample_document(size);
        let chunker = Chunker::new(Tokenizer::new(), 5);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("ingest", size), &document, |b, document| {
            b.iter(|| chunker.ingest(black_box("bench.pdf"), black_box(document)));
        });
    }

    group.finish();
}

fn bench_sentence(c: &mut Criterion) {
    let mut group = c.benchmark_group("sentence");

    for size in [1_000, 10_000, 100_000] {
        let chunks = sample_chunks(size);
        let chunker = Chunker::new(Tokenizer::new(), 3);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("sentence", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| chunker.resegment(chunks, &Strategy::Sentence).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("windows");

    for size in [1_000, 10_000, 100_000] {
        let chunks = sample_chunks(size);
        let chunker = Chunker::new(Tokenizer::new(), 3);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("fixed", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| {
                    chunker
                        .resegment(chunks, &Strategy::FixedWindow { window_size: 50 })
                        .unwrap()
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("sliding", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| {
                    chunker
                        .resegment(
                            chunks,
                            &Strategy::SlidingWindow {
                                window_size: 50,
                                overlap: 10,
                            },
                        )
                        .unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_merge_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_small");

    for size in [1_000, 10_000, 100_000] {
        let chunks = fragment_chunks(size);
        let chunker = Chunker::new(Tokenizer::new(), 40);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("merge", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| chunker.resegment(chunks, &Strategy::MergeSmall).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_recursive(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive");

    for size in [1_000, 10_000, 100_000] {
        let chunks = sample_chunks(size);
        let chunker = Chunker::new(Tokenizer::new(), 3);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("recursive", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| {
                    chunker
                        .resegment(chunks, &Strategy::recursive(500, 100))
                        .unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_boilerplate(c: &mut Criterion) {
    let mut group = c.benchmark_group("boilerplate");

    for size in [1_000, 10_000, 100_000] {
        // Interleave a recurring footer chunk with the content chunks.
        let mut chunks = Vec::new();
        for chunk in sample_chunks(size) {
            let page = chunk.locator.start;
            chunks.push(chunk);
            chunks.push(Chunk::new(
                "bench.pdf",
                SourceKind::Document,
                Locator::page(page),
                "Confidential Draft Footer",
            ));
        }
        let filter = BoilerplateFilter::default();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("strip", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| filter.strip(chunks),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_retrieval(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieval");

    for size in [1_000, 10_000, 100_000] {
        let chunks = sample_chunks(size);
        let retriever = Retriever::new(
            Arc::new(HashEmbedder::new(64)),
            Arc::new(TfIdfScorer::new(Tokenizer::new(), StopWords::english())),
        );

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("extract", size), &chunks, |b, chunks| {
            b.iter_batched(
                || chunks.clone(),
                |chunks| retriever.extract_key_chunks(chunks).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ingest,
    bench_sentence,
    bench_windows,
    bench_merge_small,
    bench_recursive,
    bench_boilerplate,
    bench_retrieval
);
criterion_main!(benches);
