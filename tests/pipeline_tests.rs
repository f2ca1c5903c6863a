//! End-to-end pipeline tests.
//!
//! These tests run whole documents through ingest, boilerplate removal,
//! re-segmentation, and retrieval, and verify the batch semantics:
//! per-document failure isolation, stable per-source output, and the
//! documented validity and boilerplate thresholds.

use std::sync::Arc;

use quarry::testing::{HashEmbedder, StaticScorer};
use quarry::{
    CapabilityError, Chunker, ContentItem, Document, Embedder, Error, Page, Pipeline, Retriever,
    SourceKind, StopWords, Strategy, TfIdfScorer, Tokenizer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One page per text block.
fn paged(texts: &[&str]) -> Document {
    Document::new(
        "pdf",
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Page::new(i as u32 + 1, vec![ContentItem::text(*text)]))
            .collect(),
    )
}

/// An embedder that refuses any batch mentioning the marker word.
struct PoisonEmbedder {
    inner: HashEmbedder,
}

impl PoisonEmbedder {
    fn new() -> Self {
        Self {
            inner: HashEmbedder::new(16),
        }
    }
}

impl Embedder for PoisonEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        if texts.iter().any(|t| t.contains("poison")) {
            return Err("refusing poisoned batch".into());
        }
        self.inner.embed_batch(texts)
    }
}

// =============================================================================
// Validity Threshold
// =============================================================================

#[test]
fn window_output_below_threshold_is_dropped() {
    let pipeline = Pipeline::new(
        Chunker::new(Tokenizer::new(), 5),
        Strategy::FixedWindow { window_size: 5 },
    );
    let report = pipeline
        .run(vec![("six.pdf".to_owned(), paged(&["a b c d e f"]))])
        .unwrap();

    // Six tokens cut at five: the full window survives, the one-token
    // remainder does not.
    let output = report.by_source("six.pdf").unwrap();
    let texts: Vec<&str> = output.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["a b c d e"]);
}

#[test]
fn threshold_above_document_size_empties_it_without_failing() {
    let pipeline = Pipeline::new(
        Chunker::new(Tokenizer::new(), 10),
        Strategy::FixedWindow { window_size: 10 },
    );
    let report = pipeline
        .run(vec![("six.pdf".to_owned(), paged(&["a b c d e f"]))])
        .unwrap();

    assert!(report.is_success());
    let output = report.by_source("six.pdf").unwrap();
    assert!(output.chunks.is_empty());
    assert_eq!(output.stats.text_blocks, 1);
}

// =============================================================================
// Boilerplate Threshold
// =============================================================================

const FOOTER: &str = "Confidential Draft Footer";

#[test]
fn footer_on_three_pages_survives_default_threshold() {
    let document = Document::new(
        "pdf",
        (1..=3)
            .map(|n| {
                Page::new(
                    n,
                    vec![
                        ContentItem::text(format!("Page {n} carries real content here.")),
                        ContentItem::text(FOOTER),
                    ],
                )
            })
            .collect(),
    );

    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Sentence);
    let report = pipeline.run(vec![("three.pdf".to_owned(), document)]).unwrap();

    let output = report.by_source("three.pdf").unwrap();
    let footers = output.chunks.iter().filter(|c| c.text == FOOTER).count();
    assert_eq!(footers, 3, "three occurrences sit exactly at the threshold");
}

#[test]
fn footer_on_four_pages_is_removed_everywhere() {
    let document = Document::new(
        "pdf",
        (1..=4)
            .map(|n| {
                Page::new(
                    n,
                    vec![
                        ContentItem::text(format!("Page {n} carries real content here.")),
                        ContentItem::text(FOOTER),
                    ],
                )
            })
            .collect(),
    );

    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Sentence);
    let report = pipeline.run(vec![("four.pdf".to_owned(), document)]).unwrap();

    let output = report.by_source("four.pdf").unwrap();
    assert!(output.chunks.iter().all(|c| !c.text.contains(FOOTER)));
    // The emptied footer chunks are gone too, not kept as husks.
    assert_eq!(output.chunks.len(), 4);
}

// =============================================================================
// Retrieval End to End
// =============================================================================

#[test]
fn greedy_selection_bounds_hold_end_to_end() {
    init_tracing();

    let texts: Vec<String> = [
        "granite quarries produce dimension stone for monuments",
        "limestone burns down to quicklime in the kiln",
        "marble takes a polish that granite never will",
        "sandstone weathers fastest of the building stones",
        "slate cleaves into thin roofing sheets",
        "gneiss shows banding from regional metamorphism",
        "basalt columns form as lava cools and contracts",
        "obsidian fractures into edges sharper than steel",
        "pumice floats because gas bubbles never escaped",
        "tuff is volcanic ash welded into soft rock",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();

    let retriever = Retriever::new(
        Arc::new(HashEmbedder::new(48)),
        Arc::new(TfIdfScorer::new(Tokenizer::new(), StopWords::english())),
    )
    .with_num_topics(2)
    .with_chunks_per_topic(3);

    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 3), Strategy::Identity)
        .with_retriever(retriever);

    let document = paged(&texts.iter().map(String::as_str).collect::<Vec<_>>());
    let report = pipeline.run(vec![("rocks.pdf".to_owned(), document)]).unwrap();

    let output = report.by_source("rocks.pdf").unwrap();
    // Two topics, three claims each, ten candidates: exactly six survive.
    assert_eq!(output.chunks.len(), 6);
    assert_eq!(output.topics.len(), 2);

    let mut seen: Vec<&str> = output.chunks.iter().map(|c| c.text.as_str()).collect();
    seen.sort_unstable();
    let before = seen.len();
    seen.dedup();
    assert_eq!(seen.len(), before, "a chunk was selected twice");
}

#[test]
fn retrieval_claims_whole_arena_when_topics_allow() {
    let retriever = Retriever::new(
        Arc::new(HashEmbedder::new(32)),
        Arc::new(StaticScorer::new(["alpha", "beta"])),
    );

    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Identity)
        .with_retriever(retriever);

    let texts: Vec<String> = (1..=10).map(|i| format!("chunk body number {i}")).collect();
    let document = paged(&texts.iter().map(String::as_str).collect::<Vec<_>>());
    let report = pipeline.run(vec![("all.pdf".to_owned(), document)]).unwrap();

    // Two topics at the default five per topic cover all ten chunks.
    assert_eq!(report.by_source("all.pdf").unwrap().chunks.len(), 10);
}

// =============================================================================
// Failure Isolation
// =============================================================================

#[test]
fn failed_document_does_not_poison_the_batch() {
    init_tracing();

    let retriever = Retriever::new(
        Arc::new(PoisonEmbedder::new()),
        Arc::new(StaticScorer::new(["body"])),
    );
    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Identity)
        .with_retriever(retriever)
        .with_workers(3);

    let report = pipeline
        .run(vec![
            ("a.pdf".to_owned(), paged(&["clean body text one"])),
            ("b.pdf".to_owned(), paged(&["poison body text two"])),
            ("c.pdf".to_owned(), paged(&["clean body text three"])),
        ])
        .unwrap();

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failed_sources().collect::<Vec<_>>(), ["b.pdf"]);
    assert!(matches!(report.failures[0].error, Error::Embedding(_)));

    // The survivors are complete, not truncated by the sibling failure.
    assert!(!report.by_source("a.pdf").unwrap().chunks.is_empty());
    assert!(!report.by_source("c.pdf").unwrap().chunks.is_empty());
}

#[test]
fn malformed_json_is_isolated_per_source() {
    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Identity)
        .with_workers(2);

    let report = pipeline
        .run_json(vec![
            (
                "good.json".to_owned(),
                r#"{"type": "pdf", "pages": [{"page_number": 1, "content": [
                    {"type": "text", "text": "parses and chunks fine"}
                ]}]}"#
                    .to_owned(),
            ),
            ("bad.json".to_owned(), "{ definitely not json".to_owned()),
            (
                "also-good.json".to_owned(),
                r#"{"type": "pptx", "pages": [{"page_number": 1, "content": [
                    {"type": "text", "text": "slides parse as well"}
                ]}]}"#
                    .to_owned(),
            ),
        ])
        .unwrap();

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.failed_sources().collect::<Vec<_>>(), ["bad.json"]);
    assert!(matches!(report.failures[0].error, Error::Document(_)));
    assert_eq!(
        report.by_source("also-good.json").unwrap().chunks[0].kind,
        SourceKind::Slide
    );
}

// =============================================================================
// Extractor JSON Contract
// =============================================================================

#[test]
fn extractor_json_with_images_and_ocr() {
    let json = r#"{
        "type": "pdf",
        "pages": [
            {
                "page_number": 1,
                "content": [
                    {"type": "text", "text": "Introduction with plain body text."},
                    {"type": "image", "image_path": "/tmp/fig1.png", "ocr_text": "ocr caption from figure one"}
                ]
            },
            {
                "page_number": 2,
                "content": [
                    {"type": "image", "image_path": "/tmp/fig2.png"}
                ]
            }
        ]
    }"#;

    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Identity);
    let report = pipeline
        .run_json(vec![("paper.json".to_owned(), json.to_owned())])
        .unwrap();

    let output = report.by_source("paper.json").unwrap();
    let texts: Vec<&str> = output.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Introduction with plain body text.",
            "ocr caption from figure one"
        ]
    );
    assert_eq!(output.images.len(), 2);
    assert_eq!(output.images[1].page, 2);
    assert_eq!(output.stats.ocr_text_blocks, 1);
}

#[test]
fn images_only_document_is_empty_but_successful() {
    let document = Document::new(
        "pdf",
        vec![
            Page::new(1, vec![ContentItem::image("/tmp/a.png")]),
            Page::new(2, vec![ContentItem::image("/tmp/b.png")]),
        ],
    );

    // A retriever is configured, but an empty chunk list never reaches it.
    let retriever = Retriever::new(
        Arc::new(HashEmbedder::new(16)),
        Arc::new(StaticScorer::new(["unused"])),
    );
    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Sentence)
        .with_retriever(retriever);

    let report = pipeline
        .run(vec![("scans.pdf".to_owned(), document)])
        .unwrap();

    assert!(report.is_success());
    let output = report.by_source("scans.pdf").unwrap();
    assert!(output.chunks.is_empty());
    assert!(output.topics.is_empty());
    assert_eq!(output.images.len(), 2);
    assert_eq!(output.stats.pages, 2);
    assert_eq!(output.stats.text_blocks, 0);
}

// =============================================================================
// Batch Consistency
// =============================================================================

#[test]
fn per_source_output_is_stable_across_parallel_runs() {
    let documents: Vec<(String, Document)> = (0..6)
        .map(|i| {
            (
                format!("doc-{i}.pdf"),
                paged(&[
                    "First sentence of real content. Second sentence follows it.",
                    "Another page with its own words entirely.",
                ]),
            )
        })
        .collect();

    let make = || {
        Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Sentence).with_workers(4)
    };

    let first = make().run(documents.clone()).unwrap();
    let second = make().run(documents).unwrap();

    assert_eq!(first.documents.len(), 6);
    for output in &first.documents {
        let twin = second.by_source(&output.source).unwrap();
        assert_eq!(output.chunks, twin.chunks, "{} drifted", output.source);
        assert_eq!(output.stats, twin.stats);
    }
}

#[test]
fn empty_batch_is_a_trivial_success() {
    let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Identity);
    let report = pipeline.run(vec![]).unwrap();
    assert!(report.is_success());
    assert_eq!(report.all_chunks().count(), 0);
    assert_eq!(report.all_images().count(), 0);
}
