//! The document pipeline: fan out, process, aggregate.
//!
//! One document's journey is strictly sequential — ingest, strip
//! boilerplate, re-segment, optionally retrieve — but documents are
//! independent of each other, so the [`Pipeline`] runs each one as its own
//! task on a bounded worker pool:
//!
//! ```text
//!                 +-> [ingest -> strip -> resegment -> retrieve] -> ok(report)
//! documents ------+-> [ingest -> strip -> resegment -> retrieve] -> ok(report)
//!   (N tasks)     +-> [ingest -> strip -> ...        x failed  ] -> err(source)
//!                 +-> [ingest -> strip -> resegment -> retrieve] -> ok(report)
//!                                                                      |
//!                                     completion order --> PipelineReport
//! ```
//!
//! Failures stay where they happen: a document that cannot be parsed,
//! segmented, or retrieved is recorded in the report with its source id
//! and never cancels its siblings. The pool is sized
//! `min(available_parallelism, documents)` unless overridden.
//!
//! Aggregation order across documents is completion order, which can vary
//! between runs. Callers needing stable output sort by source and
//! locator.

use std::sync::mpsc;

use tracing::{info, warn};

use crate::boilerplate::BoilerplateFilter;
use crate::chunk::{Chunk, ImageSource};
use crate::chunker::{Chunker, IngestStats, Strategy};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::retrieve::{KeyTopic, Retriever};
use crate::RankedTerm;

/// Everything one document produced.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    /// Source id the document was submitted under.
    pub source: String,
    /// Final chunks: key chunks when a retriever is configured, otherwise
    /// the re-segmented chunks.
    pub chunks: Vec<Chunk>,
    /// Image references, passed through untouched.
    pub images: Vec<ImageSource>,
    /// Ranked key topics; empty when no retriever is configured.
    pub topics: Vec<RankedTerm>,
    /// Extraction counters from ingestion.
    pub stats: IngestStats,
}

/// A document that failed, with the error that stopped it.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source id the document was submitted under.
    pub source: String,
    /// What went wrong.
    pub error: Error,
}

/// Aggregated outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Per-document outputs, in completion order.
    pub documents: Vec<DocumentOutput>,
    /// Documents that failed, with their errors; siblings are unaffected.
    pub failures: Vec<DocumentFailure>,
}

impl PipelineReport {
    /// Whether every document succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// All chunks across all documents, flattened in completion order.
    pub fn all_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.documents.iter().flat_map(|d| d.chunks.iter())
    }

    /// All image references across all documents.
    pub fn all_images(&self) -> impl Iterator<Item = &ImageSource> + '_ {
        self.documents.iter().flat_map(|d| d.images.iter())
    }

    /// The output of one document, by source id.
    #[must_use]
    pub fn by_source(&self, source: &str) -> Option<&DocumentOutput> {
        self.documents.iter().find(|d| d.source == source)
    }

    /// Source ids of the documents that failed.
    pub fn failed_sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.failures.iter().map(|f| f.source.as_str())
    }
}

/// Runs documents through ingest → boilerplate filter → re-segmentation →
/// optional retrieval on a worker pool.
///
/// ```rust
/// use std::sync::Arc;
/// use quarry::testing::HashEmbedder;
/// use quarry::{
///     Chunker, ContentItem, Document, Page, Pipeline, Retriever, StopWords, Strategy,
///     TfIdfScorer, Tokenizer,
/// };
///
/// let retriever = Retriever::new(
///     Arc::new(HashEmbedder::new(64)),
///     Arc::new(TfIdfScorer::new(Tokenizer::new(), StopWords::english())),
/// )
/// .with_num_topics(3);
///
/// let pipeline = Pipeline::new(Chunker::new(Tokenizer::new(), 2), Strategy::Sentence)
///     .with_retriever(retriever);
///
/// let report = pipeline.run(vec![(
///     "mission.pdf".to_owned(),
///     Document::new(
///         "pdf",
///         vec![Page::new(
///             1,
///             vec![ContentItem::text(
///                 "Gravity assists save fuel. Launch windows repeat every cycle.",
///             )],
///         )],
///     ),
/// )])?;
///
/// assert!(report.is_success());
/// let output = report.by_source("mission.pdf").unwrap();
/// assert!(!output.chunks.is_empty());
/// assert!(!output.topics.is_empty());
/// # Ok::<(), quarry::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    chunker: Chunker,
    filter: BoilerplateFilter,
    strategy: Strategy,
    retriever: Option<Retriever>,
    workers: Option<usize>,
}

impl Pipeline {
    /// Create a pipeline from a chunker and a re-segmentation strategy,
    /// with the default boilerplate filter and no retriever.
    #[must_use]
    pub fn new(chunker: Chunker, strategy: Strategy) -> Self {
        Self {
            chunker,
            filter: BoilerplateFilter::default(),
            strategy,
            retriever: None,
            workers: None,
        }
    }

    /// Replace the boilerplate filter.
    #[must_use]
    pub fn with_boilerplate(mut self, filter: BoilerplateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Run retrieval after re-segmentation, turning each document's
    /// output into its key chunks.
    #[must_use]
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Override the worker count. Still clamped to the document count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Process documents in parallel and aggregate the results.
    ///
    /// # Errors
    ///
    /// Returns the strategy's configuration error without starting any
    /// work (shared config, so it would fail every document identically),
    /// or [`Error::WorkerPool`] if the pool cannot be built. Per-document
    /// failures do not surface here; they are recorded in the report.
    pub fn run(&self, documents: Vec<(String, Document)>) -> Result<PipelineReport> {
        self.execute(
            documents
                .into_iter()
                .map(|(source, document)| (source, Ok(document)))
                .collect(),
        )
    }

    /// Like [`run`](Self::run), but parses each document from extractor
    /// JSON. A document that fails to parse is recorded as that source's
    /// failure; siblings proceed.
    ///
    /// # Errors
    ///
    /// Same run-level errors as [`run`](Self::run).
    pub fn run_json(&self, documents: Vec<(String, String)>) -> Result<PipelineReport> {
        self.execute(
            documents
                .into_iter()
                .map(|(source, json)| (source, Document::from_json(&json)))
                .collect(),
        )
    }

    fn execute(&self, documents: Vec<(String, Result<Document>)>) -> Result<PipelineReport> {
        self.strategy.validate()?;
        if documents.is_empty() {
            return Ok(PipelineReport::default());
        }

        let workers = self.worker_count(documents.len());
        info!(
            documents = documents.len(),
            workers,
            strategy = %self.strategy,
            retrieve = self.retriever.is_some(),
            "pipeline run starting"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        for (source, parsed) in documents {
            let stage = self.clone();
            let tx = tx.clone();
            pool.spawn(move || {
                let outcome = parsed.and_then(|document| stage.process(&source, &document));
                // The receiver outlives every task; send only fails if the
                // run was abandoned, and then there is nobody to tell.
                let _ = tx.send((source, outcome));
            });
        }
        drop(tx);

        let mut report = PipelineReport::default();
        for (source, outcome) in rx {
            match outcome {
                Ok(output) => report.documents.push(output),
                Err(error) => {
                    warn!(source = %source, %error, "document failed; siblings continue");
                    report.failures.push(DocumentFailure { source, error });
                }
            }
        }

        info!(
            succeeded = report.documents.len(),
            failed = report.failures.len(),
            "pipeline run complete"
        );
        Ok(report)
    }

    /// One document, start to finish, on the calling thread.
    fn process(&self, source: &str, document: &Document) -> Result<DocumentOutput> {
        let ingestion = self.chunker.ingest(source, document);
        let stats = ingestion.stats;
        let images = ingestion.images;

        let chunks = self.filter.strip(ingestion.chunks);
        let chunks = self.chunker.resegment(chunks, &self.strategy)?;

        let (chunks, topics) = match &self.retriever {
            Some(retriever) => {
                let retrieval = retriever.extract_key_chunks(chunks)?;
                let topics = retrieval.topics().iter().map(KeyTopic::as_ranked).collect();
                (retrieval.into_key_chunks(), topics)
            }
            None => (chunks, Vec::new()),
        };

        Ok(DocumentOutput {
            source: source.to_owned(),
            chunks,
            images,
            topics,
            stats,
        })
    }

    fn worker_count(&self, documents: usize) -> usize {
        let available = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        self.workers.unwrap_or(available).min(documents).max(1)
    }
}
