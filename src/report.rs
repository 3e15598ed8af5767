use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{ChunkingConfig, EmbeddingConfig};
use crate::pipeline::CorpusStats;

/// Final build statistics plus an integrity verification record.
/// Pure value construction; persisting it is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_timestamp: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub fp16: bool,
    pub batch_size: usize,
    pub chunking: ChunkingConfig,
    pub stats: ReportStats,
    pub integrity: Integrity,
    pub extraction_quality: QualityRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStats {
    pub pdf_count: usize,
    pub docs_indexed: usize,
    pub chunk_count: usize,
    pub vector_count: usize,
    pub empty_text_docs: usize,
    pub low_text_docs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrity {
    /// Chunk count, vector count, and indexed count all agree. A false
    /// here indicates a downstream bug (e.g. the embedding collaborator
    /// dropped items) and must never be silently ignored.
    pub alignment_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRates {
    pub empty_text_pct: f64,
    pub low_text_pct: f64,
}

impl BuildReport {
    pub fn generate(
        chunking: &ChunkingConfig,
        embedding: &EmbeddingConfig,
        stats: &CorpusStats,
        chunk_count: usize,
        vector_count: usize,
    ) -> Self {
        Self {
            build_timestamp: Utc::now().to_rfc3339(),
            embedding_model: embedding.model.clone(),
            embedding_dim: embedding.dim,
            fp16: embedding.fp16,
            batch_size: embedding.batch_size,
            chunking: *chunking,
            stats: ReportStats {
                pdf_count: stats.total_documents,
                docs_indexed: stats.processed,
                chunk_count,
                vector_count,
                empty_text_docs: stats.empty_text,
                low_text_docs: stats.low_text,
            },
            integrity: Integrity {
                alignment_verified: vector_count == chunk_count,
            },
            extraction_quality: QualityRates {
                empty_text_pct: percentage(stats.empty_text, stats.total_documents),
                low_text_pct: percentage(stats.low_text, stats.total_documents),
            },
        }
    }
}

/// Percentage of `part` in `whole`, rounded to 2 decimal places, with a
/// guard against an empty corpus.
fn percentage(part: usize, whole: usize) -> f64 {
    let raw = 100.0 * part as f64 / whole.max(1) as f64;
    (raw * 100.0).round() / 100.0
}
