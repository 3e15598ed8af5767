use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::chunker::{Chunk, SectionChunker};
use crate::error::{IndexError, IndexResult};
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::metadata::{sha256_file, DocumentMeta, ExtractionQuality, MetadataExtractor};

/// Corpus-wide counters, updated monotonically as documents are
/// processed and read-only once the pass completes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    /// All PDF files found in the corpus directory, including skipped ones.
    pub total_documents: usize,
    /// Documents actually run through extraction (skip-set members excluded).
    pub processed: usize,
    pub empty_text: usize,
    pub low_text: usize,
    pub total_chunks: usize,
}

/// Everything one pipeline pass produces: chunks in emission order,
/// document metadata in processing order, and the counters.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub chunks: Vec<Chunk>,
    pub documents: Vec<DocumentMeta>,
    pub stats: CorpusStats,
}

/// Sequential corpus pipeline: discovers PDFs sorted by filename and,
/// one document at a time, extracts text, derives metadata, classifies
/// extraction quality, and chunks whatever is usable. One failing
/// document never aborts the run.
pub struct Pipeline<E: TextExtractor> {
    extractor: E,
    metadata: MetadataExtractor,
    chunker: SectionChunker,
}

impl Pipeline<PdfTextExtractor> {
    pub fn new(chunker: SectionChunker) -> Self {
        Self::with_extractor(PdfTextExtractor, chunker)
    }
}

impl<E: TextExtractor> Pipeline<E> {
    pub fn with_extractor(extractor: E, chunker: SectionChunker) -> Self {
        Self {
            extractor,
            metadata: MetadataExtractor::new(),
            chunker,
        }
    }

    /// Process every PDF under `corpus_dir`, excluding filenames in
    /// `skip`. Returns an error only for corpus-level conditions (the
    /// directory does not exist); per-document failures degrade to
    /// `empty` extraction quality.
    pub fn run(&self, corpus_dir: &Path, skip: &HashSet<String>) -> IndexResult<PipelineOutput> {
        if !corpus_dir.is_dir() {
            return Err(IndexError::CorpusDirNotFound(
                corpus_dir.display().to_string(),
            ));
        }

        let pdfs = discover_pdfs(corpus_dir);
        info!(count = pdfs.len(), dir = %corpus_dir.display(), "found PDFs");

        let mut out = PipelineOutput::default();
        out.stats.total_documents = pdfs.len();

        for (i, path) in pdfs.iter().enumerate() {
            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            if skip.contains(&filename) {
                info!(n = i + 1, total = pdfs.len(), %filename, "skipping (skip list)");
                continue;
            }
            debug!(n = i + 1, total = pdfs.len(), %filename, "processing");

            out.stats.processed += 1;
            let (meta, chunks) = self.process_document(path, &filename, &mut out.stats);
            out.stats.total_chunks += chunks.len();
            out.chunks.extend(chunks);
            out.documents.push(meta);
        }

        let counted: usize = out.documents.iter().map(|d| d.chunk_count).sum();
        debug_assert_eq!(counted, out.chunks.len(), "chunk accounting drifted");

        Ok(out)
    }

    /// Process a single document. Infallible: extraction trouble is
    /// already absorbed by the extractor, and file-level facts degrade
    /// to defaults with a warning.
    fn process_document(
        &self,
        path: &Path,
        filename: &str,
        stats: &mut CorpusStats,
    ) -> (DocumentMeta, Vec<Chunk>) {
        let doc_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let extracted = self.extractor.extract(path);
        let parsed = self.metadata.parse(&extracted.text);

        let sha256 = match sha256_file(path) {
            Ok(h) => h,
            Err(e) => {
                warn!(%filename, error = %e, "failed to hash file");
                String::new()
            }
        };
        let bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let quality = ExtractionQuality::classify(&extracted.text);
        match quality {
            ExtractionQuality::Empty => stats.empty_text += 1,
            ExtractionQuality::Low => stats.low_text += 1,
            ExtractionQuality::Ok => {}
        }

        let chunks = if quality == ExtractionQuality::Empty {
            Vec::new()
        } else {
            let mut chunks = self.chunker.chunk(&extracted.text);
            for chunk in &mut chunks {
                chunk.doc_id = doc_id.clone();
                chunk.filename = filename.to_string();
                chunk.title = parsed.title.clone();
                chunk.year = parsed.year;
            }
            chunks
        };

        let meta = DocumentMeta {
            doc_id,
            filename: filename.to_string(),
            sha256,
            bytes,
            pages: extracted.pages,
            title: parsed.title,
            year: parsed.year,
            doi: parsed.doi,
            extraction_quality: quality,
            chunk_count: chunks.len(),
        };
        (meta, chunks)
    }
}

/// Top-level `*.pdf` files under `dir`, sorted by filename for stable
/// output ordering.
fn discover_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    pdfs
}
