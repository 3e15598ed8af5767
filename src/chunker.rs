use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ChunkingConfig, SectionVocabulary};

/// Sentinel section label before any header has been seen.
pub const DEFAULT_SECTION: &str = "document";

/// A bounded span of document text, the atomic unit for embedding and
/// retrieval. `chunk_id` is sequential within the owning document; the
/// `doc_id`/`filename`/`title`/`year` stamps are applied by the pipeline
/// after chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: usize,
    pub text: String,
    pub section: String,
    pub char_count: usize,
    pub token_estimate: usize,
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
}

/// Estimate token count as character count / 4. An approximation used
/// only for chunk sizing, not a real tokenizer.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Pending chunker state: paragraphs awaiting emission, their running
/// token estimate, and the section label they fall under.
struct Accumulator {
    paragraphs: Vec<String>,
    tokens: usize,
    section: String,
    next_id: usize,
    emitted: Vec<Chunk>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            tokens: 0,
            section: DEFAULT_SECTION.to_string(),
            next_id: 0,
            emitted: Vec::new(),
        }
    }

    fn push(&mut self, paragraph: &str, tokens: usize) {
        self.paragraphs.push(paragraph.to_string());
        self.tokens += tokens;
    }

    /// Emit the pending paragraphs as one chunk, then seed the next
    /// accumulator with whole trailing paragraphs within the overlap
    /// budget. Pending content below half the minimum size is discarded
    /// without emitting; the section label is left untouched either way.
    fn flush(&mut self, config: &ChunkingConfig) {
        if self.tokens < config.min_tokens / 2 {
            if !self.paragraphs.is_empty() {
                debug!(
                    tokens = self.tokens,
                    section = %self.section,
                    "discarding sub-minimum trailing content"
                );
            }
            self.paragraphs.clear();
            self.tokens = 0;
            return;
        }

        let text = self.paragraphs.join("\n\n");
        let char_count = text.chars().count();
        self.emitted.push(Chunk {
            chunk_id: self.next_id,
            text,
            section: self.section.clone(),
            char_count,
            token_estimate: char_count / 4,
            doc_id: String::new(),
            filename: String::new(),
            title: String::new(),
            year: None,
        });
        self.next_id += 1;

        // Carry whole trailing paragraphs into the next chunk, newest
        // first, stopping at the first one that would exceed the budget.
        let mut overlap: Vec<String> = Vec::new();
        let mut overlap_tokens = 0;
        for para in self.paragraphs.iter().rev() {
            let para_tokens = estimate_tokens(para);
            if overlap_tokens + para_tokens <= config.overlap_tokens {
                overlap.insert(0, para.clone());
                overlap_tokens += para_tokens;
            } else {
                break;
            }
        }
        self.paragraphs = overlap;
        self.tokens = overlap_tokens;
    }
}

/// Section-aware chunker for academic / policy documents.
///
/// Splits on paragraph boundaries, respects section headers, and keeps
/// paragraph-granularity overlap between consecutive chunks. Deterministic
/// for identical input and configuration.
pub struct SectionChunker {
    vocabulary: SectionVocabulary,
    config: ChunkingConfig,
    squeeze_newlines: Regex,
    squeeze_spaces: Regex,
}

impl SectionChunker {
    pub fn new(vocabulary: SectionVocabulary, config: ChunkingConfig) -> Self {
        Self {
            vocabulary,
            config,
            squeeze_newlines: Regex::new(r"\n{3,}").expect("valid literal pattern"),
            squeeze_spaces: Regex::new(r"[ \t]+").expect("valid literal pattern"),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SectionVocabulary::academic(), ChunkingConfig::default())
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk a document's extracted text into an ordered chunk sequence.
    ///
    /// A document with no paragraphs yields zero chunks. A single
    /// paragraph larger than the target budget is still emitted whole;
    /// the chunker never splits inside a paragraph.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let text = self.squeeze_newlines.replace_all(text, "\n\n");
        let text = self.squeeze_spaces.replace_all(&text, " ");

        let mut acc = Accumulator::new();

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }

            let para_tokens = estimate_tokens(paragraph);
            let first_line = paragraph.lines().next().unwrap_or(paragraph);

            // Only a paragraph's first line can open a section; flushing
            // before the label change keeps a header with its own content.
            if self.vocabulary.is_header(first_line) {
                if acc.tokens >= self.config.min_tokens {
                    acc.flush(&self.config);
                }
                acc.section = first_line.trim().to_string();
            }

            acc.push(paragraph, para_tokens);

            if acc.tokens >= self.config.target_tokens {
                acc.flush(&self.config);
            }
        }

        acc.flush(&self.config);
        acc.emitted
    }
}
