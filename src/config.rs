use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token budgets for the section-aware chunker.
///
/// Token counts are estimates (1 token ~ 4 characters), not tokenizer output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Flush the accumulator once it reaches this many estimated tokens.
    pub target_tokens: usize,
    /// Budget for whole-paragraph carry-over between consecutive chunks.
    pub overlap_tokens: usize,
    /// A section header only forces a flush once this many tokens are
    /// pending; half this value is the emission floor for any chunk.
    pub min_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_tokens: 800,
            overlap_tokens: 100,
            min_tokens: 200,
        }
    }
}

/// Embedding collaborator configuration, echoed into the build report
/// for provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dim: usize,
    pub fp16: bool,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "intfloat/e5-large-v2".to_string(),
            dim: 1024,
            fp16: true,
            batch_size: 1300,
        }
    }
}

// Section markers for academic / policy papers. Matched case-insensitively
// against the first line of a paragraph, anchored at the start.
const ACADEMIC_MARKERS: &[&str] = &[
    r"^abstract\s*$",
    r"^introduction\s*$",
    r"^background\s*$",
    r"^literature\s+review\s*$",
    r"^data\s*$",
    r"^data\s+and\s+methods?\s*$",
    r"^methods?\s*$",
    r"^methodology\s*$",
    r"^model\s*$",
    r"^theoretical\s+framework\s*$",
    r"^empirical\s+(strategy|approach|analysis)\s*$",
    r"^results?\s*$",
    r"^findings?\s*$",
    r"^discussion\s*$",
    r"^conclusions?\s*$",
    r"^policy\s+implications?\s*$",
    r"^references?\s*$",
    r"^bibliography\s*$",
    r"^appendix\s*",
    r"^\d+\.\s+\w+",
];

/// The set of section-header patterns the chunker recognizes.
///
/// Held as a value and passed into the chunker at construction time, so
/// alternate vocabularies (non-English corpora, non-academic documents)
/// can be swapped in without touching chunker internals.
#[derive(Debug, Clone)]
pub struct SectionVocabulary {
    patterns: Vec<Regex>,
}

impl SectionVocabulary {
    /// Default vocabulary covering common academic / policy paper sections.
    pub fn academic() -> Self {
        Self::from_patterns(ACADEMIC_MARKERS)
            .expect("built-in section marker patterns are valid")
    }

    /// Build a vocabulary from raw patterns. Matching is case-insensitive.
    pub fn from_patterns(patterns: &[&str]) -> Result<Self, regex::Error> {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns: compiled })
    }

    /// Does this line (trimmed) look like a section header?
    pub fn is_header(&self, line: &str) -> bool {
        let line = line.trim();
        self.patterns.iter().any(|p| p.is_match(line))
    }
}

impl Default for SectionVocabulary {
    fn default() -> Self {
        Self::academic()
    }
}
