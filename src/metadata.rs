use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Coarse classification of how much usable text extraction recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionQuality {
    Empty,
    Low,
    Ok,
}

impl ExtractionQuality {
    /// Thresholds on trimmed text length: <100 chars is empty, <1000 low.
    pub fn classify(text: &str) -> Self {
        match text.trim().chars().count() {
            0..=99 => Self::Empty,
            100..=999 => Self::Low,
            _ => Self::Ok,
        }
    }
}

/// Per-document metadata record, one line per document in the metadata
/// store, in processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub doc_id: String,
    pub filename: String,
    pub sha256: String,
    pub bytes: u64,
    pub pages: usize,
    pub title: String,
    pub year: Option<u16>,
    pub doi: String,
    pub extraction_quality: ExtractionQuality,
    pub chunk_count: usize,
}

/// Best-effort title / year / DOI pulled from the first page of text.
/// All fields may legitimately be empty; callers must not assume they
/// are populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMetadata {
    pub title: String,
    pub year: Option<u16>,
    pub doi: String,
}

/// Regex-heuristic metadata layer. Never fails: absence of a signal
/// yields an empty field, malformed input yields defaults.
pub struct MetadataExtractor {
    year: Regex,
    doi: Regex,
    date_stamp: Regex,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            // 4-digit years in a plausible publication range (1950-2029).
            year: Regex::new(r"\b(19[5-9]\d|20[0-2]\d)\b").expect("valid literal pattern"),
            doi: Regex::new(r"(https?://doi\.org/\S+|10\.\d{4,}/\S+)")
                .expect("valid literal pattern"),
            date_stamp: Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{2,4}")
                .expect("valid literal pattern"),
        }
    }

    /// Parse metadata from a document's full extracted text. Only the
    /// first page is inspected: the text before the first form-feed
    /// marker, or the first 3000 characters when no marker is present.
    pub fn parse(&self, text: &str) -> ParsedMetadata {
        let first_page = first_page(text);
        let mut meta = ParsedMetadata::default();

        if let Some(cap) = self.year.captures(first_page) {
            meta.year = cap[1].parse::<u16>().ok();
        }

        if let Some(m) = self.doi.find(first_page) {
            meta.doi = m.as_str().to_string();
        }

        // Title heuristic: first substantial line that is not a date stamp.
        for line in first_page.lines() {
            let line = line.trim();
            if line.chars().count() > 20 && !self.date_stamp.is_match(line) {
                meta.title = truncate_chars(line, 200);
                break;
            }
        }

        meta
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn first_page(text: &str) -> &str {
    match text.find('\x0c') {
        Some(pos) => &text[..pos],
        None => match text.char_indices().nth(3000) {
            Some((pos, _)) => &text[..pos],
            None => text,
        },
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Streaming SHA-256 of a file's contents, hex-encoded.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
