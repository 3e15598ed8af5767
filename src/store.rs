use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::chunker::Chunk;
use crate::error::IndexResult;
use crate::metadata::DocumentMeta;
use crate::report::BuildReport;

pub const CHUNKS_FILE: &str = "chunks.jsonl";
pub const METADATA_FILE: &str = "metadata.jsonl";
pub const REPORT_FILE: &str = "index_report.json";
pub const VECTORS_FILE: &str = "vectors.json";

/// Write records as JSONL: one self-describing record per line, in the
/// order given.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> IndexResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!(path = %path.display(), count = records.len(), "saved");
    Ok(())
}

/// Read the chunk store back, preserving emission order.
pub fn read_chunks(path: &Path) -> IndexResult<Vec<Chunk>> {
    read_jsonl(path)
}

/// Read the document-metadata store back, preserving processing order.
pub fn read_metadata(path: &Path) -> IndexResult<Vec<DocumentMeta>> {
    read_jsonl(path)
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> IndexResult<Vec<T>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

pub fn write_report(path: &Path, report: &BuildReport) -> IndexResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    info!(path = %path.display(), "saved");
    Ok(())
}

/// Load a skip list: one filename per line, blank lines ignored. A
/// missing file is not an error; it yields an empty set.
pub fn load_skip_list(path: &Path) -> IndexResult<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
