use std::collections::HashSet;
use std::fs;
use std::path::Path;

use semindex::config::{ChunkingConfig, EmbeddingConfig, SectionVocabulary};
use semindex::extract::{ExtractedText, TextExtractor};
use semindex::metadata::ExtractionQuality;
use semindex::pipeline::PipelineOutput;
use semindex::report::BuildReport;
use semindex::store;
use semindex::{Pipeline, SectionChunker};
use tempfile::tempdir;

/// Test extractor that reads `.pdf` fixtures as plain text, so corpus
/// behavior can be exercised without real PDF binaries.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> ExtractedText {
        let text = fs::read_to_string(path).unwrap_or_default();
        let pages = if text.is_empty() {
            0
        } else {
            text.matches('\x0c').count() + 1
        };
        ExtractedText { text, pages }
    }
}

fn run_pipeline(corpus: &Path, skip: &HashSet<String>) -> PipelineOutput {
    let pipeline = Pipeline::with_extractor(PlainTextExtractor, SectionChunker::with_defaults());
    pipeline.run(corpus, skip).expect("pipeline run failed")
}

/// A well-extracted document: title line, year, and enough body text to
/// classify as `ok` and produce chunks.
fn ok_document() -> String {
    let body = "Labor market outcomes respond to policy changes in ways that \
        standard models only partially capture, and the magnitude varies across regions. "
        .repeat(12);
    format!(
        "The Employment Effects of Minimum Wages in Local Labor Markets\n\n\
         Working paper, 2021\n\nAbstract\n\n{body}\n\nIntroduction\n\n{body}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_corpus(dir: &Path) {
        fs::write(dir.join("paper1.pdf"), ok_document()).expect("write paper1");
        fs::write(dir.join("paper2.pdf"), "w".repeat(500)).expect("write paper2");
        fs::write(dir.join("paper3.pdf"), ok_document()).expect("write paper3");
        fs::write(dir.join("paper4.pdf"), "tiny").expect("write paper4");
        fs::write(dir.join("paper5.pdf"), ok_document()).expect("write paper5");
        // Non-PDF files are not part of the corpus.
        fs::write(dir.join("notes.txt"), "ignore me").expect("write notes");
    }

    #[test]
    fn skip_list_excludes_document_but_counts_it() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let skip: HashSet<String> = ["paper3.pdf".to_string()].into_iter().collect();
        let out = run_pipeline(dir.path(), &skip);

        assert_eq!(out.stats.total_documents, 5);
        assert_eq!(out.stats.processed, 4);
        assert_eq!(out.documents.len(), 4);
        assert!(out.documents.iter().all(|d| d.filename != "paper3.pdf"));
        assert!(out.chunks.iter().all(|c| c.doc_id != "paper3"));
    }

    #[test]
    fn chunk_counts_align_with_metadata() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let out = run_pipeline(dir.path(), &HashSet::new());
        let counted: usize = out.documents.iter().map(|d| d.chunk_count).sum();
        assert_eq!(counted, out.chunks.len());
        assert_eq!(out.stats.total_chunks, out.chunks.len());
    }

    #[test]
    fn extraction_quality_drives_chunking() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let out = run_pipeline(dir.path(), &HashSet::new());
        assert_eq!(out.stats.empty_text, 1);
        assert_eq!(out.stats.low_text, 1);

        let by_name = |name: &str| {
            out.documents
                .iter()
                .find(|d| d.filename == name)
                .unwrap_or_else(|| panic!("{name} missing"))
        };

        let empty = by_name("paper4.pdf");
        assert_eq!(empty.extraction_quality, ExtractionQuality::Empty);
        assert_eq!(empty.chunk_count, 0);

        // Low-quality text is still chunked.
        let low = by_name("paper2.pdf");
        assert_eq!(low.extraction_quality, ExtractionQuality::Low);
        assert!(low.chunk_count > 0);

        let ok = by_name("paper1.pdf");
        assert_eq!(ok.extraction_quality, ExtractionQuality::Ok);
        assert!(ok.chunk_count > 0);
    }

    #[test]
    fn chunks_are_stamped_with_document_fields() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let out = run_pipeline(dir.path(), &HashSet::new());
        let chunk = out
            .chunks
            .iter()
            .find(|c| c.doc_id == "paper1")
            .expect("paper1 produced no chunks");
        assert_eq!(chunk.filename, "paper1.pdf");
        assert_eq!(
            chunk.title,
            "The Employment Effects of Minimum Wages in Local Labor Markets"
        );
        assert_eq!(chunk.year, Some(2021));
    }

    #[test]
    fn documents_are_processed_in_filename_order() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let out = run_pipeline(dir.path(), &HashSet::new());
        let names: Vec<&str> = out.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "paper1.pdf",
                "paper2.pdf",
                "paper3.pdf",
                "paper4.pdf",
                "paper5.pdf"
            ]
        );
    }

    #[test]
    fn document_metadata_carries_file_facts() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());

        let out = run_pipeline(dir.path(), &HashSet::new());
        let doc = out
            .documents
            .iter()
            .find(|d| d.filename == "paper1.pdf")
            .expect("paper1 missing");
        assert_eq!(doc.doc_id, "paper1");
        assert_eq!(doc.sha256.len(), 64);
        assert!(doc.bytes > 0);
        assert_eq!(doc.pages, 1);
    }

    #[test]
    fn missing_corpus_directory_is_an_error() {
        let pipeline =
            Pipeline::with_extractor(PlainTextExtractor, SectionChunker::with_defaults());
        let err = pipeline
            .run(Path::new("/nonexistent/corpus"), &HashSet::new())
            .unwrap_err();
        assert!(err.to_string().contains("Corpus directory not found"));
    }

    #[test]
    fn empty_directory_yields_empty_output() {
        let dir = tempdir().expect("tempdir");
        let out = run_pipeline(dir.path(), &HashSet::new());
        assert_eq!(out.stats.total_documents, 0);
        assert!(out.chunks.is_empty());
        assert!(out.documents.is_empty());
    }

    #[test]
    fn chunk_and_metadata_stores_round_trip() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());
        let out = run_pipeline(dir.path(), &HashSet::new());

        let out_dir = tempdir().expect("output tempdir");
        let chunks_path = out_dir.path().join(store::CHUNKS_FILE);
        let meta_path = out_dir.path().join(store::METADATA_FILE);

        store::write_jsonl(&chunks_path, &out.chunks).expect("write chunks");
        store::write_jsonl(&meta_path, &out.documents).expect("write metadata");

        let chunks = store::read_chunks(&chunks_path).expect("read chunks");
        let documents = store::read_metadata(&meta_path).expect("read metadata");
        assert_eq!(chunks, out.chunks);
        assert_eq!(documents, out.documents);
    }

    #[test]
    fn skip_list_loader_ignores_blank_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("skip.txt");
        fs::write(&path, "paper3.pdf\n\n  paper9.pdf  \n\n").expect("write skip list");

        let skip = store::load_skip_list(&path).expect("load skip list");
        assert_eq!(skip.len(), 2);
        assert!(skip.contains("paper3.pdf"));
        assert!(skip.contains("paper9.pdf"));

        let missing = store::load_skip_list(Path::new("/nonexistent/skip.txt"))
            .expect("missing skip list is empty");
        assert!(missing.is_empty());
    }

    #[test]
    fn report_reflects_pipeline_output() {
        let dir = tempdir().expect("tempdir");
        write_corpus(dir.path());
        let out = run_pipeline(dir.path(), &HashSet::new());

        let report = BuildReport::generate(
            &ChunkingConfig::default(),
            &EmbeddingConfig::default(),
            &out.stats,
            out.chunks.len(),
            out.chunks.len(),
        );
        assert!(report.integrity.alignment_verified);
        assert_eq!(report.stats.pdf_count, 5);
        assert_eq!(report.stats.docs_indexed, 5);
        assert_eq!(report.stats.chunk_count, out.chunks.len());
        // 1 empty of 5 documents.
        assert_eq!(report.extraction_quality.empty_text_pct, 20.0);
        assert_eq!(report.extraction_quality.low_text_pct, 20.0);

        let out_dir = tempdir().expect("output tempdir");
        let report_path = out_dir.path().join(store::REPORT_FILE);
        store::write_report(&report_path, &report).expect("write report");

        let raw = fs::read_to_string(&report_path).expect("read report");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse report");
        assert_eq!(value["integrity"]["alignment_verified"], true);
        assert_eq!(value["stats"]["pdf_count"], 5);
    }

    #[test]
    fn custom_vocabulary_changes_section_labels() {
        let dir = tempdir().expect("tempdir");
        let body = "Die Arbeitsmarkteffekte sind regional sehr unterschiedlich ausgeprägt. "
            .repeat(12);
        fs::write(
            dir.path().join("bericht.pdf"),
            format!("Zusammenfassung\n\n{body}"),
        )
        .expect("write fixture");

        let vocab = SectionVocabulary::from_patterns(&[r"^zusammenfassung\s*$"])
            .expect("valid vocabulary");
        let chunker = SectionChunker::new(vocab, ChunkingConfig::default());
        let pipeline = Pipeline::with_extractor(PlainTextExtractor, chunker);
        let out = pipeline
            .run(dir.path(), &HashSet::new())
            .expect("pipeline run failed");

        assert!(!out.chunks.is_empty());
        assert_eq!(out.chunks[0].section, "Zusammenfassung");
    }
}
