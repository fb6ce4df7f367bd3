//! Document ingestion: text extraction, boilerplate cleanup and chunking.
//!
//! [`DocumentIngestor::process`] is the entry point used by the indexing
//! pipeline. It:
//! 1. Extracts text from the raw upload by file extension
//! 2. Strips boilerplate lines and caps duplicates ([`NoiseFilter`])
//! 3. Splits the cleaned text into sentence-aligned chunks ([`Chunker`])

pub mod chunker;
mod extract;
pub mod noise;

use tracing::{debug, instrument};

use trainforge_shared::{ChunkingConfig, DocumentChunk, Result, TrainforgeError};

pub use chunker::Chunker;
pub use extract::{SUPPORTED_EXTENSIONS, extract_text, file_type_of};
pub use noise::{NoiseFilter, compact, normalize_whitespace};

/// Output of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub filename: String,
    pub file_type: String,
    /// Size of the raw upload in bytes.
    pub file_size: usize,
    /// Text after boilerplate removal.
    pub cleaned_text: String,
    pub chunks: Vec<DocumentChunk>,
}

/// Chunker + noise filter pair exposed to the indexing collaborator.
#[derive(Debug, Clone, Default)]
pub struct DocumentIngestor {
    chunker: Chunker,
    noise: NoiseFilter,
}

impl DocumentIngestor {
    pub fn new(chunking: &ChunkingConfig, noise: NoiseFilter) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::from_config(chunking)?,
            noise,
        })
    }

    pub fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    /// Extract, clean and chunk one uploaded document.
    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub fn process(&self, raw: &[u8], filename: &str) -> Result<IngestResult> {
        let file_type = file_type_of(filename);
        let text = extract_text(raw, &file_type)?;

        let cleaned_text = self.noise.clean_text(&text);
        if cleaned_text.is_empty() {
            return Err(TrainforgeError::parse(format!(
                "{filename}: no extractable text after cleanup"
            )));
        }

        let chunks: Vec<DocumentChunk> = self
            .chunker
            .chunk(&cleaned_text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| DocumentChunk {
                length: text.chars().count(),
                text,
                filename: filename.to_string(),
                file_type: file_type.clone(),
                index,
            })
            .collect();

        debug!(
            raw_chars = text.len(),
            cleaned_chars = cleaned_text.len(),
            chunks = chunks.len(),
            "document processed"
        );

        Ok(IngestResult {
            filename: filename.to_string(),
            file_type,
            file_size: raw.len(),
            cleaned_text,
            chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Adult Learning Principles for Instructional Design\n\
        Confidential - do not distribute\n\
        1. Adult Readiness to Learn\n\
        Adults are ready to learn when they perceive a need to know or do something.\n\
        Confidential - do not distribute\n\
        3. Self-Direction\n\
        Adult learners prefer to take responsibility for their own learning.\n";

    #[test]
    fn process_cleans_and_chunks() {
        let ingestor = DocumentIngestor::default();
        let result = ingestor
            .process(SAMPLE.as_bytes(), "adult_learning.txt")
            .expect("process");

        assert_eq!(result.file_type, ".txt");
        assert_eq!(result.file_size, SAMPLE.len());
        assert!(!result.cleaned_text.contains("Confidential"));
        assert_eq!(result.chunks.len(), 1);

        let chunk = &result.chunks[0];
        assert_eq!(chunk.index, 0);
        assert_eq!(chunk.filename, "adult_learning.txt");
        assert_eq!(chunk.length, chunk.text.chars().count());
        assert!(chunk.text.contains("3. Self-Direction"));
    }

    #[test]
    fn chunk_indexes_follow_text_order() {
        let chunking = ChunkingConfig {
            chunk_size: 80,
            chunk_overlap: 10,
        };
        let ingestor = DocumentIngestor::new(&chunking, NoiseFilter::default()).expect("new");
        let result = ingestor.process(SAMPLE.as_bytes(), "notes.md").expect("process");

        assert!(result.chunks.len() > 1);
        for (i, chunk) in result.chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.length <= 80);
        }
    }

    #[test]
    fn boilerplate_only_document_is_rejected() {
        let ingestor = DocumentIngestor::default();
        let err = ingestor
            .process(b"All rights reserved.\nFor internal use only", "footer.txt")
            .unwrap_err();
        assert!(matches!(err, TrainforgeError::Parse { .. }));
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let ingestor = DocumentIngestor::default();
        let err = ingestor.process(b"data", "deck.pptx").unwrap_err();
        assert!(err.to_string().contains(".pptx"));
    }
}
