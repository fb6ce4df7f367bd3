//! Core domain types shared by ingestion, retrieval and synthesis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TrainforgeError;

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// Stable identifier for an ingested document, derived from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// First 12 hex characters of the SHA-256 of `filename`.
    ///
    /// Re-ingesting a file with the same name replaces the earlier copy.
    pub fn from_filename(filename: &str) -> Self {
        let digest = Sha256::digest(filename.as_bytes());
        let hex = format!("{digest:x}");
        Self(hex[..12].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// One sentence-aligned slice of a document, as produced at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Trimmed chunk text.
    pub text: String,
    /// Name of the file the chunk came from.
    pub filename: String,
    /// Lower-cased extension including the dot (e.g. `.pdf`).
    pub file_type: String,
    /// Position of this chunk within the document.
    pub index: usize,
    /// Length of `text` in characters.
    pub length: usize,
}

/// Metadata for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub filename: String,
    pub file_type: String,
    /// Size of the raw upload in bytes.
    pub file_size: usize,
    /// Length of the cleaned text in characters.
    pub content_length: usize,
    /// SHA-256 of the cleaned text.
    pub content_hash: String,
    pub chunk_count: usize,
    pub ingested_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// A chunk returned by a retrieval query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub text: String,
    pub index: usize,
    /// Match score in `[0, 1]`.
    pub similarity: f64,
}

/// A retrieval hit before grouping: the chunk plus its document's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkHit {
    pub document_id: DocumentId,
    pub filename: String,
    pub file_type: String,
    pub chunk: RetrievedChunk,
}

/// Retrieved chunks from one source document, ranked by best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedGroup {
    pub document_id: DocumentId,
    pub filename: String,
    pub file_type: String,
    /// Chunks in retrieval order.
    pub chunks: Vec<RetrievedChunk>,
    /// Best chunk similarity in the group, in `[0, 1]`.
    pub max_similarity: f64,
}

// ---------------------------------------------------------------------------
// Request enums
// ---------------------------------------------------------------------------

/// Audience level a module is written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl LearningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for LearningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LearningLevel {
    type Err = TrainforgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(TrainforgeError::validation(format!(
                "unknown learning level '{other}': expected beginner, intermediate or advanced"
            ))),
        }
    }
}

/// Requested output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Slide deck descriptors.
    #[default]
    Ppt,
    /// Paginated manual.
    Pdf,
    Both,
}

impl OutputFormat {
    /// Module format implied by the requested output.
    pub fn format_type(&self) -> FormatType {
        match self {
            Self::Ppt | Self::Both => FormatType::Presentation,
            Self::Pdf => FormatType::Document,
        }
    }

    pub fn wants_slides(&self) -> bool {
        matches!(self, Self::Ppt | Self::Both)
    }

    pub fn wants_manual(&self) -> bool {
        matches!(self, Self::Pdf | Self::Both)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = TrainforgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ppt" | "slides" => Ok(Self::Ppt),
            "pdf" | "manual" => Ok(Self::Pdf),
            "both" => Ok(Self::Both),
            other => Err(TrainforgeError::validation(format!(
                "unknown output format '{other}': expected ppt, pdf or both"
            ))),
        }
    }
}

/// Shape of the module being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Presentation,
    Document,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_stable_and_short() {
        let a = DocumentId::from_filename("adult_learning_principles.txt");
        let b = DocumentId::from_filename("adult_learning_principles.txt");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 12);
        assert_ne!(a, DocumentId::from_filename("other.txt"));
    }

    #[test]
    fn learning_level_parses_case_insensitively() {
        assert_eq!("Beginner".parse::<LearningLevel>().unwrap(), LearningLevel::Beginner);
        assert_eq!(" advanced ".parse::<LearningLevel>().unwrap(), LearningLevel::Advanced);
        assert!("expert".parse::<LearningLevel>().is_err());
    }

    #[test]
    fn output_format_maps_to_format_type() {
        assert_eq!(OutputFormat::Ppt.format_type(), FormatType::Presentation);
        assert_eq!(OutputFormat::Both.format_type(), FormatType::Presentation);
        assert_eq!(OutputFormat::Pdf.format_type(), FormatType::Document);
        assert!(OutputFormat::Both.wants_manual());
        assert!(!OutputFormat::Pdf.wants_slides());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&LearningLevel::Intermediate).expect("serialize");
        assert_eq!(json, "\"intermediate\"");
    }
}
