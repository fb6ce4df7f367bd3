//! End-to-end pipelines: file → ingest → store, and prompt → retrieve → synthesize → render → assemble.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use trainforge_artifacts::{manual_to_markdown, render_manual, render_slides};
use trainforge_ingest::{DocumentIngestor, NoiseFilter};
use trainforge_shared::{
    DocumentId, LearningLevel, Module, OutputFormat, Result, StoredDocument, TrainforgeError,
};
use trainforge_storage::Storage;

use crate::assembler::{self, AssembleConfig};
use crate::prompt::extract_topic;
use crate::retrieval::group_hits;
use crate::synthesis::{GenerationRequest, synthesize_module};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document is stored.
    fn document_ingested(&self, filename: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_ingested(&self, _filename: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &str) {}
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Outcome of a batch ingest.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub ingested: Vec<StoredDocument>,
    /// `(path, error message)` for each file that was skipped.
    pub failed: Vec<(PathBuf, String)>,
}

/// Read, clean, chunk and store one file. Re-ingesting a filename replaces it.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn ingest_file(
    storage: &Storage,
    ingestor: &DocumentIngestor,
    path: &Path,
) -> Result<StoredDocument> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| TrainforgeError::validation(format!("not a file: {}", path.display())))?;

    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| TrainforgeError::io(path, e))?;
    let result = ingestor.process(&raw, &filename)?;

    let id = DocumentId::from_filename(&filename);
    let doc = StoredDocument {
        id: id.clone(),
        filename: result.filename,
        file_type: result.file_type,
        file_size: result.file_size,
        content_length: result.cleaned_text.chars().count(),
        content_hash: format!("{:x}", Sha256::digest(result.cleaned_text.as_bytes())),
        chunk_count: result.chunks.len(),
        ingested_at: Utc::now(),
    };
    match storage.get_document(&id).await? {
        Some(previous) if previous.content_hash == doc.content_hash => {
            debug!(%id, "content unchanged, refreshing stored copy");
        }
        Some(previous) => {
            info!(%id, old_chunks = previous.chunk_count, "replacing previous version");
        }
        None => {}
    }
    storage.upsert_document(&doc, &result.chunks).await?;

    info!(id = %doc.id, chunks = doc.chunk_count, "document ingested");
    Ok(doc)
}

/// Ingest every path, continuing past files that fail.
pub async fn ingest_files(
    storage: &Storage,
    ingestor: &DocumentIngestor,
    paths: &[PathBuf],
    progress: &dyn ProgressReporter,
) -> IngestSummary {
    progress.phase("Ingesting documents");
    let mut summary = IngestSummary::default();

    for (i, path) in paths.iter().enumerate() {
        match ingest_file(storage, ingestor, path).await {
            Ok(doc) => {
                progress.document_ingested(&doc.filename, i + 1, paths.len());
                summary.ingested.push(doc);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ingest failed, skipping file");
                summary.failed.push((path.clone(), e.to_string()));
            }
        }
    }

    progress.done(&format!(
        "{} ingested, {} failed",
        summary.ingested.len(),
        summary.failed.len()
    ));
    summary
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Search text for a generation request, scoped to training material.
pub fn retrieval_query(prompt: &str, topic: &str) -> String {
    format!("training {prompt} | {topic} instructional design")
}

/// Configuration for [`generate_module`].
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Free-form request, e.g. "Create a 15 minute module on adult learning".
    pub prompt: String,
    /// Use this topic instead of extracting one from the prompt.
    pub topic: Option<String>,
    pub duration_minutes: u32,
    pub level: LearningLevel,
    pub format: OutputFormat,
    /// Root directory for module output.
    pub output_root: PathBuf,
    /// Chunk hits requested from the store.
    pub max_search_results: u32,
    pub tool_version: String,
}

/// A generated and written module.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub module: Module,
    pub module_id: String,
    pub module_dir: PathBuf,
    pub artifacts: Vec<String>,
    pub elapsed: std::time::Duration,
}

/// Run retrieval, synthesis, rendering and assembly for one request.
#[instrument(skip_all, fields(minutes = config.duration_minutes, level = %config.level))]
pub async fn generate_module(
    storage: &Storage,
    noise: &NoiseFilter,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateOutcome> {
    let start = Instant::now();

    if config.prompt.trim().is_empty() {
        return Err(TrainforgeError::validation("prompt must not be empty"));
    }

    let topic = match config.topic.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => extract_topic(&config.prompt),
    };

    let request = GenerationRequest {
        topic,
        duration_minutes: config.duration_minutes,
        level: config.level,
        format: config.format,
        created_at: Utc::now(),
    };
    request.validate()?;

    // --- Phase 1: Retrieval ---
    progress.phase("Retrieving source material");
    let query = retrieval_query(&config.prompt, &request.topic);
    let hits = storage.search_chunks(&query, config.max_search_results).await?;
    let groups = group_hits(hits);
    info!(topic = %request.topic, groups = groups.len(), "retrieval complete");

    // --- Phase 2: Synthesis ---
    progress.phase("Synthesizing module");
    let module = synthesize_module(&request, &groups, noise)?;

    // --- Phase 3: Rendering ---
    progress.phase("Rendering artifacts");
    let slides = config
        .format
        .wants_slides()
        .then(|| render_slides(&module, request.created_at.date_naive()));
    let manual = config
        .format
        .wants_manual()
        .then(|| manual_to_markdown(&render_manual(&module)));

    // --- Phase 4: Assembly ---
    progress.phase("Writing module");
    let module_id = Uuid::now_v7().to_string();
    let assemble_config = AssembleConfig {
        module_id: module_id.clone(),
        output_root: config.output_root.clone(),
        tool_version: config.tool_version.clone(),
    };
    let assembled = assembler::assemble(
        &assemble_config,
        &module,
        slides.as_deref(),
        manual.as_deref(),
    )?;

    let outcome = GenerateOutcome {
        artifacts: assembled
            .manifest
            .artifacts
            .iter()
            .map(|a| a.filename.clone())
            .collect(),
        module,
        module_id,
        module_dir: assembled.module_dir,
        elapsed: start.elapsed(),
    };

    progress.done(&format!("Module written to {}", outcome.module_dir.display()));
    info!(
        module_id = %outcome.module_id,
        elapsed_ms = outcome.elapsed.as_millis(),
        "generate pipeline complete"
    );

    Ok(outcome)
}

/// Report shape printed by `generate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub sources_used: usize,
    pub artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn from_result(result: &Result<GenerateOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                message: format!(
                    "Generated '{}' ({} minutes, {})",
                    outcome.module.metadata.title,
                    outcome.module.metadata.duration_minutes,
                    outcome.module.metadata.learning_level
                ),
                topic: Some(outcome.module.metadata.topic.clone()),
                module_id: Some(outcome.module_id.clone()),
                output_dir: Some(outcome.module_dir.clone()),
                sources_used: outcome.module.metadata.source_documents.len(),
                artifacts: outcome.artifacts.clone(),
                error: None,
            },
            Err(e) => Self {
                success: false,
                message: if e.is_empty_retrieval() {
                    trainforge_shared::EMPTY_RETRIEVAL_HINT.to_string()
                } else {
                    "Module generation failed".to_string()
                },
                topic: None,
                module_id: None,
                output_dir: None,
                sources_used: 0,
                artifacts: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}
