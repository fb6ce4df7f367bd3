//! Core pipeline orchestration and domain logic for Trainforge.
//!
//! Synthesis turns retrieved chunk groups into a structured training
//! [`Module`](trainforge_shared::Module) without any I/O; the pipelines wrap
//! it with ingestion, retrieval and artifact writing.

pub mod assembler;
pub mod budget;
pub mod focus;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod synthesis;
pub mod topics;

pub use pipeline::{
    GenerateConfig, GenerateOutcome, GenerationResult, IngestSummary, ProgressReporter,
    SilentProgress, generate_module, ingest_file, ingest_files,
};
pub use prompt::extract_topic;
pub use retrieval::group_hits;
pub use synthesis::{GenerationRequest, synthesize_module};
