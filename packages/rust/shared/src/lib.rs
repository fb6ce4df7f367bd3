//! Shared types, error model, and configuration for Trainforge.
//!
//! This crate is the foundation depended on by all other Trainforge crates.
//! It provides:
//! - [`TrainforgeError`] — the unified error type
//! - Domain types ([`DocumentChunk`], [`RetrievedGroup`], [`Module`], ...)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod module;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChunkingConfig, GenerationConfig, NoiseConfig, StorageConfig, config_dir,
    config_file_path, expand_home, init_config, load_config, load_config_from,
};
pub use error::{EMPTY_RETRIEVAL_HINT, Result, TrainforgeError};
pub use module::{
    Activity, ActivityKind, Assessment, ContentBlock, Module, ModuleMetadata, OutlineSection,
    Question, Resource,
};
pub use types::{
    ChunkHit, DocumentChunk, DocumentId, FormatType, LearningLevel, OutputFormat, RetrievedChunk,
    RetrievedGroup, StoredDocument,
};
