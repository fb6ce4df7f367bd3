//! Application configuration for Trainforge.
//!
//! User config lives at `~/.trainforge/trainforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainforgeError};
use crate::types::{LearningLevel, OutputFormat};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "trainforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".trainforge";

// ---------------------------------------------------------------------------
// Config structs (matching trainforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where documents and generated modules live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chunking parameters used at ingestion time.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Defaults for module generation requests.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Additional boilerplate fingerprints.
    #[serde(default)]
    pub noise: NoiseConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the chunk database.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Directory generated modules are written to.
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            outputs_dir: default_outputs_dir(),
        }
    }
}

fn default_store_dir() -> String {
    "~/.trainforge/store".into()
}
fn default_outputs_dir() -> String {
    "trainforge-outputs".into()
}

/// `[chunking]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// Reject window settings that would never advance.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(TrainforgeError::config("chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(TrainforgeError::config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Module length when `--duration` is not given.
    #[serde(default = "default_duration")]
    pub default_duration: u32,

    /// Learner level when `--level` is not given.
    #[serde(default)]
    pub default_level: LearningLevel,

    /// Output format when `--format` is not given.
    #[serde(default)]
    pub default_format: OutputFormat,

    /// Chunk hits requested from the store per generation.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            default_level: LearningLevel::default(),
            default_format: OutputFormat::default(),
            max_search_results: default_max_search_results(),
        }
    }
}

fn default_duration() -> u32 {
    15
}
fn default_max_search_results() -> u32 {
    12
}

/// `[noise]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Extra disclaimer phrases; normalized the same way as the built-ins.
    #[serde(default)]
    pub extra_signatures: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.trainforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TrainforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.trainforge/trainforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TrainforgeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        TrainforgeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.chunking.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TrainforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TrainforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TrainforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| TrainforgeError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
