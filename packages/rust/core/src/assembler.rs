//! Module output assembler.
//!
//! Writes a synthesized module and its rendered artifacts to disk, then a
//! manifest with a checksum for every file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use trainforge_artifacts::Slide;
use trainforge_shared::{LearningLevel, Module, Result, TrainforgeError};

pub const MODULE_FILE: &str = "module.json";
pub const SLIDES_FILE: &str = "slides.json";
pub const MANUAL_FILE: &str = "manual.md";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Where and how to write one module.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Identifier stamped into the manifest and directory name.
    pub module_id: String,
    /// Root directory for module output (e.g., `trainforge-outputs/`).
    pub output_root: PathBuf,
    /// Tool version string.
    pub tool_version: String,
}

/// Metadata for a single written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub module_id: String,
    pub title: String,
    pub topic: String,
    pub duration_minutes: u32,
    pub learning_level: LearningLevel,
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub artifacts: Vec<ArtifactMeta>,
}

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Directory holding the module files.
    pub module_dir: PathBuf,
    pub manifest: ModuleManifest,
}

/// Write a module directory.
///
/// ```text
/// <output_root>/<topic-slug>-<module_id>/
/// ├── module.json
/// ├── slides.json     (when slides are given)
/// ├── manual.md       (when a manual is given)
/// └── manifest.json
/// ```
#[instrument(skip_all, fields(module_id = %config.module_id, topic = %module.metadata.topic))]
pub fn assemble(
    config: &AssembleConfig,
    module: &Module,
    slides: Option<&[Slide]>,
    manual: Option<&str>,
) -> Result<AssembleResult> {
    let module_dir = config.output_root.join(format!(
        "{}-{}",
        topic_slug(&module.metadata.topic),
        config.module_id
    ));
    std::fs::create_dir_all(&module_dir).map_err(|e| TrainforgeError::io(&module_dir, e))?;

    info!(path = %module_dir.display(), "assembling module directory");

    let mut artifacts = vec![write_atomic(&module_dir, MODULE_FILE, &to_json(module)?)?];
    if let Some(slides) = slides {
        artifacts.push(write_atomic(&module_dir, SLIDES_FILE, &to_json(&slides)?)?);
    }
    if let Some(manual) = manual {
        artifacts.push(write_atomic(&module_dir, MANUAL_FILE, manual)?);
    }

    let manifest = ModuleManifest {
        module_id: config.module_id.clone(),
        title: module.metadata.title.clone(),
        topic: module.metadata.topic.clone(),
        duration_minutes: module.metadata.duration_minutes,
        learning_level: module.metadata.learning_level,
        created_at: module.metadata.created_at,
        tool_version: config.tool_version.clone(),
        artifacts,
    };
    write_atomic(&module_dir, MANIFEST_FILE, &to_json(&manifest)?)?;

    info!(
        artifact_count = manifest.artifacts.len(),
        path = %module_dir.display(),
        "module assembly complete"
    );

    Ok(AssembleResult {
        module_dir,
        manifest,
    })
}

/// A module directory found under an output root.
#[derive(Debug, Clone)]
pub struct ModuleListing {
    pub module_dir: PathBuf,
    pub manifest: ModuleManifest,
    /// Every artifact is present and matches its manifest checksum.
    pub verified: bool,
}

/// Verify that a module directory is well-formed and its files match the manifest.
pub fn validate_module_dir(module_dir: &Path) -> Result<ModuleManifest> {
    let manifest = read_manifest(module_dir)?;
    verify_artifacts(module_dir, &manifest)?;
    Ok(manifest)
}

/// Module directories under `output_root`, newest first.
///
/// Directories without a readable manifest are skipped. A missing root is
/// an empty listing.
#[instrument(skip_all, fields(root = %output_root.display()))]
pub fn list_modules(output_root: &Path) -> Result<Vec<ModuleListing>> {
    if !output_root.exists() {
        return Ok(Vec::new());
    }

    let entries =
        std::fs::read_dir(output_root).map_err(|e| TrainforgeError::io(output_root, e))?;

    let mut listings = Vec::new();
    for entry in entries {
        let module_dir = entry.map_err(|e| TrainforgeError::io(output_root, e))?.path();
        if !module_dir.is_dir() {
            continue;
        }
        let manifest = match read_manifest(&module_dir) {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!(path = %module_dir.display(), error = %e, "skipping directory");
                continue;
            }
        };
        let verified = match verify_artifacts(&module_dir, &manifest) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %module_dir.display(), error = %e, "module failed verification");
                false
            }
        };
        listings.push(ModuleListing {
            module_dir,
            manifest,
            verified,
        });
    }

    listings.sort_by(|a, b| b.manifest.created_at.cmp(&a.manifest.created_at));
    debug!(modules = listings.len(), "module outputs listed");
    Ok(listings)
}

fn read_manifest(module_dir: &Path) -> Result<ModuleManifest> {
    let manifest_path = module_dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(TrainforgeError::validation("missing manifest.json"));
    }

    let content = std::fs::read_to_string(&manifest_path)
        .map_err(|e| TrainforgeError::io(&manifest_path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| TrainforgeError::validation(format!("invalid manifest.json: {e}")))
}

fn verify_artifacts(module_dir: &Path, manifest: &ModuleManifest) -> Result<()> {
    for artifact in &manifest.artifacts {
        let path = module_dir.join(&artifact.filename);
        let bytes = std::fs::read(&path).map_err(|e| TrainforgeError::io(&path, e))?;
        if sha256_hex(&bytes) != artifact.sha256 {
            return Err(TrainforgeError::validation(format!(
                "checksum mismatch for {}",
                artifact.filename
            )));
        }
    }
    Ok(())
}

/// Lower-case, dash-separated directory name for a topic.
pub fn topic_slug(topic: &str) -> String {
    let slug = topic
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "module".to_string()
    } else {
        slug
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| TrainforgeError::Serialization(format!("JSON serialization failed: {e}")))
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write to a temp file, then rename over the target.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<ArtifactMeta> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| TrainforgeError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| TrainforgeError::io(&target, e))?;

    debug!(file = %filename, size = content.len(), "wrote artifact");

    Ok(ArtifactMeta {
        filename: filename.to_string(),
        sha256: sha256_hex(content.as_bytes()),
        size_bytes: content.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trainforge_shared::{Assessment, FormatType, ModuleMetadata};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tf-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_config(output_root: &Path) -> AssembleConfig {
        AssembleConfig {
            module_id: "0190abcd".into(),
            output_root: output_root.into(),
            tool_version: "0.1.0-test".into(),
        }
    }

    fn make_module() -> Module {
        Module {
            metadata: ModuleMetadata {
                title: "Training Module: Adult Learning".into(),
                topic: "Adult Learning".into(),
                duration_minutes: 15,
                learning_level: LearningLevel::Intermediate,
                format_type: FormatType::Presentation,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
                estimated_slides: 12,
                focus_topics: vec!["Self-Direction".into()],
                source_documents: vec!["principles.txt".into()],
            },
            learning_objectives: vec!["Summarize the key insights from Self-Direction.".into()],
            content_outline: vec![],
            detailed_content: vec![],
            activities: vec![],
            assessment: Assessment {
                kind: "knowledge_check".into(),
                questions: vec![],
            },
            resources: vec![],
        }
    }

    #[test]
    fn assemble_writes_module_and_manifest() {
        let tmp = temp_dir();
        let result = assemble(&make_config(&tmp), &make_module(), None, None).unwrap();

        assert_eq!(result.module_dir, tmp.join("adult-learning-0190abcd"));
        assert!(result.module_dir.join(MODULE_FILE).exists());
        assert!(result.module_dir.join(MANIFEST_FILE).exists());
        assert!(!result.module_dir.join(SLIDES_FILE).exists());

        let manifest = &result.manifest;
        assert_eq!(manifest.artifacts.len(), 1);
        assert_eq!(manifest.artifacts[0].sha256.len(), 64);
        assert_eq!(manifest.tool_version, "0.1.0-test");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn assemble_writes_optional_artifacts() {
        let tmp = temp_dir();
        let result = assemble(
            &make_config(&tmp),
            &make_module(),
            Some(&[]),
            Some("# Manual\n"),
        )
        .unwrap();

        let names: Vec<&str> = result
            .manifest
            .artifacts
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec![MODULE_FILE, SLIDES_FILE, MANUAL_FILE]);

        let manual = std::fs::read_to_string(result.module_dir.join(MANUAL_FILE)).unwrap();
        assert_eq!(manual, "# Manual\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn module_json_round_trips() {
        let tmp = temp_dir();
        let module = make_module();
        let result = assemble(&make_config(&tmp), &module, None, None).unwrap();

        let json = std::fs::read_to_string(result.module_dir.join(MODULE_FILE)).unwrap();
        let read: Module = serde_json::from_str(&json).unwrap();
        assert_eq!(read, module);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let tmp = temp_dir();
        let result =
            assemble(&make_config(&tmp), &make_module(), Some(&[]), Some("manual")).unwrap();

        for entry in std::fs::read_dir(&result.module_dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.starts_with('.'), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_detects_tampering() {
        let tmp = temp_dir();
        let result = assemble(&make_config(&tmp), &make_module(), None, Some("manual")).unwrap();
        assert!(validate_module_dir(&result.module_dir).is_ok());

        std::fs::write(result.module_dir.join(MANUAL_FILE), "edited").unwrap();
        let err = validate_module_dir(&result.module_dir).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_missing_manifest() {
        let tmp = temp_dir();
        let err = validate_module_dir(&tmp).unwrap_err();
        assert!(err.to_string().contains("missing manifest.json"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn list_modules_newest_first_and_flags_tampering() {
        let tmp = temp_dir();

        let older = assemble(&make_config(&tmp), &make_module(), None, Some("manual")).unwrap();

        let mut newer_module = make_module();
        newer_module.metadata.topic = "Coaching".into();
        newer_module.metadata.created_at = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        let newer = assemble(&make_config(&tmp), &newer_module, None, None).unwrap();

        std::fs::write(older.module_dir.join(MANUAL_FILE), "edited").unwrap();
        std::fs::create_dir_all(tmp.join("scratch")).unwrap();
        std::fs::write(tmp.join("notes.txt"), "not a module").unwrap();

        let listings = list_modules(&tmp).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].module_dir, newer.module_dir);
        assert_eq!(listings[0].manifest.topic, "Coaching");
        assert!(listings[0].verified);
        assert_eq!(listings[1].module_dir, older.module_dir);
        assert!(!listings[1].verified);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn list_modules_missing_root_is_empty() {
        let tmp = std::env::temp_dir().join(format!("tf-no-outputs-{}", uuid::Uuid::now_v7()));
        assert!(list_modules(&tmp).unwrap().is_empty());
    }

    #[test]
    fn slug_is_filesystem_safe() {
        assert_eq!(
            topic_slug("Adult Learning: Principles & Practice"),
            "adult-learning-principles-practice"
        );
        assert_eq!(topic_slug("???"), "module");
    }
}
