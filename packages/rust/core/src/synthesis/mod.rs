//! Module synthesis: retrieved groups → structured training [`Module`].
//!
//! Synthesis is pure. Given the same request (including `created_at`),
//! groups and noise filter it always produces the same module.

mod activities;
mod assessment;
mod content;
mod objectives;
mod outline;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use trainforge_ingest::NoiseFilter;
use trainforge_shared::{
    FormatType, LearningLevel, Module, ModuleMetadata, OutputFormat, Resource, Result,
    RetrievedGroup, TrainforgeError,
};

use crate::budget::{DurationGuide, duration_guide};
use crate::focus::select_focus_topics;
use crate::topics::{self, TopicCandidate};

use activities::generate_activities;
use assessment::generate_assessment;
use content::generate_detailed_content;
use objectives::learning_objectives;
use outline::content_outline;

const MIN_SLIDES: u32 = 5;
const MAX_SLIDES: u32 = 50;

/// What the caller asked for.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub duration_minutes: u32,
    pub level: LearningLevel,
    pub format: OutputFormat,
    /// Stamped into the module metadata.
    pub created_at: DateTime<Utc>,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(TrainforgeError::validation("topic must not be empty"));
        }
        if self.duration_minutes == 0 {
            return Err(TrainforgeError::validation(
                "duration must be at least one minute",
            ));
        }
        Ok(())
    }
}

/// Retrieved text reduced to the material synthesis works from.
#[derive(Debug, Clone)]
pub struct SynthesizedContent {
    /// Cleaned chunk texts joined with single spaces.
    pub combined_text: String,
    pub headings: Vec<String>,
    pub key_concepts: Vec<String>,
    pub topics: Vec<TopicCandidate>,
    /// Unique source filenames, sorted.
    pub source_files: Vec<String>,
}

/// Clean every retrieved chunk and extract headings, concepts and topics.
pub fn synthesize_content(
    groups: &[RetrievedGroup],
    topic: &str,
    noise: &NoiseFilter,
) -> SynthesizedContent {
    let cleaned: Vec<String> = groups
        .iter()
        .flat_map(|g| g.chunks.iter())
        .map(|chunk| noise.clean_text(&chunk.text))
        .filter(|text| !text.is_empty())
        .collect();

    let combined_text = cleaned.join(" ");
    let headings = topics::heading_candidates(cleaned.iter().map(String::as_str), noise);
    let key_concepts = topics::key_concepts(&combined_text, topic, noise);
    let derived = topics::derive_topics(
        &combined_text,
        &headings,
        &key_concepts,
        topics::MAX_TOPICS,
        noise,
    );

    let source_files: BTreeSet<String> = groups.iter().map(|g| g.filename.clone()).collect();

    SynthesizedContent {
        combined_text,
        headings,
        key_concepts,
        topics: derived,
        source_files: source_files.into_iter().collect(),
    }
}

/// Inputs shared by every section builder.
pub(crate) struct Plan<'a> {
    pub topic: &'a str,
    pub minutes: u32,
    pub level: LearningLevel,
    pub guide: DurationGuide,
    pub focus: &'a [TopicCandidate],
    pub key_concepts: &'a [String],
    pub noise: &'a NoiseFilter,
}

impl Plan<'_> {
    /// Focus topics whose titles are not noise.
    pub fn clean_focus(&self) -> Vec<&TopicCandidate> {
        self.focus
            .iter()
            .filter(|t| !t.title.is_empty() && !self.noise.is_noise(&t.title))
            .collect()
    }

    pub fn focus_titles(&self) -> Vec<&str> {
        self.clean_focus().into_iter().map(|t| t.title.as_str()).collect()
    }

    /// Top focus title, or the request topic.
    pub fn primary_title(&self) -> &str {
        self.focus_titles().first().copied().unwrap_or(self.topic)
    }
}

/// Build a complete module from retrieved groups.
///
/// Fails with [`TrainforgeError::EmptyRetrieval`] when `groups` is empty.
#[instrument(skip_all, fields(topic = %request.topic, minutes = request.duration_minutes, groups = groups.len()))]
pub fn synthesize_module(
    request: &GenerationRequest,
    groups: &[RetrievedGroup],
    noise: &NoiseFilter,
) -> Result<Module> {
    request.validate()?;
    if groups.is_empty() {
        return Err(TrainforgeError::EmptyRetrieval);
    }

    let content = synthesize_content(groups, &request.topic, noise);
    let focus = select_focus_topics(
        &content.topics,
        &content.key_concepts,
        request.duration_minutes,
        noise,
    );
    debug!(
        headings = content.headings.len(),
        concepts = content.key_concepts.len(),
        topics = content.topics.len(),
        focus = focus.len(),
        evidenced = focus.iter().filter(|t| t.has_evidence()).count(),
        "content synthesized"
    );

    let plan = Plan {
        topic: &request.topic,
        minutes: request.duration_minutes,
        level: request.level,
        guide: duration_guide(request.duration_minutes),
        focus: &focus,
        key_concepts: &content.key_concepts,
        noise,
    };
    debug!(
        intro = plan.guide.intro,
        content = plan.guide.content,
        activities = plan.guide.activities,
        assessment = plan.guide.assessment,
        budgeted = plan.guide.total(),
        "time budget allocated"
    );

    let format_type = request.format.format_type();
    let module = Module {
        metadata: ModuleMetadata {
            title: format!("Training Module: {}", request.topic),
            topic: request.topic.clone(),
            duration_minutes: request.duration_minutes,
            learning_level: request.level,
            format_type,
            created_at: request.created_at,
            estimated_slides: estimated_slides(request.duration_minutes, format_type),
            focus_topics: focus.iter().map(|t| t.title.clone()).collect(),
            source_documents: content.source_files.clone(),
        },
        learning_objectives: learning_objectives(&plan),
        content_outline: content_outline(&plan),
        detailed_content: generate_detailed_content(&plan),
        activities: generate_activities(&plan),
        assessment: generate_assessment(&plan),
        resources: extract_resources(groups),
    };

    info!(
        objectives = module.learning_objectives.len(),
        sections = module.content_outline.len(),
        blocks = module.detailed_content.len(),
        activities = module.activities.len(),
        questions = module.assessment.questions.len(),
        "module synthesized"
    );

    Ok(module)
}

/// Slide count estimate: 0.6 slides per minute plus title slides, within `[5, 50]`.
pub fn estimated_slides(minutes: u32, format_type: FormatType) -> u32 {
    match format_type {
        FormatType::Presentation => {
            let estimate = (u64::from(minutes) * 6 / 10 + 3)
                .clamp(u64::from(MIN_SLIDES), u64::from(MAX_SLIDES));
            u32::try_from(estimate).unwrap_or(MAX_SLIDES)
        }
        FormatType::Document => 0,
    }
}

/// One resource per retrieved group, most relevant first.
pub fn extract_resources(groups: &[RetrievedGroup]) -> Vec<Resource> {
    let mut resources: Vec<Resource> = groups
        .iter()
        .map(|g| Resource {
            title: g.filename.clone(),
            kind: g.file_type.clone(),
            relevance_score: g.max_similarity,
            description: format!("Source material from {}", g.filename),
        })
        .collect();
    resources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    resources
}

/// Trim `text` and cut it to `limit` characters at the last space, marking the cut with `…`.
pub(crate) fn shorten(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let prefix: String = text.chars().take(limit).collect();
    let head = prefix.rsplit_once(' ').map_or(prefix.as_str(), |(head, _)| head);
    format!("{head}…")
}
