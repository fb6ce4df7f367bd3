//! The synthesized training module record.
//!
//! A [`Module`] is built once per generation request and consumed read-only
//! by the renderers and the assembler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FormatType, LearningLevel};

/// Complete structured training content for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub metadata: ModuleMetadata,
    pub learning_objectives: Vec<String>,
    pub content_outline: Vec<OutlineSection>,
    pub detailed_content: Vec<ContentBlock>,
    pub activities: Vec<Activity>,
    pub assessment: Assessment,
    pub resources: Vec<Resource>,
}

/// Descriptive header of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// `Training Module: <topic>`.
    pub title: String,
    pub topic: String,
    pub duration_minutes: u32,
    pub learning_level: LearningLevel,
    pub format_type: FormatType,
    pub created_at: DateTime<Utc>,
    pub estimated_slides: u32,
    /// Titles of the focus topics, in module order.
    pub focus_topics: Vec<String>,
    /// Unique source filenames, sorted.
    pub source_documents: Vec<String>,
}

/// One timed section of the module outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub section: String,
    pub duration_minutes: u32,
    pub key_points: Vec<String>,
}

/// A block of detailed content, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Introduction {
        title: String,
        duration_minutes: u32,
        overview: String,
        importance: String,
        preview: String,
    },
    MainContent {
        title: String,
        duration_minutes: u32,
        theme: String,
        explanation: String,
        examples: Vec<String>,
        best_practices: Vec<String>,
    },
    Activity {
        title: String,
        duration_minutes: u32,
        activity_type: String,
        instructions: Vec<String>,
        materials_needed: Vec<String>,
        expected_outcome: String,
    },
}

impl ContentBlock {
    pub fn title(&self) -> &str {
        match self {
            Self::Introduction { title, .. }
            | Self::MainContent { title, .. }
            | Self::Activity { title, .. } => title,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        match self {
            Self::Introduction {
                duration_minutes, ..
            }
            | Self::MainContent {
                duration_minutes, ..
            }
            | Self::Activity {
                duration_minutes, ..
            } => *duration_minutes,
        }
    }
}

/// Kind of interactive activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Discussion,
    Reflection,
    CaseStudy,
    RolePlay,
    Project,
    PeerReview,
    Synthesis,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Discussion => "Discussion",
            Self::Reflection => "Reflection",
            Self::CaseStudy => "Case Study",
            Self::RolePlay => "Role Play",
            Self::Project => "Project",
            Self::PeerReview => "Peer Review",
            Self::Synthesis => "Synthesis",
        }
    }
}

/// An interactive learner activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub title: String,
    pub duration_minutes: u32,
    pub description: String,
    pub instructions: Vec<String>,
}

/// End-of-module knowledge check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Always `knowledge_check`.
    pub kind: String,
    pub questions: Vec<Question>,
}

/// A single assessment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        question: String,
        options: Vec<String>,
        correct_answer: usize,
    },
    TrueFalse {
        question: String,
        correct_answer: bool,
    },
    ShortAnswer {
        question: String,
        expected_elements: Vec<String>,
    },
    Scenario {
        question: String,
        evaluation_criteria: Vec<String>,
    },
    ProjectPlan {
        question: String,
        evaluation_criteria: Vec<String>,
    },
}

impl Question {
    pub fn prompt(&self) -> &str {
        match self {
            Self::MultipleChoice { question, .. }
            | Self::TrueFalse { question, .. }
            | Self::ShortAnswer { question, .. }
            | Self::Scenario { question, .. }
            | Self::ProjectPlan { question, .. } => question,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::MultipleChoice { .. } => "Multiple choice",
            Self::TrueFalse { .. } => "True / false",
            Self::ShortAnswer { .. } => "Short answer",
            Self::Scenario { .. } => "Scenario",
            Self::ProjectPlan { .. } => "Project plan",
        }
    }
}

/// A source document credited by the module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Source filename.
    pub title: String,
    /// Source file type.
    pub kind: String,
    pub relevance_score: f64,
    pub description: String,
}
