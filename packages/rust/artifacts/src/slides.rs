//! Slide deck descriptors.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use trainforge_shared::{ContentBlock, Module, Question, Resource};

/// Generic follow-ups shown on the closing slide.
pub const NEXT_STEPS: [&str; 4] = [
    "Apply concepts in your current projects",
    "Practice with additional examples",
    "Seek feedback on implementation",
    "Explore advanced topics in this area",
];

const MAX_TAKEAWAYS: usize = 5;
const CLOSING_RESOURCES: usize = 3;

/// One slide, numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub slide_number: u32,
    pub title: String,
    pub content: SlideContent,
}

/// Layout-specific slide body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideContent {
    Title {
        subtitle: String,
        learning_level: String,
        duration: String,
        date: String,
    },
    BulletPoints {
        heading: String,
        bullet_points: Vec<String>,
    },
    Content {
        main_concept: String,
        explanation: String,
    },
    Activity {
        activity_type: String,
        duration_minutes: u32,
        instructions: Vec<String>,
        materials_needed: Vec<String>,
        expected_outcome: String,
    },
    Assessment {
        questions: Vec<Question>,
    },
    Conclusion {
        key_takeaways: Vec<String>,
        next_steps: Vec<String>,
        resources: Vec<Resource>,
    },
}

/// Lay out `module` as a slide deck dated `date`.
pub fn render_slides(module: &Module, date: NaiveDate) -> Vec<Slide> {
    let meta = &module.metadata;
    let mut deck: Vec<(String, SlideContent)> = Vec::new();

    deck.push((
        meta.title.clone(),
        SlideContent::Title {
            subtitle: format!("Duration: {} minutes", meta.duration_minutes),
            learning_level: capitalize(meta.learning_level.as_str()),
            duration: format!("{} minutes", meta.duration_minutes),
            date: date.format("%B %d, %Y").to_string(),
        },
    ));

    deck.push((
        "Learning Objectives".into(),
        SlideContent::BulletPoints {
            heading: "By the end of this module, you will be able to:".into(),
            bullet_points: module.learning_objectives.clone(),
        },
    ));

    for block in &module.detailed_content {
        match block {
            ContentBlock::Introduction { .. } => {}
            ContentBlock::MainContent {
                title,
                theme,
                explanation,
                examples,
                best_practices,
                ..
            } => {
                deck.push((
                    title.clone(),
                    SlideContent::Content {
                        main_concept: theme.clone(),
                        explanation: explanation.clone(),
                    },
                ));
                if !examples.is_empty() {
                    deck.push((
                        format!("{title} - Examples"),
                        SlideContent::BulletPoints {
                            heading: "Examples".into(),
                            bullet_points: examples.clone(),
                        },
                    ));
                }
                if !best_practices.is_empty() {
                    deck.push((
                        format!("{title} - Best Practices"),
                        SlideContent::BulletPoints {
                            heading: "Best Practices".into(),
                            bullet_points: best_practices.clone(),
                        },
                    ));
                }
            }
            ContentBlock::Activity {
                title,
                duration_minutes,
                activity_type,
                instructions,
                materials_needed,
                expected_outcome,
            } => deck.push((
                title.clone(),
                SlideContent::Activity {
                    activity_type: activity_type.clone(),
                    duration_minutes: *duration_minutes,
                    instructions: instructions.clone(),
                    materials_needed: materials_needed.clone(),
                    expected_outcome: expected_outcome.clone(),
                },
            )),
        }
    }

    if !module.assessment.questions.is_empty() {
        deck.push((
            "Knowledge Check".into(),
            SlideContent::Assessment {
                questions: module.assessment.questions.clone(),
            },
        ));
    }

    deck.push((
        "Summary & Next Steps".into(),
        SlideContent::Conclusion {
            key_takeaways: key_takeaways(module),
            next_steps: NEXT_STEPS.iter().map(|s| (*s).to_string()).collect(),
            resources: module
                .resources
                .iter()
                .take(CLOSING_RESOURCES)
                .cloned()
                .collect(),
        },
    ));

    let slides: Vec<Slide> = deck
        .into_iter()
        .zip(1..)
        .map(|((title, content), slide_number)| Slide {
            slide_number,
            title,
            content,
        })
        .collect();

    debug!(slides = slides.len(), "slides rendered");
    slides
}

/// Three generic takeaways plus the first two objectives.
pub fn key_takeaways(module: &Module) -> Vec<String> {
    let mut takeaways = vec![
        format!("Understanding of {} fundamentals", module.metadata.topic),
        "Practical application strategies".to_string(),
        "Best practices for implementation".to_string(),
    ];
    takeaways.extend(module.learning_objectives.iter().take(2).cloned());
    takeaways.truncate(MAX_TAKEAWAYS);
    takeaways
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trainforge_shared::{
        Activity, ActivityKind, Assessment, FormatType, LearningLevel, ModuleMetadata,
        OutlineSection,
    };

    pub(crate) fn sample_module() -> Module {
        Module {
            metadata: ModuleMetadata {
                title: "Training Module: Coaching".into(),
                topic: "Coaching".into(),
                duration_minutes: 15,
                learning_level: LearningLevel::Intermediate,
                format_type: FormatType::Presentation,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
                estimated_slides: 12,
                focus_topics: vec!["Feedback".into()],
                source_documents: vec!["coaching.txt".into()],
            },
            learning_objectives: vec![
                "Summarize the key insights from Feedback.".into(),
                "Apply Feedback in scenario-based discussions.".into(),
                "Connect the documented practices to your organization's instructional goals."
                    .into(),
            ],
            content_outline: vec![OutlineSection {
                section: "Introduction".into(),
                duration_minutes: 2,
                key_points: vec!["Module focus: Feedback".into()],
            }],
            detailed_content: vec![
                ContentBlock::Introduction {
                    title: "Introduction to Coaching".into(),
                    duration_minutes: 2,
                    overview: "This module spotlights Feedback.".into(),
                    importance: "These themes shape the guidance presented for Coaching.".into(),
                    preview: "We'll examine documented practices.".into(),
                },
                ContentBlock::MainContent {
                    title: "Feedback".into(),
                    duration_minutes: 8,
                    theme: "Feedback".into(),
                    explanation: "Feedback should be timely.".into(),
                    examples: vec!["Feedback should be timely.".into()],
                    best_practices: vec!["Connect Feedback back to real scenarios.".into()],
                },
                ContentBlock::Activity {
                    title: "Hands-on Activity: Feedback in Practice".into(),
                    duration_minutes: 3,
                    activity_type: "group_exercise".into(),
                    instructions: vec!["Review the excerpts.".into()],
                    materials_needed: vec!["Excerpt handout".into()],
                    expected_outcome: "Participants outline how Feedback applies.".into(),
                },
            ],
            activities: vec![Activity {
                kind: ActivityKind::CaseStudy,
                title: "Case Study: Feedback Application".into(),
                duration_minutes: 3,
                description: "Analyze a documented Feedback scenario".into(),
                instructions: vec!["Review excerpts describing Feedback".into()],
            }],
            assessment: Assessment {
                kind: "knowledge_check".into(),
                questions: vec![Question::TrueFalse {
                    question: "Feedback is an important aspect of instructional design.".into(),
                    correct_answer: true,
                }],
            },
            resources: (1..=4)
                .map(|i| Resource {
                    title: format!("source{i}.txt"),
                    kind: ".txt".into(),
                    relevance_score: 1.0 / f64::from(i),
                    description: format!("Source material from source{i}.txt"),
                })
                .collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn deck_order_and_numbering() {
        let slides = render_slides(&sample_module(), date());
        let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Training Module: Coaching",
                "Learning Objectives",
                "Feedback",
                "Feedback - Examples",
                "Feedback - Best Practices",
                "Hands-on Activity: Feedback in Practice",
                "Knowledge Check",
                "Summary & Next Steps",
            ]
        );
        let numbers: Vec<u32> = slides.iter().map(|s| s.slide_number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
    }

    #[test]
    fn title_slide_shows_level_and_date() {
        let slides = render_slides(&sample_module(), date());
        match &slides[0].content {
            SlideContent::Title {
                learning_level,
                date,
                ..
            } => {
                assert_eq!(learning_level, "Intermediate");
                assert_eq!(date, "March 01, 2025");
            }
            other => panic!("unexpected slide: {other:?}"),
        }
    }

    #[test]
    fn conclusion_lists_top_three_resources() {
        let slides = render_slides(&sample_module(), date());
        match &slides.last().expect("slides").content {
            SlideContent::Conclusion {
                key_takeaways,
                next_steps,
                resources,
            } => {
                assert_eq!(key_takeaways.len(), 5);
                assert_eq!(key_takeaways[0], "Understanding of Coaching fundamentals");
                assert_eq!(key_takeaways[3], "Summarize the key insights from Feedback.");
                assert_eq!(next_steps.len(), 4);
                assert_eq!(resources.len(), 3);
            }
            other => panic!("unexpected slide: {other:?}"),
        }
    }

    #[test]
    fn empty_assessment_has_no_slide() {
        let mut module = sample_module();
        module.assessment.questions.clear();
        let slides = render_slides(&module, date());
        assert!(!slides.iter().any(|s| s.title == "Knowledge Check"));
    }

    #[test]
    fn slides_serialize_with_type_tag() {
        let slides = render_slides(&sample_module(), date());
        let json = serde_json::to_value(&slides).expect("json");
        assert_eq!(json[0]["content"]["type"], "title");
        assert_eq!(json[1]["content"]["type"], "bullet_points");
    }
}
