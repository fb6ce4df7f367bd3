use trainforge_shared::ContentBlock;

use super::{Plan, shorten};
use crate::topics::TopicCandidate;

const EXPLANATION_LIMIT: usize = 180;
const FALLBACK_CONCEPT_BLOCKS: usize = 3;
const EXTENDED_SESSION_MINUTES: u32 = 45;

/// Introduction, one block per focus topic, then a hands-on activity when
/// the budget has activity minutes.
pub(crate) fn generate_detailed_content(plan: &Plan<'_>) -> Vec<ContentBlock> {
    let focus = plan.clean_focus();
    let focus_titles: Vec<&str> = focus.iter().map(|t| t.title.as_str()).collect();
    let guide = plan.guide;

    let intro_summary = if focus_titles.is_empty() {
        plan.topic.to_string()
    } else {
        focus_titles.iter().take(3).copied().collect::<Vec<_>>().join(", ")
    };

    let mut blocks = vec![ContentBlock::Introduction {
        title: format!("Introduction to {}", plan.topic),
        duration_minutes: guide.intro,
        overview: format!("This module spotlights {intro_summary} drawn from the uploaded materials."),
        importance: format!("These themes shape the guidance presented for {}.", plan.topic),
        preview: "We'll examine documented practices, examples, and discussion points to help learners apply them."
            .into(),
    }];

    let topics: Vec<TopicCandidate> = if focus.is_empty() {
        plan.key_concepts
            .iter()
            .take(FALLBACK_CONCEPT_BLOCKS)
            .map(TopicCandidate::without_evidence)
            .collect()
    } else {
        focus.into_iter().cloned().collect()
    };

    let per_topic = if guide.content == 0 {
        2
    } else {
        (guide.content / topics.len().max(1) as u32).max(2)
    };
    let max_examples = (2 + plan.minutes / 20).clamp(2, 6) as usize;

    for topic in &topics {
        blocks.push(main_content_block(plan, topic, per_topic, max_examples));
    }

    if guide.activities > 0 {
        let reference = focus_titles.first().copied().unwrap_or(plan.topic);
        blocks.push(ContentBlock::Activity {
            title: format!("Hands-on Activity: {reference} in Practice"),
            duration_minutes: guide.activities,
            activity_type: "group_exercise".into(),
            instructions: vec![
                format!("Review the documentation excerpts related to {reference}."),
                "Identify challenges or opportunities described.".into(),
                "Draft actions learners can take to address them.".into(),
            ],
            materials_needed: vec!["Excerpt handout".into(), "Discussion guide".into()],
            expected_outcome: format!("Participants outline how {reference} applies to their work."),
        });
    }

    blocks
}

fn main_content_block(
    plan: &Plan<'_>,
    topic: &TopicCandidate,
    minutes: u32,
    max_examples: usize,
) -> ContentBlock {
    let title = if topic.title.is_empty() {
        plan.topic
    } else {
        topic.title.as_str()
    };

    let summary = if !topic.summary.is_empty() {
        topic.summary.clone()
    } else if let Some(first) = topic.sentences.first() {
        first.clone()
    } else {
        format!("Overview of {title}.")
    };

    let mut examples: Vec<String> = Vec::new();
    for sentence in &topic.sentences {
        if examples.len() >= max_examples {
            break;
        }
        let example = shorten(sentence, EXPLANATION_LIMIT);
        if plan.noise.is_noise(&example) || examples.contains(&example) {
            continue;
        }
        examples.push(example);
    }
    if examples.is_empty() {
        examples = vec![
            format!("Highlight where {title} appears in the workflow described in the module."),
            format!("Capture learner-facing guidance related to {title}."),
        ];
    }

    let mut best_practices = vec![
        format!("Connect {title} back to real scenarios highlighted in the module materials."),
        format!("Invite participants to discuss how {title} appears in their context."),
        format!("Document success indicators for applying {title} effectively."),
    ];
    if plan.minutes >= EXTENDED_SESSION_MINUTES {
        best_practices.push(format!(
            "Facilitate peer review or coaching moments centered on {title}."
        ));
    }

    ContentBlock::MainContent {
        title: title.to_string(),
        duration_minutes: minutes,
        theme: title.to_string(),
        explanation: shorten(&summary, EXPLANATION_LIMIT),
        examples,
        best_practices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::duration_guide;
    use trainforge_ingest::NoiseFilter;
    use trainforge_shared::LearningLevel;

    fn evidenced(title: &str, sentences: &[&str]) -> TopicCandidate {
        TopicCandidate {
            title: title.into(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            summary: sentences.join(" "),
        }
    }

    fn blocks_for(focus: &[TopicCandidate], concepts: &[String], minutes: u32) -> Vec<ContentBlock> {
        let noise = NoiseFilter::default();
        let plan = Plan {
            topic: "Coaching",
            minutes,
            level: LearningLevel::Intermediate,
            guide: duration_guide(minutes),
            focus,
            key_concepts: concepts,
            noise: &noise,
        };
        generate_detailed_content(&plan)
    }

    #[test]
    fn introduction_then_topics_then_activity() {
        let focus = vec![
            evidenced("Feedback", &["Feedback should be timely."]),
            evidenced("Listening", &["Listening builds trust."]),
        ];
        let blocks = blocks_for(&focus, &[], 15);

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].title(), "Introduction to Coaching");
        assert_eq!(blocks[1].title(), "Feedback");
        assert_eq!(blocks[1].duration_minutes(), 4);
        assert_eq!(blocks[3].title(), "Hands-on Activity: Feedback in Practice");

        match &blocks[0] {
            ContentBlock::Introduction { overview, .. } => assert_eq!(
                overview,
                "This module spotlights Feedback, Listening drawn from the uploaded materials."
            ),
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn evidence_becomes_examples() {
        let focus = vec![evidenced(
            "Feedback",
            &["Feedback should be timely.", "Specific feedback is actionable."],
        )];
        let blocks = blocks_for(&focus, &[], 15);
        match &blocks[1] {
            ContentBlock::MainContent {
                explanation,
                examples,
                best_practices,
                ..
            } => {
                assert_eq!(explanation, "Feedback should be timely. Specific feedback is actionable.");
                assert_eq!(examples.len(), 2);
                assert_eq!(best_practices.len(), 3);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn topics_without_evidence_get_placeholders() {
        let concepts = vec!["Goal Setting".to_string()];
        let blocks = blocks_for(&[], &concepts, 60);
        match &blocks[1] {
            ContentBlock::MainContent {
                title,
                duration_minutes,
                explanation,
                examples,
                best_practices,
                ..
            } => {
                assert_eq!(title, "Goal Setting");
                assert_eq!(*duration_minutes, 30);
                assert_eq!(explanation, "Overview of Goal Setting.");
                assert_eq!(
                    examples[0],
                    "Highlight where Goal Setting appears in the workflow described in the module."
                );
                assert_eq!(best_practices.len(), 4);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn long_summary_is_shortened() {
        let long = "word ".repeat(60);
        let focus = vec![evidenced("Feedback", &[long.trim()])];
        let blocks = blocks_for(&focus, &[], 15);
        match &blocks[1] {
            ContentBlock::MainContent { explanation, .. } => {
                assert!(explanation.ends_with('…'));
                assert!(explanation.chars().count() <= EXPLANATION_LIMIT + 1);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn disclaimer_topics_never_become_blocks() {
        let focus = vec![
            evidenced("Do Not Distribute", &["Do not distribute this."]),
            evidenced("Feedback", &["Feedback should be timely."]),
        ];
        let blocks = blocks_for(&focus, &[], 5);
        let titles: Vec<&str> = blocks.iter().map(|b| b.title()).collect();
        assert_eq!(titles, vec!["Introduction to Coaching", "Feedback"]);
    }
}
