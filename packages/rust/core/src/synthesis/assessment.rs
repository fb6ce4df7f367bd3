use trainforge_shared::{Assessment, LearningLevel, Question};

use super::{Plan, shorten};

const EVIDENCE_LIMIT: usize = 140;
const PRIMARY_EVIDENCE: usize = 3;
const SUPPLEMENTARY_EVIDENCE: usize = 2;
const CAPSTONE_TOPICS: usize = 3;
const EXTENDED_SESSION_MINUTES: u32 = 45;

/// Knowledge check anchored on the top focus topic.
pub(crate) fn generate_assessment(plan: &Plan<'_>) -> Assessment {
    let focus = plan.clean_focus();
    let primary = plan.primary_title();

    let support: Vec<String> = focus
        .first()
        .map(|t| {
            t.sentences
                .iter()
                .take(PRIMARY_EVIDENCE)
                .map(|s| shorten(s, EVIDENCE_LIMIT))
                .collect()
        })
        .unwrap_or_default();

    let mut questions = primary_questions(plan.level, primary, support);

    for topic in focus.iter().skip(1) {
        let title = topic.title.as_str();
        let evidence: Vec<String> = topic
            .sentences
            .iter()
            .take(SUPPLEMENTARY_EVIDENCE)
            .map(|s| shorten(s, EVIDENCE_LIMIT))
            .collect();

        questions.push(match plan.level {
            LearningLevel::Beginner => Question::TrueFalse {
                question: format!("{title} directly supports the main objectives of {primary}."),
                correct_answer: true,
            },
            LearningLevel::Intermediate => Question::ShortAnswer {
                question: format!("Summarize how {title} complements {primary}."),
                expected_elements: if evidence.is_empty() {
                    vec![format!("Highlight alignment between {title} and module goals")]
                } else {
                    evidence
                },
            },
            LearningLevel::Advanced => Question::Scenario {
                question: format!("Design an evaluation metric for {title} that fits this module."),
                evaluation_criteria: vec![
                    "Ties back to learner outcomes".into(),
                    "Leverages documented practices".into(),
                    format!("Shows alignment between {title} and {primary}"),
                ],
            },
        });
    }

    if plan.level == LearningLevel::Advanced && plan.minutes >= EXTENDED_SESSION_MINUTES {
        let capstone: Vec<&str> = if focus.is_empty() {
            vec![plan.topic]
        } else {
            focus.iter().take(CAPSTONE_TOPICS).map(|t| t.title.as_str()).collect()
        };
        questions.push(Question::ProjectPlan {
            question: format!(
                "Outline a capstone deliverable that integrates {}.",
                capstone.join(", ")
            ),
            evaluation_criteria: vec![
                "Clear sequencing of module components".into(),
                "Evidence of stakeholder considerations".into(),
                "Measurable success indicators".into(),
            ],
        });
    }

    Assessment {
        kind: "knowledge_check".into(),
        questions,
    }
}

fn primary_questions(level: LearningLevel, p: &str, support: Vec<String>) -> Vec<Question> {
    let practice_criteria = || -> Vec<String> {
        vec![
            "Systematic approach".into(),
            "Consideration of learner needs".into(),
            format!("Application of documented practices for {p}"),
        ]
    };

    match level {
        LearningLevel::Beginner => vec![
            Question::MultipleChoice {
                question: format!("What is the primary purpose of {p}?"),
                options: vec![
                    format!("To improve {p} effectiveness"),
                    "To complicate processes".into(),
                    "To reduce efficiency".into(),
                    "None of the above".into(),
                ],
                correct_answer: 0,
            },
            Question::TrueFalse {
                question: format!("{p} is an important aspect of instructional design."),
                correct_answer: true,
            },
        ],
        LearningLevel::Intermediate => vec![
            Question::ShortAnswer {
                question: format!(
                    "Describe three key takeaways about {p} from the source material."
                ),
                expected_elements: if support.is_empty() {
                    vec![
                        format!("Reinforce why {p} matters"),
                        format!("Explain where {p} appears in the module"),
                        "Link to learner application".into(),
                    ]
                } else {
                    support
                },
            },
            Question::Scenario {
                question: format!(
                    "You are designing a course that requires {p}. What steps would you take?"
                ),
                evaluation_criteria: practice_criteria(),
            },
        ],
        LearningLevel::Advanced => vec![
            Question::Scenario {
                question: format!(
                    "You are leading a program that depends on {p}. Design the rollout from needs analysis to evaluation."
                ),
                evaluation_criteria: practice_criteria(),
            },
            Question::ShortAnswer {
                question: format!(
                    "Evaluate how well the source material applies {p}. What would you change?"
                ),
                expected_elements: if support.is_empty() {
                    vec![
                        format!("Assess strengths of the documented approach to {p}"),
                        "Identify gaps or risks".into(),
                        "Recommend evidence-based improvements".into(),
                    ]
                } else {
                    support
                },
            },
        ],
    }
}
