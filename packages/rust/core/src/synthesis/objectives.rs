use std::collections::HashSet;

use trainforge_shared::LearningLevel;

use super::Plan;

const MAX_OBJECTIVES: usize = 5;
const EXTENDED_SESSION_MINUTES: u32 = 45;

/// Learning objectives anchored on the focus topics, at most five.
pub(crate) fn learning_objectives(plan: &Plan<'_>) -> Vec<String> {
    let focus: Vec<&str> = plan.focus.iter().map(|t| t.title.as_str()).collect();
    let titles: Vec<&str> = if focus.is_empty() {
        vec![plan.topic]
    } else {
        focus
    };
    let primary = titles[0];

    let mut objectives = vec![format!("Summarize the key insights from {primary}.")];

    if let Some(second) = titles.get(1) {
        objectives.push(format!(
            "Compare how {second} relates to {primary} within the module context."
        ));
    }
    if titles.len() > 2 {
        objectives.push(format!(
            "Prioritize takeaways from {} for learner application.",
            titles[..3].join(", ")
        ));
    }

    objectives.push(match plan.level {
        LearningLevel::Beginner => {
            format!("Define essential terminology associated with {primary}.")
        }
        LearningLevel::Intermediate => format!("Apply {primary} in scenario-based discussions."),
        LearningLevel::Advanced => {
            format!("Design an implementation approach that leverages {primary}.")
        }
    });

    if plan.minutes >= EXTENDED_SESSION_MINUTES {
        objectives.push(format!(
            "Facilitate extended practice sessions that reinforce {primary} and related themes."
        ));
    }

    objectives.push(
        "Connect the documented practices to your organization's instructional goals.".to_string(),
    );

    let mut seen = HashSet::new();
    objectives
        .into_iter()
        .filter(|o| seen.insert(o.to_lowercase()))
        .take(MAX_OBJECTIVES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::duration_guide;
    use crate::topics::TopicCandidate;
    use trainforge_ingest::NoiseFilter;

    fn objectives_for(titles: &[&str], minutes: u32, level: LearningLevel) -> Vec<String> {
        let focus: Vec<TopicCandidate> = titles
            .iter()
            .map(|t| TopicCandidate::without_evidence(*t))
            .collect();
        let noise = NoiseFilter::default();
        let plan = Plan {
            topic: "Coaching",
            minutes,
            level,
            guide: duration_guide(minutes),
            focus: &focus,
            key_concepts: &[],
            noise: &noise,
        };
        learning_objectives(&plan)
    }

    #[test]
    fn single_topic_short_module() {
        let objectives = objectives_for(&["Feedback"], 10, LearningLevel::Beginner);
        assert_eq!(
            objectives,
            vec![
                "Summarize the key insights from Feedback.",
                "Define essential terminology associated with Feedback.",
                "Connect the documented practices to your organization's instructional goals.",
            ]
        );
    }

    #[test]
    fn request_topic_when_no_focus() {
        let objectives = objectives_for(&[], 15, LearningLevel::Intermediate);
        assert_eq!(objectives[0], "Summarize the key insights from Coaching.");
        assert_eq!(objectives[1], "Apply Coaching in scenario-based discussions.");
    }

    #[test]
    fn capped_at_five_in_order() {
        let objectives = objectives_for(&["A1 Topic", "B2 Topic", "C3 Topic"], 60, LearningLevel::Advanced);
        assert_eq!(objectives.len(), 5);
        assert!(objectives[1].starts_with("Compare how B2 Topic relates to A1 Topic"));
        assert_eq!(
            objectives[2],
            "Prioritize takeaways from A1 Topic, B2 Topic, C3 Topic for learner application."
        );
        assert!(objectives[4].starts_with("Facilitate extended practice sessions"));
    }

    #[test]
    fn objectives_are_deterministic() {
        let a = objectives_for(&["Feedback", "Coaching"], 30, LearningLevel::Advanced);
        let b = objectives_for(&["Feedback", "Coaching"], 30, LearningLevel::Advanced);
        assert_eq!(a, b);
    }
}
