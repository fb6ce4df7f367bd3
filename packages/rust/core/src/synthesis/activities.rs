use trainforge_shared::{Activity, ActivityKind, LearningLevel};

use super::Plan;

const EXTENDED_SESSION_MINUTES: u32 = 45;

/// Interactive activities for the activity segment.
///
/// One activity per focus title (up to three, depending on segment length),
/// plus a closing gallery walk for sessions of 45 minutes or more.
pub(crate) fn generate_activities(plan: &Plan<'_>) -> Vec<Activity> {
    let segment = plan.guide.activities;
    if segment == 0 {
        return Vec::new();
    }

    let max_activities = match segment {
        0..10 => 1,
        10..20 => 2,
        _ => 3,
    };

    let mut titles: Vec<&str> = plan.focus_titles().into_iter().take(max_activities).collect();
    if titles.is_empty() {
        titles.push(plan.topic);
    }

    let per_activity = (segment / titles.len() as u32).max(3).min(segment);

    let mut activities: Vec<Activity> = titles
        .iter()
        .enumerate()
        .map(|(index, title)| focus_activity(plan.level, index == 0, title, per_activity))
        .collect();

    if plan.minutes >= EXTENDED_SESSION_MINUTES {
        activities.push(Activity {
            kind: ActivityKind::Synthesis,
            title: "Learning Gallery Walk".into(),
            duration_minutes: segment.clamp(5, 10),
            description: "Teams rotate to review artefacts created for each focus topic.".into(),
            instructions: vec![
                "Post key artefacts or takeaways for each topic".into(),
                "Rotate every two minutes to digest insights".into(),
                "Close with a full-group synthesis of cross-topic themes".into(),
            ],
        });
    }

    activities
}

fn focus_activity(level: LearningLevel, lead: bool, t: &str, minutes: u32) -> Activity {
    let (kind, title, description, instructions): (ActivityKind, String, String, Vec<String>) =
        match (level, lead) {
            (LearningLevel::Beginner, true) => (
                ActivityKind::Discussion,
                format!("Discussion: {t} Examples"),
                format!("Share examples of {t} from your experience"),
                vec![
                    format!("Recall where {t} shows up in the module"),
                    "Share with a partner or small group".into(),
                    "Identify key learning points".into(),
                ],
            ),
            (LearningLevel::Beginner, false) => (
                ActivityKind::Reflection,
                format!("Reflection: Applying {t}"),
                format!("Capture personal action steps for {t}"),
                vec![
                    "List two everyday scenarios where it fits".into(),
                    "Write one question to bring back to the group".into(),
                    "Pair-share insights".into(),
                ],
            ),
            (LearningLevel::Intermediate, true) => (
                ActivityKind::CaseStudy,
                format!("Case Study: {t} Application"),
                format!("Analyze a documented {t} scenario"),
                vec![
                    format!("Review excerpts describing {t}"),
                    "Identify key challenges and opportunities".into(),
                    "Propose solutions using course concepts".into(),
                    "Present findings to the group".into(),
                ],
            ),
            (LearningLevel::Intermediate, false) => (
                ActivityKind::RolePlay,
                format!("Role Play: Coaching on {t}"),
                format!("Simulate a coaching conversation featuring {t}"),
                vec![
                    "Assign facilitator, learner, observer roles".into(),
                    "Run a 5-minute micro-coaching demo".into(),
                    "Debrief on what reinforced the concept".into(),
                ],
            ),
            (LearningLevel::Advanced, true) => (
                ActivityKind::Project,
                format!("Mini-Project: {t} Implementation Plan"),
                format!("Create an implementation plan for {t}"),
                vec![
                    format!("Define how {t} impacts the project scope"),
                    "Identify resources and constraints".into(),
                    "Develop step-by-step implementation plan".into(),
                    "Present plan with justification".into(),
                ],
            ),
            (LearningLevel::Advanced, false) => (
                ActivityKind::PeerReview,
                format!("Peer Review: Stress-test {t}"),
                format!("Evaluate another team's approach to {t}"),
                vec![
                    "Swap draft plans across teams".into(),
                    "Score using success criteria from the documentation".into(),
                    "Capture improvement recommendations".into(),
                ],
            ),
        };

    Activity {
        kind,
        title,
        duration_minutes: minutes,
        description,
        instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::duration_guide;
    use crate::topics::TopicCandidate;
    use trainforge_ingest::NoiseFilter;

    fn activities_for(titles: &[&str], minutes: u32, level: LearningLevel) -> Vec<Activity> {
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
        generate_activities(&plan)
    }

    #[test]
    fn no_activities_without_segment() {
        assert!(activities_for(&["Feedback"], 5, LearningLevel::Beginner).is_empty());
    }

    #[test]
    fn short_segment_gets_one_activity() {
        let activities = activities_for(&["Feedback", "Listening"], 15, LearningLevel::Intermediate);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::CaseStudy);
        assert_eq!(activities[0].title, "Case Study: Feedback Application");
        assert_eq!(activities[0].duration_minutes, 3);
    }

    #[test]
    fn kinds_follow_level_and_position() {
        let activities = activities_for(&["Feedback", "Listening", "Goals"], 60, LearningLevel::Beginner);
        let kinds: Vec<ActivityKind> = activities.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::Discussion, ActivityKind::Reflection, ActivityKind::Synthesis]
        );
        assert_eq!(activities[0].duration_minutes, 9);
    }

    #[test]
    fn long_session_adds_gallery_walk() {
        let activities = activities_for(&["Feedback", "Listening", "Goals"], 90, LearningLevel::Advanced);
        let kinds: Vec<ActivityKind> = activities.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::Project,
                ActivityKind::PeerReview,
                ActivityKind::PeerReview,
                ActivityKind::Synthesis,
            ]
        );
        assert_eq!(activities[0].duration_minutes, 8);
        assert_eq!(activities[3].title, "Learning Gallery Walk");
        assert_eq!(activities[3].duration_minutes, 10);
    }

    #[test]
    fn request_topic_when_no_focus() {
        let activities = activities_for(&[], 15, LearningLevel::Beginner);
        assert_eq!(activities[0].title, "Discussion: Coaching Examples");
    }
}
