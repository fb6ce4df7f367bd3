use trainforge_shared::OutlineSection;

use super::Plan;

const CORE_POINTS: usize = 3;
const EXTENDED_POINTS: usize = 4;
const FALLBACK_CONCEPTS: usize = 5;

/// Timed outline: introduction, core content, optional extended and
/// activity sections, then assessment.
pub(crate) fn content_outline(plan: &Plan<'_>) -> Vec<OutlineSection> {
    let titles = outline_titles(plan);
    let guide = plan.guide;

    let core_len = titles.len().min(CORE_POINTS);
    let mut outline = vec![
        OutlineSection {
            section: "Introduction".into(),
            duration_minutes: guide.intro,
            key_points: vec![
                format!("Module focus: {}", titles[..core_len].join(", ")),
                "Why these themes matter for learners".into(),
                format!("Session roadmap for {} minutes", plan.minutes),
            ],
        },
        OutlineSection {
            section: "Core Content".into(),
            duration_minutes: guide.content,
            key_points: titles[..core_len].to_vec(),
        },
    ];

    let extended: Vec<String> = titles
        .iter()
        .skip(core_len)
        .take(EXTENDED_POINTS)
        .cloned()
        .collect();
    if !extended.is_empty() {
        outline.push(OutlineSection {
            section: "Extended Applications".into(),
            duration_minutes: (guide.content / 2).max(5),
            key_points: extended,
        });
    }

    if guide.activities > 0 {
        let first = titles
            .first()
            .map(|t| format!("Apply {t} in a scenario"))
            .unwrap_or_else(|| "Hands-on practice".into());
        outline.push(OutlineSection {
            section: "Interactive Activities".into(),
            duration_minutes: guide.activities,
            key_points: vec![first, "Group discussion".into(), "Case study analysis".into()],
        });
    }

    outline.push(OutlineSection {
        section: "Assessment & Wrap-up".into(),
        duration_minutes: guide.assessment,
        key_points: vec![
            "Knowledge check".into(),
            "Key takeaways".into(),
            "Next steps".into(),
        ],
    });

    outline
}

/// Focus titles, else the first key concepts, else the request topic.
fn outline_titles(plan: &Plan<'_>) -> Vec<String> {
    let focus: Vec<String> = plan
        .focus
        .iter()
        .map(|t| t.title.clone())
        .filter(|t| !t.is_empty())
        .collect();
    if !focus.is_empty() {
        return focus;
    }
    if !plan.key_concepts.is_empty() {
        return plan
            .key_concepts
            .iter()
            .take(FALLBACK_CONCEPTS)
            .cloned()
            .collect();
    }
    vec![plan.topic.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::duration_guide;
    use crate::topics::TopicCandidate;
    use trainforge_ingest::NoiseFilter;
    use trainforge_shared::LearningLevel;

    fn outline_for(titles: &[&str], concepts: &[String], minutes: u32) -> Vec<OutlineSection> {
        let focus: Vec<TopicCandidate> = titles
            .iter()
            .map(|t| TopicCandidate::without_evidence(*t))
            .collect();
        let noise = NoiseFilter::default();
        let plan = Plan {
            topic: "Coaching",
            minutes,
            level: LearningLevel::Intermediate,
            guide: duration_guide(minutes),
            focus: &focus,
            key_concepts: concepts,
            noise: &noise,
        };
        content_outline(&plan)
    }

    fn section_names(outline: &[OutlineSection]) -> Vec<&str> {
        outline.iter().map(|s| s.section.as_str()).collect()
    }

    #[test]
    fn fifteen_minute_outline() {
        let outline = outline_for(&["Feedback", "Listening", "Goals"], &[], 15);
        assert_eq!(
            section_names(&outline),
            vec!["Introduction", "Core Content", "Interactive Activities", "Assessment & Wrap-up"]
        );
        assert_eq!(outline[0].key_points[0], "Module focus: Feedback, Listening, Goals");
        assert_eq!(outline[0].key_points[2], "Session roadmap for 15 minutes");
        assert_eq!(outline[2].key_points[0], "Apply Feedback in a scenario");
        let minutes: Vec<u32> = outline.iter().map(|s| s.duration_minutes).collect();
        assert_eq!(minutes, vec![2, 8, 3, 2]);
    }

    #[test]
    fn extended_section_for_more_than_three_topics() {
        let titles = ["T1 Alpha", "T2 Beta", "T3 Gamma", "T4 Delta", "T5 Eps", "T6 Zeta"];
        let outline = outline_for(&titles, &[], 90);
        assert_eq!(outline.len(), 5);
        assert_eq!(outline[2].section, "Extended Applications");
        assert_eq!(outline[2].duration_minutes, 22);
        assert_eq!(outline[2].key_points, vec!["T4 Delta", "T5 Eps", "T6 Zeta"]);
    }

    #[test]
    fn five_minute_outline_has_no_activities() {
        let outline = outline_for(&["Feedback"], &[], 5);
        assert_eq!(
            section_names(&outline),
            vec!["Introduction", "Core Content", "Assessment & Wrap-up"]
        );
    }

    #[test]
    fn falls_back_to_concepts_then_topic() {
        let concepts: Vec<String> = (1..=7).map(|i| format!("Concept {i}")).collect();
        let outline = outline_for(&[], &concepts, 30);
        assert_eq!(outline[1].key_points, vec!["Concept 1", "Concept 2", "Concept 3"]);
        assert_eq!(outline[2].key_points, vec!["Concept 4", "Concept 5"]);

        let outline = outline_for(&[], &[], 30);
        assert_eq!(outline[1].key_points, vec!["Coaching"]);
    }
}
