//! Paginated training manual.
//!
//! Every section is one page. Pages are numbered from 1 and follow the
//! module's order: title page, contents, objectives, content, activities,
//! assessment, resources.

use std::fmt::Write;

use serde::Serialize;
use tracing::debug;

use trainforge_shared::{ContentBlock, Module, Question};

use crate::slides::capitalize;

const MANUAL_DESCRIPTION: &str = "This training manual provides comprehensive coverage of the topic \
    with practical examples, interactive activities, and assessment opportunities.";

/// One manual page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualSection {
    pub page: u32,
    pub heading: String,
    /// Page body as Markdown, without the heading.
    pub body: String,
}

/// Lay out `module` as manual pages.
pub fn render_manual(module: &Module) -> Vec<ManualSection> {
    let mut sections: Vec<(String, String)> = vec![
        (module.metadata.title.clone(), title_page(module)),
        ("Learning Objectives".into(), objectives_page(module)),
        ("Training Content".into(), content_page(module)),
    ];

    if !module.activities.is_empty() {
        sections.push(("Activities".into(), activities_page(module)));
    }
    if !module.assessment.questions.is_empty() {
        sections.push(("Assessment".into(), assessment_page(module)));
    }
    sections.push(("Resources".into(), resources_page(module)));

    // Contents page goes second and lists everything after it.
    let contents = sections
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, (heading, _))| format!("{}. {heading} (page {})", i + 1, i + 3))
        .collect::<Vec<_>>()
        .join("\n");
    sections.insert(1, ("Table of Contents".into(), contents));

    let pages: Vec<ManualSection> = sections
        .into_iter()
        .zip(1..)
        .map(|((heading, body), page)| ManualSection {
            page,
            heading,
            body,
        })
        .collect();

    debug!(pages = pages.len(), "manual rendered");
    pages
}

/// Join pages into one Markdown document, separated by rules.
pub fn manual_to_markdown(sections: &[ManualSection]) -> String {
    let pages: Vec<String> = sections
        .iter()
        .map(|s| {
            let level = if s.page == 1 { "#" } else { "##" };
            format!("{level} {}\n\n{}\n", s.heading, s.body.trim_end())
        })
        .collect();
    pages.join("\n---\n\n")
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn title_page(module: &Module) -> String {
    let meta = &module.metadata;
    let format_type = match meta.format_type {
        trainforge_shared::FormatType::Presentation => "Presentation",
        trainforge_shared::FormatType::Document => "Document",
    };
    format!(
        "| | |\n|---|---|\n\
         | Duration | {} minutes |\n\
         | Learning Level | {} |\n\
         | Format | {format_type} |\n\
         | Created | {} |\n\n{MANUAL_DESCRIPTION}",
        meta.duration_minutes,
        capitalize(meta.learning_level.as_str()),
        meta.created_at.format("%Y-%m-%d"),
    )
}

fn objectives_page(module: &Module) -> String {
    format!(
        "By the end of this training module, you will be able to:\n\n{}",
        bullets(&module.learning_objectives)
    )
}

fn content_page(module: &Module) -> String {
    let mut out = String::from("### Content Overview\n");

    for section in &module.content_outline {
        let _ = write!(
            out,
            "\n**{} ({} minutes)**\n\n{}\n",
            section.section,
            section.duration_minutes,
            bullets(&section.key_points)
        );
    }

    out.push_str("\n### Detailed Content\n");
    for block in &module.detailed_content {
        match block {
            ContentBlock::Introduction {
                title,
                overview,
                importance,
                preview,
                ..
            } => {
                let _ = write!(out, "\n#### {title}\n\n{overview} {importance}\n\n{preview}\n");
            }
            ContentBlock::MainContent {
                title,
                explanation,
                examples,
                best_practices,
                ..
            } => {
                let _ = write!(
                    out,
                    "\n#### {title}\n\n{explanation}\n\nExamples:\n\n{}\n\nBest Practices:\n\n{}\n",
                    bullets(examples),
                    bullets(best_practices)
                );
            }
            // Activities get their own page.
            ContentBlock::Activity { .. } => {}
        }
    }

    out
}

fn activities_page(module: &Module) -> String {
    let mut out = String::new();
    for (i, activity) in module.activities.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "### {}\n\n*{} · {} minutes*\n\n{}\n\n",
            activity.title,
            activity.kind.label(),
            activity.duration_minutes,
            activity.description
        );
        for (step, instruction) in activity.instructions.iter().enumerate() {
            let _ = writeln!(out, "{}. {instruction}", step + 1);
        }
    }
    out
}

fn assessment_page(module: &Module) -> String {
    let mut out = String::new();
    for (i, question) in module.assessment.questions.iter().enumerate() {
        let _ = write!(
            out,
            "**{}. {}** _({})_\n\n",
            i + 1,
            question.prompt(),
            question.kind_label()
        );
        match question {
            Question::MultipleChoice { options, .. } => {
                for (letter, option) in ('a'..='z').zip(options) {
                    let _ = writeln!(out, "   {letter}) {option}");
                }
            }
            Question::TrueFalse { .. } => out.push_str("   True / False\n"),
            Question::ShortAnswer {
                expected_elements, ..
            } => {
                out.push_str("   Look for:\n");
                for element in expected_elements {
                    let _ = writeln!(out, "   - {element}");
                }
            }
            Question::Scenario {
                evaluation_criteria,
                ..
            }
            | Question::ProjectPlan {
                evaluation_criteria,
                ..
            } => {
                out.push_str("   Evaluated on:\n");
                for criterion in evaluation_criteria {
                    let _ = writeln!(out, "   - {criterion}");
                }
            }
        }
        out.push('\n');
    }
    out
}

fn resources_page(module: &Module) -> String {
    if module.resources.is_empty() {
        return "No source documents were used.".into();
    }
    module
        .resources
        .iter()
        .map(|r| {
            format!(
                "- **{}** ({}), relevance {:.2}: {}",
                r.title, r.kind, r.relevance_score, r.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::tests::sample_module;

    #[test]
    fn pages_follow_module_order() {
        let pages = render_manual(&sample_module());
        let headings: Vec<&str> = pages.iter().map(|p| p.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "Training Module: Coaching",
                "Table of Contents",
                "Learning Objectives",
                "Training Content",
                "Activities",
                "Assessment",
                "Resources",
            ]
        );
        let numbers: Vec<u32> = pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<u32>>());
    }

    #[test]
    fn contents_page_points_at_pages() {
        let pages = render_manual(&sample_module());
        let contents = &pages[1].body;
        assert!(contents.starts_with("1. Learning Objectives (page 3)"));
        assert!(contents.ends_with("5. Resources (page 7)"));
    }

    #[test]
    fn optional_pages_are_skipped() {
        let mut module = sample_module();
        module.activities.clear();
        module.assessment.questions.clear();
        let pages = render_manual(&module);
        assert_eq!(pages.len(), 5);
        assert_eq!(pages[4].heading, "Resources");
        assert!(pages[1].body.ends_with("3. Resources (page 5)"));
    }

    #[test]
    fn content_page_keeps_block_order_without_activity_blocks() {
        let pages = render_manual(&sample_module());
        let body = &pages[3].body;
        let intro = body.find("#### Introduction to Coaching").expect("intro");
        let feedback = body.find("#### Feedback").expect("feedback");
        assert!(intro < feedback);
        assert!(!body.contains("Hands-on Activity"));
    }

    #[test]
    fn markdown_joins_pages() {
        let markdown = manual_to_markdown(&render_manual(&sample_module()));
        assert!(markdown.starts_with("# Training Module: Coaching\n"));
        assert!(markdown.contains("## Learning Objectives"));
        assert_eq!(markdown.matches("\n---\n").count(), 6);
        assert!(markdown.contains("| Created | 2025-03-01 |"));
    }
}
