//! Focus-topic selection: how many topics a module of a given length covers.

use std::collections::HashSet;

use tracing::debug;
use trainforge_ingest::NoiseFilter;

use crate::topics::TopicCandidate;

/// Number of focus topics for a module of `minutes`.
pub fn desired_count(minutes: u32) -> usize {
    match minutes {
        0..=10 => 2,
        11..=20 => 3,
        21..=35 => 4,
        36..=60 => 5,
        _ => 6,
    }
}

/// Narrow extracted topics to the duration-appropriate count.
///
/// Candidates are taken in extractor order. When there are too few, unused
/// key concepts are appended as topics without supporting sentences.
pub fn select_focus_topics(
    topics: &[TopicCandidate],
    key_concepts: &[String],
    minutes: u32,
    noise: &NoiseFilter,
) -> Vec<TopicCandidate> {
    let wanted = desired_count(minutes);
    let mut seen: HashSet<String> = HashSet::new();
    let mut selected: Vec<TopicCandidate> = Vec::with_capacity(wanted);

    for topic in topics {
        if selected.len() >= wanted {
            break;
        }
        if noise.is_noise(&topic.title) || !seen.insert(topic.title.to_lowercase()) {
            continue;
        }
        selected.push(topic.clone());
    }

    let from_topics = selected.len();
    for concept in key_concepts {
        if selected.len() >= wanted {
            break;
        }
        if noise.is_noise(concept) || !seen.insert(concept.to_lowercase()) {
            continue;
        }
        selected.push(TopicCandidate::without_evidence(concept));
    }

    debug!(
        wanted,
        from_topics,
        backfilled = selected.len() - from_topics,
        "focus topics selected"
    );
    selected
}
