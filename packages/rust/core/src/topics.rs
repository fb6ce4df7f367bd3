//! Topic extraction from retrieved text.
//!
//! Candidates come from two places, in this order:
//! 1. Heading-like lines: lines with no lower-case letters, lines starting
//!    with a number (`1. `, `2) `), and lines opening with a marker word
//!    (topic, lesson, section, module, step, part, chapter). Leading
//!    enumeration and bullet characters are stripped.
//! 2. Frequency-ranked key concepts: bigrams first, then single words and
//!    capitalized spans.
//!
//! Each candidate must be backed by at least one sentence of the retrieved
//! text; candidates without evidence are dropped. If nothing survives, an
//! "Overview" topic carries the opening sentences.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use trainforge_ingest::{NoiseFilter, normalize_whitespace};

/// Most heading candidates collected from one request.
pub const MAX_HEADINGS: usize = 20;
/// Most key concepts extracted from one request.
pub const MAX_KEY_CONCEPTS: usize = 10;
/// Default cap on derived topics.
pub const MAX_TOPICS: usize = 8;

const MAX_HEADING_LINE_CHARS: usize = 120;
const MIN_HEADING_CHARS: usize = 4;
const MAX_SUPPORTING_SENTENCES: usize = 2;
const TOP_BIGRAMS: usize = 12;
const TOP_WORDS: usize = 20;

/// Title used when no candidate survives.
pub const OVERVIEW_TITLE: &str = "Overview";

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "your", "their", "have", "has",
    "been", "will", "shall", "should", "would", "could", "might", "can", "are", "were", "was",
    "is", "be", "being", "using", "use", "about", "around", "over", "through", "between", "among",
    "after", "before", "training", "module", "course", "lesson", "presentation", "section",
    "topic", "chapter", "learning", "minutes", "minute", "hour", "hours",
];

static LEADING_ENUMERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\-.)]+\s*").expect("valid regex"));

static NUMBERED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]?\s").expect("valid regex"));

static MARKER_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(topic|lesson|section|module|step|part|chapter)\b").expect("valid regex")
});

static CONCEPT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z][\w-]*\b").expect("valid regex"));

static PROPER_NOUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid regex"));

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// A titled topic with the sentences that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCandidate {
    pub title: String,
    /// At most two sentences from the retrieved text.
    pub sentences: Vec<String>,
    /// `sentences` joined with a space.
    pub summary: String,
}

impl TopicCandidate {
    fn with_sentences(title: impl Into<String>, sentences: Vec<String>) -> Self {
        let summary = sentences.join(" ").trim().to_string();
        Self {
            title: title.into(),
            sentences,
            summary,
        }
    }

    /// A topic known only by name, used when backfilling focus topics.
    pub fn without_evidence(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sentences: Vec::new(),
            summary: String::new(),
        }
    }

    pub fn has_evidence(&self) -> bool {
        !self.sentences.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// Collect heading-like lines from chunk texts, in source order.
pub fn heading_candidates<'a, I>(texts: I, noise: &NoiseFilter) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidates = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for text in texts {
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.chars().count() > MAX_HEADING_LINE_CHARS {
                continue;
            }

            let cleaned = LEADING_ENUMERATION_RE
                .replace(line, "")
                .trim_matches(|c| matches!(c, ':' | '-' | '•' | '*' | ' '))
                .to_string();
            if cleaned.chars().count() < MIN_HEADING_CHARS {
                continue;
            }

            let lowered = cleaned.to_lowercase();
            if seen.contains(&lowered) {
                continue;
            }

            let heading_like = is_upper_case(line)
                || NUMBERED_LINE_RE.is_match(line)
                || MARKER_WORD_RE.is_match(&lowered);

            if heading_like && !noise.is_noise(&cleaned) {
                candidates.push(cleaned);
                seen.insert(lowered);
                if candidates.len() >= MAX_HEADINGS {
                    return candidates;
                }
            }
        }
    }

    candidates
}

/// At least one cased character and no lower-case ones.
fn is_upper_case(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

// ---------------------------------------------------------------------------
// Key concepts
// ---------------------------------------------------------------------------

/// Occurrence counter that remembers first-seen order for tie-breaking.
#[derive(Default)]
struct PhraseCounter {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl PhraseCounter {
    fn add(&mut self, phrase: String) {
        match self.index.get(&phrase) {
            Some(&pos) => self.order[pos].1 += 1,
            None => {
                self.index.insert(phrase.clone(), self.order.len());
                self.order.push((phrase, 1));
            }
        }
    }

    /// The `n` most frequent phrases; equal counts keep first-seen order.
    fn most_common(&self, n: usize) -> Vec<&str> {
        let mut ranked: Vec<&(String, usize)> = self.order.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(p, _)| p.as_str()).collect()
    }
}

/// Frequency-ranked phrases from `text`, skipping the request `topic` itself.
pub fn key_concepts(text: &str, topic: &str, noise: &NoiseFilter) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let topic_lower = topic.to_lowercase();

    let tokens: Vec<&str> = CONCEPT_TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(&t.to_lowercase().as_str()))
        .collect();

    let mut words = PhraseCounter::default();
    let mut bigrams = PhraseCounter::default();

    for token in &tokens {
        if token.to_lowercase() != topic_lower {
            words.add(title_case(token));
        }
    }
    for pair in tokens.windows(2) {
        bigrams.add(title_case(&format!("{} {}", pair[0], pair[1])));
    }
    for noun in PROPER_NOUN_RE.find_iter(text) {
        let noun = noun.as_str().trim();
        if !noun.is_empty() && noun.to_lowercase() != topic_lower {
            words.add(noun.to_string());
        }
    }

    let mut concepts = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let ranked = bigrams
        .most_common(TOP_BIGRAMS)
        .into_iter()
        .chain(words.most_common(TOP_WORDS));

    for phrase in ranked {
        let lowered = phrase.to_lowercase();
        if seen.contains(&lowered) || noise.is_noise(phrase) {
            continue;
        }
        concepts.push(normalize_whitespace(phrase));
        seen.insert(lowered);
        if concepts.len() >= MAX_KEY_CONCEPTS {
            break;
        }
    }

    debug!(
        tokens = tokens.len(),
        concepts = concepts.len(),
        "key concepts extracted"
    );
    concepts
}

/// Upper-case each letter that follows a non-letter, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

/// Split after `.`, `!` or `?` when followed by whitespace; trimmed, non-empty.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut push = |piece: &str| {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
    };

    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if !chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            continue;
        }

        push(&text[start..i + c.len_utf8()]);
        start = text.len();
        while let Some(&(j, w)) = chars.peek() {
            if w.is_whitespace() {
                chars.next();
            } else {
                start = j;
                break;
            }
        }
    }
    if start < text.len() {
        push(&text[start..]);
    }

    sentences
}

fn word_set(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Evidence providers
// ---------------------------------------------------------------------------

/// Finds supporting sentences for a title. Tried in order until one answers.
type EvidenceProvider = fn(&str, &[String], &NoiseFilter) -> Vec<String>;

const EVIDENCE_CHAIN: &[EvidenceProvider] = &[matching_sentences, first_clean_sentence];

/// Up to two distinct, non-noise sentences sharing a word with the title.
fn matching_sentences(title: &str, sentences: &[String], noise: &NoiseFilter) -> Vec<String> {
    let keywords: Vec<String> = word_set(title)
        .into_iter()
        .filter(|w| w.chars().count() > 2)
        .collect();
    let whole_title = title.to_lowercase();

    let mut collected: Vec<String> = Vec::new();
    for sentence in sentences {
        let matched = if keywords.is_empty() {
            sentence.to_lowercase().contains(&whole_title)
        } else {
            let words = word_set(sentence);
            keywords.iter().any(|k| words.contains(k))
        };

        if matched && !noise.is_noise(sentence) && !collected.contains(sentence) {
            collected.push(sentence.clone());
            if collected.len() >= MAX_SUPPORTING_SENTENCES {
                break;
            }
        }
    }
    collected
}

/// The first usable sentence of the corpus.
fn first_clean_sentence(_title: &str, sentences: &[String], noise: &NoiseFilter) -> Vec<String> {
    sentences
        .iter()
        .find(|s| !noise.is_noise(s))
        .cloned()
        .into_iter()
        .collect()
}

fn find_evidence(title: &str, sentences: &[String], noise: &NoiseFilter) -> Vec<String> {
    EVIDENCE_CHAIN
        .iter()
        .map(|provider| provider(title, sentences, noise))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Topic assembly
// ---------------------------------------------------------------------------

/// Rank headings, then key concepts, into at most `max_topics` evidenced topics.
pub fn derive_topics(
    text: &str,
    headings: &[String],
    concepts: &[String],
    max_topics: usize,
    noise: &NoiseFilter,
) -> Vec<TopicCandidate> {
    let sentences = split_sentences(text);
    let mut topics: Vec<TopicCandidate> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in headings.iter().chain(concepts) {
        if topics.len() >= max_topics {
            break;
        }

        let title = normalize_whitespace(candidate);
        let lowered = title.to_lowercase();
        if title.is_empty() || seen.contains(&lowered) || noise.is_noise(&title) {
            continue;
        }

        let evidence = find_evidence(&title, &sentences, noise);
        if evidence.is_empty() {
            debug!(%title, "no supporting evidence, candidate dropped");
            continue;
        }

        topics.push(TopicCandidate::with_sentences(title, evidence));
        seen.insert(lowered);
    }

    if topics.is_empty() && !sentences.is_empty() {
        let opening = sentences.iter().take(MAX_SUPPORTING_SENTENCES).cloned().collect();
        topics.push(TopicCandidate::with_sentences(OVERVIEW_TITLE, opening));
    }

    debug!(
        sentences = sentences.len(),
        topics = topics.len(),
        "topics derived"
    );
    topics
}
