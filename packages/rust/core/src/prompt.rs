//! Module topic extraction from a free-form request prompt.

use std::sync::LazyLock;

use regex::Regex;

use crate::topics::title_case;

/// Topic used when the prompt names nothing usable.
pub const FALLBACK_TOPIC: &str = "General Training";

const MAX_TOPIC_TOKENS: usize = 12;
const MIN_TOPIC_CHARS: usize = 3;

/// Request phrasing that says nothing about the subject.
const REQUEST_STOP_WORDS: &[&str] = &[
    "make", "create", "generate", "training", "course", "lesson", "presentation", "ppt", "pdf",
    "minutes", "minute", "hour", "hours", "on", "about", "for", "a", "an", "the", "this", "that",
    "these", "those", "please", "kindly", "could", "would", "should", "need", "with", "into",
    "and", "to", "of", "in", "cover", "covered", "covering", "focus", "focusing", "develop",
    "build", "assemble", "design", "craft", "master", "class", "module", "session",
    "interactive", "blended", "masterclass",
];

/// Cut points for trailing directives ("... with quizzes").
const PHRASE_SPLITTERS: &[&str] = &[" with ", " including ", " featuring ", " plus ", " and "];

static FOCUS_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(
            r"\b(?:on|about|regarding|covering|focused on|focusing on|featuring|highlighting|walks through|walking through|examining|exploring|around|concerning)\s+([^.,;]+)",
        )
        .expect("valid regex"),
        Regex::new(r"\b(?:through|for)\s+([^.,;]+?)(?:\s+with|\s+including|\s+and|\s*$)")
            .expect("valid regex"),
    ]
});

static PROMPT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("valid regex"));

/// Derive the module topic from a request such as
/// "Create a 15 minute session on adult learning principles".
pub fn extract_topic(prompt: &str) -> String {
    let lowered = prompt.to_lowercase();

    for pattern in FOCUS_PATTERNS.iter() {
        if let Some(phrase) = pattern.captures(&lowered).and_then(|c| c.get(1)) {
            let candidate = clean_phrase(phrase.as_str());
            if candidate.chars().count() >= MIN_TOPIC_CHARS {
                return candidate;
            }
        }
    }

    let subject: Vec<&str> = PROMPT_TOKEN_RE
        .find_iter(prompt)
        .map(|m| m.as_str().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|t| !t.is_empty() && !is_stop_word(t))
        .collect();
    if !subject.is_empty() {
        let candidate = clean_phrase(&subject.join(" "));
        if candidate.chars().count() >= MIN_TOPIC_CHARS {
            return candidate;
        }
    }

    let fallback = clean_phrase(prompt);
    if fallback.is_empty() {
        FALLBACK_TOPIC.to_string()
    } else {
        fallback
    }
}

fn is_stop_word(token: &str) -> bool {
    REQUEST_STOP_WORDS.contains(&token.to_lowercase().as_str())
}

fn trim_phrase(phrase: &str) -> &str {
    phrase.trim_matches(|c| matches!(c, ' ' | '.' | ':' | '-'))
}

/// Cut trailing directives, drop request words, keep 12 tokens, title-case.
fn clean_phrase(phrase: &str) -> String {
    let mut phrase = trim_phrase(phrase);
    if phrase.is_empty() {
        return String::new();
    }

    for splitter in PHRASE_SPLITTERS {
        if let Some((head, _)) = phrase.split_once(splitter) {
            phrase = head;
        }
    }
    let phrase = trim_phrase(phrase);
    if phrase.is_empty() {
        return String::new();
    }

    let all: Vec<&str> = PROMPT_TOKEN_RE.find_iter(phrase).map(|m| m.as_str()).collect();
    let mut tokens: Vec<&str> = all.iter().copied().filter(|t| !is_stop_word(t)).collect();
    if tokens.is_empty() {
        tokens = all;
    }

    let joined = tokens
        .into_iter()
        .take(MAX_TOPIC_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");
    title_case(joined.trim())
}
