//! Boilerplate and disclaimer suppression.
//!
//! Uploaded decks and manuals repeat legal footers on every page. Those lines
//! are matched against a fixed set of fingerprints: lower-cased text with
//! everything but ASCII letters and digits removed, so spacing, punctuation
//! and dashes in the footer never matter.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Built-in fingerprints, already in compact form.
const DEFAULT_SIGNATURES: &[&str] = &[
    "confidentialtoamericanexpress",
    // footer split mid-word across a page break
    "identialtoamericanexpress",
    "withoutamericanexpresswrittenconsent",
    "withoutamerican",
    "donotdistribute",
    "forinternaluseonly",
    "allrightsreserved",
    "cannotbesharedwiththirdparties",
    "cannotshared",
    "sharedthird",
    "thirdarties",
    "proprietaryandconfidential",
    "strictlyconfidential",
    "withoutwrittenconsent",
    "withoutpriorwrittenconsent",
];

/// A kept line may appear at most this many times in cleaned output.
pub const DUPLICATE_LINE_CAP: usize = 2;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Detects and strips boilerplate lines.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    signatures: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            signatures: DEFAULT_SIGNATURES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl NoiseFilter {
    /// Built-in fingerprints plus `extra` phrases (normalized on the way in).
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for phrase in extra {
            let signature = compact(phrase.as_ref());
            if !signature.is_empty() && !filter.signatures.contains(&signature) {
                filter.signatures.push(signature);
            }
        }
        filter
    }

    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Whether any fingerprint occurs in the compacted form of `text`.
    pub fn contains_signature(&self, text: &str) -> bool {
        let compacted = compact(text);
        self.signatures.iter().any(|sig| compacted.contains(sig.as_str()))
    }

    /// Drop boilerplate lines and cap repeated lines.
    ///
    /// Blank lines are removed, kept lines have their whitespace collapsed,
    /// and the result is joined with `\n`.
    pub fn clean_text(&self, text: &str) -> String {
        let mut kept: Vec<String> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || self.contains_signature(line) {
                continue;
            }

            let normalized = normalize_whitespace(line);
            let count = seen.entry(normalized.clone()).or_insert(0);
            if *count >= DUPLICATE_LINE_CAP {
                continue;
            }
            *count += 1;
            kept.push(normalized);
        }

        kept.join("\n")
    }

    /// Whether a candidate title or sentence carries no usable content.
    pub fn is_noise(&self, text: &str) -> bool {
        if text.trim().is_empty() || self.contains_signature(text) {
            return true;
        }

        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();
        let Some(first) = tokens.first() else {
            return true;
        };

        // "ok ok ok" style filler
        if tokens.len() > 1 && tokens.iter().all(|t| t == first) {
            return true;
        }

        normalize_whitespace(text).chars().count() <= 3
    }
}

/// Lower-case `text` and keep only ASCII letters and digits.
pub fn compact(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclaimer_line_is_dropped() {
        let filter = NoiseFilter::default();
        let input = "Adults learn by doing.\nConfidential — do not distribute\nThey value autonomy.";
        let cleaned = filter.clean_text(input);
        assert_eq!(cleaned, "Adults learn by doing.\nThey value autonomy.");
        assert!(!cleaned.to_lowercase().contains("distribute"));
    }

    #[test]
    fn vendor_confidentiality_footers_are_dropped() {
        let filter = NoiseFilter::default();
        let input = "Keep me.\nConfidential to American Express\nWithout American Express written consent";
        assert_eq!(filter.clean_text(input), "Keep me.");
    }

    #[test]
    fn truncated_confidentiality_footer_is_dropped() {
        let filter = NoiseFilter::default();
        assert!(filter.contains_signature("...idential to American Express"));
        assert!(filter.contains_signature("not to be used without American Express approval"));
        assert!(!filter.contains_signature("Keep learner records confidential."));
    }

    #[test]
    fn footer_with_odd_spacing_still_matches() {
        let filter = NoiseFilter::default();
        assert!(filter.contains_signature("ALL  RIGHTS-RESERVED ©2024"));
        assert!(filter.contains_signature("For Internal Use Only."));
    }

    #[test]
    fn repeated_line_is_capped_at_two() {
        let filter = NoiseFilter::default();
        let input = "Review the checklist.\n".repeat(5);
        let cleaned = filter.clean_text(&input);
        assert_eq!(cleaned.lines().filter(|l| *l == "Review the checklist.").count(), 2);
    }

    #[test]
    fn duplicate_cap_uses_normalized_whitespace() {
        let filter = NoiseFilter::default();
        let input = "Step  one\nStep one\n  Step\tone  ";
        let cleaned = filter.clean_text(input);
        assert_eq!(cleaned, "Step one\nStep one");
    }

    #[test]
    fn blank_lines_are_removed() {
        let filter = NoiseFilter::default();
        assert_eq!(filter.clean_text("a line\n\n   \nanother"), "a line\nanother");
    }

    #[test]
    fn is_noise_classifies_candidates() {
        let filter = NoiseFilter::default();
        assert!(filter.is_noise(""));
        assert!(filter.is_noise("   "));
        assert!(filter.is_noise("---"));
        assert!(filter.is_noise("abc"));
        assert!(filter.is_noise("page page page"));
        assert!(filter.is_noise("Do not distribute"));
        assert!(!filter.is_noise("Self-Direction"));
        assert!(!filter.is_noise("Adult Readiness to Learn"));
    }

    #[test]
    fn extra_signatures_are_normalized() {
        let filter = NoiseFilter::with_extra(["Acme Corp — Internal"]);
        assert!(filter.signatures().iter().any(|s| s == "acmecorpinternal"));
        assert!(filter.is_noise("ACME CORP INTERNAL draft"));
        assert_eq!(filter.clean_text("keep me\nAcme corp internal"), "keep me");
    }
}
