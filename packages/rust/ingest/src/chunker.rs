//! Sentence-aligned sliding-window chunker.
//!
//! Windows are measured in characters. A window that does not reach the end
//! of the text is pulled back to just after the last `.`, `!` or `?` inside
//! it, so chunks tend to end on sentence boundaries. Consecutive windows
//! share `overlap` characters.

use std::ops::Range;

use trainforge_shared::{ChunkingConfig, Result, TrainforgeError};

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Splits text into overlapping, sentence-aligned chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

impl Chunker {
    /// Create a chunker; `overlap` must be smaller than `size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 || overlap >= size {
            return Err(TrainforgeError::validation(format!(
                "invalid chunk window: size {size}, overlap {overlap}"
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Untrimmed character ranges of each window, in text order.
    ///
    /// Start offsets strictly increase and the ranges jointly cover every
    /// character of `text`.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<char> = text.chars().collect();
        self.spans_of(&chars)
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.spans_of(&chars)
            .into_iter()
            .filter_map(|span| {
                let piece: String = chars[span].iter().collect();
                let trimmed = piece.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    fn spans_of(&self, chars: &[char]) -> Vec<Range<usize>> {
        let len = chars.len();
        if len == 0 {
            return Vec::new();
        }
        if len <= self.size {
            return vec![0..len];
        }

        let mut spans = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = (start + self.size).min(len);

            if end < len {
                let window = &chars[start..end];
                if let Some(pos) = window.iter().rposition(|c| SENTENCE_TERMINATORS.contains(c)) {
                    if pos > 0 {
                        end = start + pos + 1;
                    }
                }
            }

            spans.push(start..end);

            if end >= len {
                break;
            }

            // A sentence cut shorter than the overlap would move backwards.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {i} explains one idea about adult learners."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_text_is_one_trimmed_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("   Adults learn best by doing.  \n");
        assert_eq!(chunks, vec!["Adults learn best by doing.".to_string()]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.spans("").is_empty());
    }

    #[test]
    fn long_text_cuts_after_sentence_terminators() {
        let chunker = Chunker::new(200, 40).expect("chunker");
        let text = sample_text(20);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.ends_with('.'), "chunk not sentence aligned: {chunk:?}");
        }
    }

    #[test]
    fn spans_strictly_increase_and_cover_input() {
        let chunker = Chunker::new(120, 30).expect("chunker");
        let text = format!("{} trailing words without a stop", sample_text(15));
        let len = text.chars().count();
        let spans = chunker.spans(&text);

        for pair in spans.windows(2) {
            assert!(pair[1].start > pair[0].start);
            // No gap between consecutive windows.
            assert!(pair[1].start <= pair[0].end);
        }
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans.last().map(|s| s.end), Some(len));
    }

    #[test]
    fn overlap_repeats_text_between_chunks() {
        let chunker = Chunker::new(100, 50).expect("chunker");
        let text = "x".repeat(250);
        let spans = chunker.spans(&text);
        assert_eq!(spans, vec![0..100, 50..150, 100..200, 150..250]);
    }

    #[test]
    fn short_sentence_cut_still_advances() {
        // The only terminator sits near the window start, so the cut is
        // shorter than the overlap.
        let chunker = Chunker::new(50, 40).expect("chunker");
        let text = format!("Hi. {}", "y".repeat(120));
        let spans = chunker.spans(&text);
        assert_eq!(spans[0], 0..3);
        assert!(spans[1].start > spans[0].start);
        assert_eq!(spans.last().map(|s| s.end), Some(text.chars().count()));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let chunker = Chunker::new(10, 2).expect("chunker");
        let text = "éééééééééé. ñññññññññ. üüüüü";
        let chunks = chunker.chunk(text);
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert!(chunks[0].starts_with('é'));
    }

    #[test]
    fn invalid_window_is_rejected() {
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::from_config(&ChunkingConfig::default()).is_ok());
    }
}
