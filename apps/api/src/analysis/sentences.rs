//! Sentence segmentation collaborator and derived statistics.
//!
//! Segmentation quality is explicitly out of scope; the engine consumes
//! whatever the segmenter returns. `RuleSegmenter` is the default in-process
//! backend; a smarter NLP service can be swapped in behind the trait.

use serde::Serialize;

/// Pluggable sentence segmentation boundary.
pub trait SentenceSegmenter: Send + Sync {
    /// Splits text into non-empty trimmed sentences.
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Rule-based splitter on `.`, `!`, `?` terminators.
pub struct RuleSegmenter;

impl SentenceSegmenter for RuleSegmenter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for (idx, c) in text.char_indices() {
            if matches!(c, '.' | '!' | '?') {
                let sentence = text[start..idx].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = idx + c.len_utf8();
            }
        }
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }
}

/// Word-level statistics over segmented sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentenceStats {
    pub sentence_count: usize,
    pub total_words: usize,
    pub avg_words_per_sentence: f64,
    /// Alphabetic tokens longer than six characters.
    pub complex_word_count: usize,
}

pub fn sentence_stats(text: &str, segmenter: &dyn SentenceSegmenter) -> SentenceStats {
    let sentences = segmenter.split(text);
    let sentence_count = sentences.len();

    let total_words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();

    let complex_word_count = text
        .split_whitespace()
        .filter(|w| w.len() > 6 && w.chars().all(|c| c.is_alphabetic()))
        .count();

    let avg_words_per_sentence = if sentence_count > 0 {
        total_words as f64 / sentence_count as f64
    } else {
        0.0
    };

    SentenceStats {
        sentence_count,
        total_words,
        avg_words_per_sentence,
        complex_word_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_segmenter_splits_on_terminators() {
        let sentences = RuleSegmenter.split("First sentence. Second one! A third? Trailing");
        assert_eq!(
            sentences,
            vec!["First sentence", "Second one", "A third", "Trailing"]
        );
    }

    #[test]
    fn test_rule_segmenter_empty_text() {
        assert!(RuleSegmenter.split("").is_empty());
        assert!(RuleSegmenter.split("   \n  ").is_empty());
    }

    #[test]
    fn test_stats_average_words() {
        let stats = sentence_stats("one two three. four five six seven.", &RuleSegmenter);
        assert_eq!(stats.sentence_count, 2);
        assert_eq!(stats.total_words, 7);
        assert!((stats.avg_words_per_sentence - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_complex_words() {
        // "architecture" and "deployment" exceed six alphabetic characters;
        // "pipeline" does too, "CI/CD" has non-alphabetic characters.
        let stats = sentence_stats("architecture deployment pipeline CI/CD now", &RuleSegmenter);
        assert_eq!(stats.complex_word_count, 3);
    }

    #[test]
    fn test_stats_empty_text_is_all_zero() {
        let stats = sentence_stats("", &RuleSegmenter);
        assert_eq!(stats, SentenceStats::default());
    }
}
