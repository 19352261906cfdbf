//! Legacy Adapter — the original single-formula quality score, preserved
//! byte-for-byte in shape for existing consumers.
//!
//! The enhanced model evolves independently; this path deliberately keeps
//! the old ×10 quantifiable scale (the enhanced impact metric uses ×8) and
//! the old `100 - avg_words * 2` conciseness curve.

use serde::Serialize;

use crate::analysis::sentences::{sentence_stats, SentenceSegmenter};
use crate::analysis::signals::{
    self, ActionVerbAnalysis, ConfigWarning, count_quantifiable,
};
use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyBreakdown {
    pub action_verbs: f64,
    pub quantifiable: f64,
    pub conciseness: f64,
}

/// The flat legacy schema: one overall score with three sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyQualityScore {
    pub overall_score: f64,
    pub action_verb_analysis: ActionVerbAnalysis,
    pub quantifiable_score: f64,
    pub conciseness_score: f64,
    pub breakdown: LegacyBreakdown,
}

/// Computes the legacy composite:
/// `action_verbs * 0.6 + quantifiable * 0.25 + conciseness * 0.15`.
pub fn legacy_quality_score(
    resume_text: &str,
    taxonomy: &Taxonomy,
    segmenter: &dyn SentenceSegmenter,
) -> (LegacyQualityScore, Option<ConfigWarning>) {
    let lines = signals::non_empty_lines(resume_text);
    let (action_verb_analysis, warning) = signals::extract_action_verbs(resume_text, taxonomy);

    let action_verb_score = if lines.is_empty() {
        0.0
    } else {
        // Average tier weight per bullet, scaled so ~2.0/line is a top score.
        (action_verb_analysis.weighted_score / lines.len() as f64 * 50.0).min(100.0)
    };

    // Legacy scale is ×10, intentionally different from the enhanced ×8.
    let quantifiable_score = ((count_quantifiable(resume_text) * 10) as f64).min(100.0);

    let stats = sentence_stats(resume_text, segmenter);
    let conciseness_score = (100.0 - stats.avg_words_per_sentence * 2.0).max(0.0);

    let overall =
        action_verb_score * 0.6 + quantifiable_score * 0.25 + conciseness_score * 0.15;

    (
        LegacyQualityScore {
            overall_score: overall.min(100.0),
            action_verb_analysis,
            quantifiable_score,
            conciseness_score,
            breakdown: LegacyBreakdown {
                action_verbs: action_verb_score,
                quantifiable: quantifiable_score,
                conciseness: conciseness_score,
            },
        },
        warning,
    )
}
