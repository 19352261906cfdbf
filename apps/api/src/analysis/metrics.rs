//! Metric Calculators — the five bounded [0,100] sub-scores of the composite
//! model: relevance, impact, structure, clarity, and gaps.
//!
//! Every calculator is a pure function over extracted signals. Denominators
//! are floored with `max(_, 1)` so empty input yields well-defined limits,
//! never a division error.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::json;

use crate::analysis::sentences::SentenceStats;
use crate::analysis::signals::{
    self, ActionVerbAnalysis, ConfigWarning, count_bullet_lines, count_leadership_phrases,
    count_outcome_phrases, count_quantifiable, detect_sections, word_count,
};
use crate::parser;
use crate::taxonomy::Taxonomy;

/// A computed metric: bounded score, component breakdown in [0,1], and
/// free-form details for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub score: f64,
    pub components: BTreeMap<String, f64>,
    pub details: serde_json::Value,
}

/// A metric outcome. `NotApplicable` is the explicit "cannot be computed
/// without optional input" state — distinct from a score of zero, and
/// serialized with `"score": null` so consumers never confuse the two.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricResult {
    Computed(MetricScore),
    NotApplicable { explanation: String },
}

impl MetricResult {
    pub fn score(&self) -> Option<f64> {
        match self {
            MetricResult::Computed(metric) => Some(metric.score),
            MetricResult::NotApplicable { .. } => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, MetricResult::Computed(_))
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricResult::Computed(metric) => metric.serialize(serializer),
            MetricResult::NotApplicable { explanation } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("score", &Option::<f64>::None)?;
                map.serialize_entry("explanation", explanation)?;
                map.end()
            }
        }
    }
}

/// Matched/missing skill split between resume and job description.
///
/// Required skills are extracted from the JD with the same alias-substring
/// rules used on the resume, so both sides speak canonical names.
pub fn analyze_keywords(
    resume_skills: &BTreeSet<String>,
    job_description: &str,
    taxonomy: &Taxonomy,
) -> (BTreeSet<String>, BTreeSet<String>, Option<ConfigWarning>) {
    let (required, warning) = signals::extract_skills(job_description, taxonomy);

    let matched = required.intersection(resume_skills).cloned().collect();
    let missing = required.difference(resume_skills).cloned().collect();
    (matched, missing, warning)
}

/// Relevance: semantic similarity (0.4) + keyword match rate (0.4) +
/// domain alignment (0.2), scaled to [0,100]. Requires a job description.
pub fn relevance_score(
    semantic_similarity: f64,
    matched: &BTreeSet<String>,
    missing: &BTreeSet<String>,
    resume_technical_terms: usize,
    jd_technical_terms: usize,
) -> MetricScore {
    let keyword_match_rate = matched.len() as f64 / (matched.len() + missing.len()).max(1) as f64;

    // Ratio of technical-term counts capped at 1.0; neutral 0.5 when the JD
    // carries no technical terms at all.
    let domain_alignment = if jd_technical_terms == 0 {
        0.5
    } else {
        (resume_technical_terms as f64 / jd_technical_terms as f64).min(1.0)
    };

    let score = ((semantic_similarity * 0.4 + keyword_match_rate * 0.4 + domain_alignment * 0.2)
        * 100.0)
        .min(100.0);

    MetricScore {
        score,
        components: BTreeMap::from([
            ("semantic_similarity".to_string(), semantic_similarity),
            ("keyword_match_rate".to_string(), keyword_match_rate),
            ("domain_alignment".to_string(), domain_alignment),
        ]),
        details: json!({
            "matched_skills": matched,
            "missing_skills": missing,
            "resume_technical_terms": resume_technical_terms,
            "jd_technical_terms": jd_technical_terms,
        }),
    }
}

/// Impact: action-verb strength (0.4) + quantifiable achievements (0.3) +
/// leadership phrases (0.2) + outcome phrases (0.1).
pub fn impact_score(text: &str, verbs: &ActionVerbAnalysis, line_count: usize) -> MetricScore {
    let action_verb_strength =
        (verbs.weighted_score / line_count.max(1) as f64 * 50.0).min(100.0);

    let quantifiable_count = count_quantifiable(text);
    let quantifiable = ((quantifiable_count * 8) as f64).min(100.0);

    let leadership_count = count_leadership_phrases(text);
    let leadership = ((leadership_count * 20) as f64).min(100.0);

    let outcome_count = count_outcome_phrases(text);
    let outcomes = ((outcome_count * 20) as f64).min(100.0);

    let score =
        action_verb_strength * 0.4 + quantifiable * 0.3 + leadership * 0.2 + outcomes * 0.1;

    MetricScore {
        score: score.min(100.0),
        components: BTreeMap::from([
            ("action_verb_strength".to_string(), action_verb_strength / 100.0),
            ("quantifiable".to_string(), quantifiable / 100.0),
            ("leadership".to_string(), leadership / 100.0),
            ("outcomes".to_string(), outcomes / 100.0),
        ]),
        details: json!({
            "weighted_verb_score": verbs.weighted_score,
            "total_verbs": verbs.total_verbs,
            "quantifiable_count": quantifiable_count,
            "leadership_count": leadership_count,
            "outcome_count": outcome_count,
        }),
    }
}

/// Structure: section coverage (0.3) + contact info (0.2) + length band
/// (0.25) + bullet hierarchy (0.25).
pub fn structure_score(text: &str, lines: &[&str]) -> MetricScore {
    let sections = detect_sections(lines);
    let section_score = ((sections.len() * 25) as f64).min(100.0);

    let contact_score = if parser::has_email(text) { 50.0 } else { 0.0 }
        + if parser::has_phone(text) { 50.0 } else { 0.0 };

    let words = word_count(text);
    let length_score = match words {
        300..=800 => 100.0,
        200..=299 | 801..=1200 => 70.0,
        _ => 40.0,
    };

    // Zero-bullet documents get a flat 30, not zero: prose resumes are
    // penalized but not written off.
    let bullet_count = count_bullet_lines(lines);
    let hierarchy_score = if bullet_count > 0 {
        ((bullet_count * 5) as f64).min(100.0)
    } else {
        30.0
    };

    let score = section_score * 0.3
        + contact_score * 0.2
        + length_score * 0.25
        + hierarchy_score * 0.25;

    MetricScore {
        score: score.min(100.0),
        components: BTreeMap::from([
            ("sections".to_string(), section_score / 100.0),
            ("contact".to_string(), contact_score / 100.0),
            ("length".to_string(), length_score / 100.0),
            ("hierarchy".to_string(), hierarchy_score / 100.0),
        ]),
        details: json!({
            "sections_found": sections,
            "word_count": words,
            "bullet_count": bullet_count,
        }),
    }
}

/// Clarity: conciseness (0.5) + readability (0.3) + precision (0.2).
pub fn clarity_score(
    lines: &[&str],
    stats: &SentenceStats,
    technical_term_count: usize,
) -> MetricScore {
    let avg = stats.avg_words_per_sentence;
    let conciseness = if avg <= 15.0 {
        100.0
    } else if avg <= 20.0 {
        80.0
    } else if avg <= 25.0 {
        60.0
    } else {
        (100.0 - (avg - 25.0) * 4.0).max(0.0)
    };

    let complex_ratio = if stats.total_words > 0 {
        stats.complex_word_count as f64 / stats.total_words as f64
    } else {
        0.0
    };
    // Sentences per non-empty line; dense run-on bullets read badly.
    let sentence_density = stats.sentence_count as f64 / lines.len().max(1) as f64;
    let readability =
        (100.0 - complex_ratio * 100.0 - (sentence_density - 1.5).max(0.0) * 20.0).max(0.0);

    let precision = ((technical_term_count * 3) as f64).min(100.0);

    let score = conciseness * 0.5 + readability * 0.3 + precision * 0.2;

    MetricScore {
        score: score.min(100.0),
        components: BTreeMap::from([
            ("conciseness".to_string(), conciseness / 100.0),
            ("readability".to_string(), readability / 100.0),
            ("precision".to_string(), precision / 100.0),
        ]),
        details: json!({
            "avg_words_per_sentence": avg,
            "sentence_count": stats.sentence_count,
            "complex_word_count": stats.complex_word_count,
            "technical_term_count": technical_term_count,
        }),
    }
}

/// An improvement suggestion attached to the gaps metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSuggestion {
    pub skill: String,
    pub suggestion: String,
    pub critical: bool,
}

/// Gaps, inverse-framed as completion: `100 - missing_ratio * 100`.
/// Requires a job description to identify anything as missing.
pub fn gaps_score(
    matched: &BTreeSet<String>,
    missing: &BTreeSet<String>,
    job_description: &str,
) -> MetricScore {
    let missing_ratio = missing.len() as f64 / (matched.len() + missing.len()).max(1) as f64;
    let score = 100.0 - missing_ratio * 100.0;

    let suggestions: Vec<GapSuggestion> = missing
        .iter()
        .take(3)
        .map(|skill| GapSuggestion {
            skill: skill.clone(),
            suggestion: format!("Consider adding '{skill}' to your resume"),
            critical: is_critical_gap(skill, job_description),
        })
        .collect();

    MetricScore {
        score,
        components: BTreeMap::from([("completion".to_string(), 1.0 - missing_ratio)]),
        details: json!({
            "identified_gaps": missing,
            "matched_count": matched.len(),
            "missing_count": missing.len(),
            "improvement_suggestions": suggestions,
        }),
    }
}

/// A gap is critical when the JD mentions the skill on a line that also says
/// "required" or "must have".
fn is_critical_gap(skill: &str, job_description: &str) -> bool {
    let skill_lower = skill.to_lowercase();
    job_description.lines().any(|line| {
        let line = line.to_lowercase();
        line.contains(&skill_lower) && (line.contains("required") || line.contains("must have"))
    })
}

/// The gaps metric in quality-check mode: nothing can be missing without a
/// job description, so completion is full and the gap list empty.
pub fn gaps_score_without_jd() -> MetricScore {
    MetricScore {
        score: 100.0,
        components: BTreeMap::from([("completion".to_string(), 1.0)]),
        details: json!({
            "identified_gaps": [],
            "matched_count": 0,
            "missing_count": 0,
            "improvement_suggestions": [],
        }),
    }
}
