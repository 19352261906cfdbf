//! Composite Scorer — runs the extractors, the five metric calculators, and
//! combines them into one weighted overall score.
//!
//! Weights are fixed design constants. When the optional job description is
//! absent, relevance is reported as not applicable, its weight is dropped,
//! and the remaining weights are renormalized to sum to 1.0.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::analysis::metrics::{self, MetricResult};
use crate::analysis::sentences::{sentence_stats, SentenceSegmenter};
use crate::analysis::signals::{self, ConfigWarning};
use crate::analysis::similarity::{semantic_similarity, Embedder};
use crate::taxonomy::Taxonomy;

pub const ENGINE_VERSION: &str = "2.0";

const RELEVANCE_WEIGHT: f64 = 0.25;
const IMPACT_WEIGHT: f64 = 0.30;
const STRUCTURE_WEIGHT: f64 = 0.20;
const CLARITY_WEIGHT: f64 = 0.15;
const GAPS_WEIGHT: f64 = 0.10;

/// Derived, never requested: a blank job description means quality-check mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    QualityCheck,
    FullAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMetadata {
    pub version: &'static str,
    /// Number of metrics that were actually computed.
    pub metric_count: usize,
    pub mode: AnalysisMode,
    pub warnings: Vec<ConfigWarning>,
    pub analyzed_at: DateTime<Utc>,
}

/// The full multi-metric result of one scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub relevance: MetricResult,
    pub impact: MetricResult,
    pub structure: MetricResult,
    pub clarity: MetricResult,
    pub gaps: MetricResult,
    pub overall_score: f64,
    pub metadata: ScoreMetadata,
}

/// Treats blank or whitespace-only job descriptions as absent.
pub fn normalize_job_description(job_description: Option<&str>) -> Option<&str> {
    job_description.map(str::trim).filter(|jd| !jd.is_empty())
}

/// Scores a resume against an optional job description.
///
/// Pure over its inputs apart from the embedding call; taxonomy failures
/// degrade to empty signals with warnings in the metadata, and an embedding
/// failure degrades semantic similarity to zero — neither fails the request.
pub async fn enhanced_resume_score(
    resume_text: &str,
    job_description: Option<&str>,
    taxonomy: &Taxonomy,
    embedder: &dyn Embedder,
    segmenter: &dyn SentenceSegmenter,
) -> CompositeScore {
    let job_description = normalize_job_description(job_description);
    let mode = match job_description {
        Some(_) => AnalysisMode::FullAnalysis,
        None => AnalysisMode::QualityCheck,
    };

    let lines = signals::non_empty_lines(resume_text);
    let mut warnings = Vec::new();

    let (verbs, warning) = signals::extract_action_verbs(resume_text, taxonomy);
    warnings.extend(warning);
    let (resume_skills, warning) = signals::extract_skills(resume_text, taxonomy);
    warnings.extend(warning);
    let (resume_terms, warning) = signals::count_technical_terms(resume_text, taxonomy);
    warnings.extend(warning);
    let stats = sentence_stats(resume_text, segmenter);

    let impact = MetricResult::Computed(metrics::impact_score(resume_text, &verbs, lines.len()));
    let structure = MetricResult::Computed(metrics::structure_score(resume_text, &lines));
    let clarity = MetricResult::Computed(metrics::clarity_score(&lines, &stats, resume_terms));

    let (relevance, gaps) = match job_description {
        Some(jd) => {
            let (matched, missing, warning) =
                metrics::analyze_keywords(&resume_skills, jd, taxonomy);
            warnings.extend(warning);
            let (jd_terms, warning) = signals::count_technical_terms(jd, taxonomy);
            warnings.extend(warning);

            let similarity = match semantic_similarity(embedder, resume_text, jd).await {
                Ok(similarity) => f64::from(similarity),
                Err(e) => {
                    warn!("embedding degraded, semantic similarity treated as zero: {e}");
                    warnings.push(ConfigWarning {
                        source: "embedding".to_string(),
                        message: e.to_string(),
                    });
                    0.0
                }
            };

            (
                MetricResult::Computed(metrics::relevance_score(
                    similarity,
                    &matched,
                    &missing,
                    resume_terms,
                    jd_terms,
                )),
                MetricResult::Computed(metrics::gaps_score(&matched, &missing, jd)),
            )
        }
        None => (
            MetricResult::NotApplicable {
                explanation: "no job description provided".to_string(),
            },
            MetricResult::Computed(metrics::gaps_score_without_jd()),
        ),
    };

    warnings.dedup();

    let weighted = [
        (&relevance, RELEVANCE_WEIGHT),
        (&impact, IMPACT_WEIGHT),
        (&structure, STRUCTURE_WEIGHT),
        (&clarity, CLARITY_WEIGHT),
        (&gaps, GAPS_WEIGHT),
    ];
    let overall_score = combine(&weighted);
    let metric_count = weighted.iter().filter(|(m, _)| m.is_applicable()).count();

    CompositeScore {
        relevance,
        impact,
        structure,
        clarity,
        gaps,
        overall_score,
        metadata: ScoreMetadata {
            version: ENGINE_VERSION,
            metric_count,
            mode,
            warnings,
            analyzed_at: Utc::now(),
        },
    }
}

/// Weighted mean over the applicable metrics, with absent weights dropped
/// and the rest renormalized to sum to 1.0.
fn combine(weighted: &[(&MetricResult, f64)]) -> f64 {
    let mut score_sum = 0.0;
    let mut weight_sum = 0.0;
    for (metric, weight) in weighted {
        if let Some(score) = metric.score() {
            score_sum += score * weight;
            weight_sum += weight;
        }
    }
    if weight_sum == 0.0 {
        return 0.0;
    }
    (score_sum / weight_sum).min(100.0)
}
