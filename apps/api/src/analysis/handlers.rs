//! Axum route handlers for the Analysis API.

use std::collections::BTreeSet;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::analysis::composite::{
    enhanced_resume_score, normalize_job_description, AnalysisMode, CompositeScore,
};
use crate::analysis::legacy::{legacy_quality_score, LegacyQualityScore};
use crate::analysis::metrics::analyze_keywords;
use crate::analysis::signals::extract_skills;
use crate::errors::AppError;
use crate::parser;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// Full analysis payload: extracted basics, keyword split, the enhanced
/// composite, and the legacy flat score for backward-compatible consumers.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub mode: AnalysisMode,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: BTreeSet<String>,
    pub matched_keywords: BTreeSet<String>,
    pub missing_keywords: BTreeSet<String>,
    pub enhanced: CompositeScore,
    pub legacy: LegacyQualityScore,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Scores raw resume text against an optional job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let report = build_report(
        &request.resume_text,
        request.job_description.as_deref(),
        &state,
    )
    .await;

    Ok(Json(report))
}

/// POST /api/v1/analyze/upload
///
/// Multipart variant: a `resume` PDF plus an optional `job_description`
/// field. The upload is staged to a temp file, text-extracted, then scored
/// by the same pipeline. Extraction failure is fatal for the request.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut resume_bytes: Option<Vec<u8>> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("resume") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
                resume_bytes = Some(bytes.to_vec());
            }
            Some("job_description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read field: {e}")))?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let resume_bytes = resume_bytes
        .ok_or_else(|| AppError::Validation("no resume file found".to_string()))?;
    if resume_bytes.is_empty() {
        return Err(AppError::Validation("uploaded resume is empty".to_string()));
    }

    // Staged under a unique name and removed when the guard drops.
    let staged = tempfile::Builder::new()
        .prefix(&format!("resume-{}-", Uuid::new_v4()))
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| AppError::Internal(e.into()))?;
    std::fs::write(staged.path(), &resume_bytes).map_err(|e| AppError::Internal(e.into()))?;

    let resume_text = parser::extract_text(staged.path())?;

    let report = build_report(&resume_text, job_description.as_deref(), &state).await;

    Ok(Json(report))
}

/// POST /api/v1/taxonomy/reload
///
/// Clears the taxonomy cache and eagerly re-reads both files so a broken
/// edit is reported here instead of degrading the next scoring request.
pub async fn handle_taxonomy_reload(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.taxonomy.reload();
    let skills = state.taxonomy.skills()?;
    let verbs = state.taxonomy.verbs()?;

    info!("taxonomy reloaded: {} skill aliases", skills.len());
    Ok(Json(json!({
        "status": "reloaded",
        "skill_aliases": skills.len(),
        "action_verbs": verbs.impact.len() + verbs.build.len() + verbs.support.len(),
    })))
}

async fn build_report(resume_text: &str, job_description: Option<&str>, state: &AppState) -> AnalysisReport {
    let job_description = normalize_job_description(job_description);

    let (skills, _) = extract_skills(resume_text, &state.taxonomy);
    let (matched_keywords, missing_keywords) = match job_description {
        Some(jd) => {
            let (matched, missing, _) = analyze_keywords(&skills, jd, &state.taxonomy);
            (matched, missing)
        }
        None => (BTreeSet::new(), BTreeSet::new()),
    };

    let enhanced = enhanced_resume_score(
        resume_text,
        job_description,
        &state.taxonomy,
        state.embedder.as_ref(),
        state.segmenter.as_ref(),
    )
    .await;

    let (legacy, _) = legacy_quality_score(resume_text, &state.taxonomy, state.segmenter.as_ref());

    info!(
        "analysis complete: mode={:?} overall={:.1} legacy={:.1}",
        enhanced.metadata.mode, enhanced.overall_score, legacy.overall_score
    );

    AnalysisReport {
        analysis_id: Uuid::new_v4(),
        mode: enhanced.metadata.mode,
        name: parser::extract_person_name(resume_text),
        email: parser::extract_email(resume_text),
        phone: parser::extract_phone(resume_text),
        skills,
        matched_keywords,
        missing_keywords,
        enhanced,
        legacy,
    }
}
