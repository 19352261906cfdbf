//! Signal Extractors — stateless functions turning raw resume text into
//! primitive signals: matched skills, tiered action verbs, quantifiable
//! achievements, leadership/outcome phrases, section and contact markers.
//!
//! Extractors that depend on the taxonomy never fail the request: on a
//! configuration error they log, emit a `ConfigWarning`, and return empty
//! signals so the composite stays computable.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::taxonomy::{Taxonomy, VerbTier};

/// Fixed vocabulary of leadership verbs, matched whole-word.
const LEADERSHIP_VERBS: &[&str] = &[
    "led",
    "managed",
    "supervised",
    "directed",
    "mentored",
    "coached",
    "guided",
    "spearheaded",
];

/// Fixed vocabulary of outcome verbs, matched whole-word.
const OUTCOME_VERBS: &[&str] = &[
    "increased",
    "decreased",
    "improved",
    "reduced",
    "achieved",
    "delivered",
    "generated",
    "saved",
    "optimized",
];

/// Section headers recognized at line start, case-insensitive.
const SECTION_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "projects",
    "summary",
    "objective",
    "contact",
];

// Bare numbers with an optional %/K/M/B suffix, or dollar amounts with
// optional thousands separators and decimals.
static QUANTIFIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d+)?|\b\d+(?:\.\d+)?[%KMB]?").expect("valid number regex")
});

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z-]*").expect("valid word regex"));

/// A non-fatal degradation recorded during extraction, surfaced in response
/// metadata rather than only logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigWarning {
    pub source: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(source: &str, error: &dyn std::fmt::Display) -> Self {
        warn!("{source} degraded to empty signals: {error}");
        Self {
            source: source.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub impact: usize,
    pub build: usize,
    pub support: usize,
}

/// Weighted action-verb signal for a whole document.
///
/// `tier_counts` counts every matching line; the per-tier sets list unique
/// verbs only. Invariants: `total_verbs` is the sum of the tier counts and
/// `weighted_score` is the tier-weighted sum (impact 3.0, build 2.0,
/// support 1.0).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionVerbAnalysis {
    pub impact_verbs: BTreeSet<String>,
    pub build_verbs: BTreeSet<String>,
    pub support_verbs: BTreeSet<String>,
    pub tier_counts: TierCounts,
    pub weighted_score: f64,
    pub total_verbs: usize,
}

/// Non-empty trimmed lines — the engine's notion of "bullets".
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Extracts canonical skills by substring-matching every known alias
/// (lowercased) against the lowercased resume text.
pub fn extract_skills(
    text: &str,
    taxonomy: &Taxonomy,
) -> (BTreeSet<String>, Option<ConfigWarning>) {
    let skills = match taxonomy.skills() {
        Ok(skills) => skills,
        Err(e) => return (BTreeSet::new(), Some(ConfigWarning::new("skills", &e))),
    };

    let lower = text.to_lowercase();
    let found = skills
        .iter()
        .filter(|(alias, _)| lower.contains(alias.as_str()))
        .map(|(_, canonical)| canonical.clone())
        .collect();

    (found, None)
}

/// Extracts tiered action verbs from the text, one credit per line.
///
/// Each non-empty line contributes at most one verb: the first of its first
/// three whitespace tokens (punctuation-stripped, lowercased) that appears in
/// any tier's list.
pub fn extract_action_verbs(
    text: &str,
    taxonomy: &Taxonomy,
) -> (ActionVerbAnalysis, Option<ConfigWarning>) {
    let verbs = match taxonomy.verbs() {
        Ok(verbs) => verbs,
        Err(e) => {
            return (
                ActionVerbAnalysis::default(),
                Some(ConfigWarning::new("action_verbs", &e)),
            )
        }
    };

    let mut analysis = ActionVerbAnalysis::default();

    for line in non_empty_lines(text) {
        let first_match = line
            .split_whitespace()
            .take(3)
            .map(normalize_token)
            .filter(|token| !token.is_empty())
            .find_map(|token| verbs.tier_of(&token).map(|tier| (token, tier)));

        if let Some((token, tier)) = first_match {
            match tier {
                VerbTier::Impact => {
                    analysis.tier_counts.impact += 1;
                    analysis.impact_verbs.insert(token);
                }
                VerbTier::Build => {
                    analysis.tier_counts.build += 1;
                    analysis.build_verbs.insert(token);
                }
                VerbTier::Support => {
                    analysis.tier_counts.support += 1;
                    analysis.support_verbs.insert(token);
                }
            }
            analysis.weighted_score += tier.weight();
        }
    }

    analysis.total_verbs =
        analysis.tier_counts.impact + analysis.tier_counts.build + analysis.tier_counts.support;

    (analysis, None)
}

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Counts quantifiable achievements: numbers (with optional %/K/M/B suffix)
/// and dollar amounts. Each regex match is one unit; the caller applies the
/// enhanced (×8) or legacy (×10) scale.
pub fn count_quantifiable(text: &str) -> usize {
    QUANTIFIABLE_RE.find_iter(text).count()
}

/// Counts whole-word occurrences of the fixed leadership vocabulary.
pub fn count_leadership_phrases(text: &str) -> usize {
    count_vocabulary(text, LEADERSHIP_VERBS)
}

/// Counts whole-word occurrences of the fixed outcome vocabulary.
pub fn count_outcome_phrases(text: &str) -> usize {
    count_vocabulary(text, OUTCOME_VERBS)
}

fn count_vocabulary(text: &str, vocabulary: &[&str]) -> usize {
    WORD_RE
        .find_iter(text)
        .filter(|m| {
            let token = m.as_str().to_lowercase();
            vocabulary.contains(&token.as_str())
        })
        .count()
}

/// Section headers found at line start, lowercased.
pub fn detect_sections(lines: &[&str]) -> BTreeSet<&'static str> {
    let mut found = BTreeSet::new();
    for line in lines {
        let lower = line.to_lowercase();
        for keyword in SECTION_KEYWORDS {
            if lower.starts_with(keyword) {
                found.insert(*keyword);
            }
        }
    }
    found
}

/// Counts lines that start with a bullet marker (`•`, `-`, or `*`).
pub fn count_bullet_lines(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|l| l.starts_with('•') || l.starts_with('-') || l.starts_with('*'))
        .count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Counts distinct taxonomy aliases present in the text — the engine's proxy
/// for technical-term density.
pub fn count_technical_terms(text: &str, taxonomy: &Taxonomy) -> (usize, Option<ConfigWarning>) {
    let skills = match taxonomy.skills() {
        Ok(skills) => skills,
        Err(e) => return (0, Some(ConfigWarning::new("technical_terms", &e))),
    };

    let lower = text.to_lowercase();
    let count = skills
        .keys()
        .filter(|alias| lower.contains(alias.as_str()))
        .count();
    (count, None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) const SKILLS_FIXTURE: &str = r#"
languages:
  - name: Python
    synonyms: [py]
  - name: JavaScript
    synonyms: [js]
  - name: SQL
frameworks:
  - name: React
data:
  - name: Docker
  - name: AWS
  - name: PostgreSQL
    synonyms: [postgres]
"#;

    pub(crate) const VERBS_FIXTURE: &str = r#"
impact_verbs: [led, managed, spearheaded, achieved, improved, delivered]
build_verbs: [developed, built, created, implemented, designed]
support_verbs: [assisted, helped, collaborated, supported, participated]
"#;

    pub(crate) fn fixture_taxonomy() -> (TempDir, Taxonomy) {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("skills.yaml"), SKILLS_FIXTURE).expect("write skills");
        fs::write(dir.path().join("action_verbs.yaml"), VERBS_FIXTURE).expect("write verbs");
        let taxonomy = Taxonomy::new(dir.path());
        (dir, taxonomy)
    }

    /// Taxonomy pointed at an empty directory, so every load fails.
    pub(crate) fn broken_taxonomy() -> (TempDir, Taxonomy) {
        let dir = TempDir::new().expect("tempdir");
        let taxonomy = Taxonomy::new(dir.path());
        (dir, taxonomy)
    }

    #[test]
    fn test_impact_verb_line_scores_three() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (analysis, warning) = extract_action_verbs("• Led the team to success", &taxonomy);
        assert!(warning.is_none());
        assert_eq!(analysis.tier_counts.impact, 1);
        assert_eq!(analysis.tier_counts.build, 0);
        assert_eq!(analysis.tier_counts.support, 0);
        assert_eq!(analysis.weighted_score, 3.0);
        assert!(analysis.impact_verbs.contains("led"));
    }

    #[test]
    fn test_build_verb_line_scores_two() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (analysis, _) = extract_action_verbs("• Developed the application", &taxonomy);
        assert_eq!(analysis.weighted_score, 2.0);
        assert_eq!(analysis.tier_counts.build, 1);
    }

    #[test]
    fn test_support_verb_line_scores_one() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (analysis, _) = extract_action_verbs("• Assisted the team", &taxonomy);
        assert_eq!(analysis.weighted_score, 1.0);
        assert_eq!(analysis.tier_counts.support, 1);
    }

    #[test]
    fn test_empty_text_yields_zero_analysis() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (analysis, warning) = extract_action_verbs("", &taxonomy);
        assert!(warning.is_none());
        assert_eq!(analysis.total_verbs, 0);
        assert_eq!(analysis.weighted_score, 0.0);
        assert_eq!(analysis.tier_counts, TierCounts::default());
    }

    #[test]
    fn test_one_verb_credited_per_line() {
        let (_dir, taxonomy) = fixture_taxonomy();
        // "Led" is among the first three tokens; "developed" later on the
        // same line must not earn a second credit.
        let (analysis, _) =
            extract_action_verbs("• Led the team and developed the platform", &taxonomy);
        assert_eq!(analysis.total_verbs, 1);
        assert_eq!(analysis.weighted_score, 3.0);
    }

    #[test]
    fn test_verb_beyond_first_three_tokens_ignored() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (analysis, _) =
            extract_action_verbs("the team was ultimately led by me", &taxonomy);
        assert_eq!(analysis.total_verbs, 0);
    }

    #[test]
    fn test_tier_counts_count_lines_not_unique_verbs() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let text = "• Led the backend team\n• Led the platform migration\n";
        let (analysis, _) = extract_action_verbs(text, &taxonomy);
        assert_eq!(analysis.tier_counts.impact, 2);
        assert_eq!(analysis.impact_verbs.len(), 1);
        assert_eq!(analysis.weighted_score, 6.0);
        assert_eq!(analysis.total_verbs, 2);
    }

    #[test]
    fn test_weighted_score_matches_tier_formula() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let text = "\
• Led migration to the cloud
• Developed internal tooling
• Built the deployment pipeline
• Assisted support rotation
";
        let (analysis, _) = extract_action_verbs(text, &taxonomy);
        let expected = analysis.tier_counts.impact as f64 * 3.0
            + analysis.tier_counts.build as f64 * 2.0
            + analysis.tier_counts.support as f64 * 1.0;
        assert_eq!(analysis.weighted_score, expected);
        assert_eq!(
            analysis.total_verbs,
            analysis.tier_counts.impact + analysis.tier_counts.build + analysis.tier_counts.support
        );
    }

    #[test]
    fn test_broken_taxonomy_degrades_with_warning() {
        let (_dir, taxonomy) = broken_taxonomy();
        let (analysis, warning) = extract_action_verbs("• Led the team", &taxonomy);
        assert_eq!(analysis.total_verbs, 0);
        let warning = warning.expect("warning recorded");
        assert_eq!(warning.source, "action_verbs");

        let (skills, warning) = extract_skills("Python everywhere", &taxonomy);
        assert!(skills.is_empty());
        assert!(warning.is_some());
    }

    #[test]
    fn test_extract_skills_resolves_synonyms_to_canonical() {
        let (_dir, taxonomy) = fixture_taxonomy();
        let (skills, warning) =
            extract_skills("Shipped js services on postgres and Docker", &taxonomy);
        assert!(warning.is_none());
        assert!(skills.contains("JavaScript"));
        assert!(skills.contains("PostgreSQL"));
        assert!(skills.contains("Docker"));
        // Canonical names are deduplicated even when name + synonym both match.
        assert_eq!(skills.iter().filter(|s| *s == "PostgreSQL").count(), 1);
    }

    #[test]
    fn test_count_quantifiable_numbers_and_dollars() {
        assert_eq!(count_quantifiable("improved performance by 40%"), 1);
        assert_eq!(count_quantifiable("saved $50,000.50 and 3 hours"), 2);
        assert_eq!(count_quantifiable("scaled to 10M users, $2B market"), 2);
        assert_eq!(count_quantifiable("no numbers here"), 0);
    }

    #[test]
    fn test_leadership_and_outcome_counts_whole_word() {
        let text = "Led and mentored engineers; delivered results and improved uptime";
        assert_eq!(count_leadership_phrases(text), 2); // led, mentored
        assert_eq!(count_outcome_phrases(text), 2); // delivered, improved
        // "misled" must not count as "led".
        assert_eq!(count_leadership_phrases("misled the audit"), 0);
    }

    #[test]
    fn test_detect_sections_case_insensitive_line_start() {
        let text = "EXPERIENCE\nEducation\nmy skills are many\nSkills\n";
        let lines = non_empty_lines(text);
        let sections = detect_sections(&lines);
        assert!(sections.contains("experience"));
        assert!(sections.contains("education"));
        assert!(sections.contains("skills"));
        assert_eq!(sections.len(), 3);
    }

    #[test]
    fn test_count_bullet_lines_markers() {
        let text = "• one\n- two\n* three\nplain line\n";
        let lines = non_empty_lines(text);
        assert_eq!(count_bullet_lines(&lines), 3);
    }

    #[test]
    fn test_count_technical_terms_distinct_aliases() {
        let (_dir, taxonomy) = fixture_taxonomy();
        // Aliases present: python, sql, postgres, postgresql... each counted once.
        let (count, warning) =
            count_technical_terms("Python and SQL against postgres, more Python", &taxonomy);
        assert!(warning.is_none());
        assert!(count >= 3);

        let (none, _) = count_technical_terms("gardening and pottery", &taxonomy);
        assert_eq!(none, 0);
    }
}
