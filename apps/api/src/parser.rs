//! Document parsing collaborators: text extraction from uploaded PDFs plus
//! contact-field and person-name extraction from the raw text.
//!
//! These are narrow boundaries around the scoring engine; the engine itself
//! only ever sees a `&str` of resume text.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});

/// Extracts all text from a PDF document.
///
/// Failure here is fatal for the request: scoring never proceeds on empty or
/// garbage text, so the error is surfaced instead of an empty string.
pub fn extract_text(path: &Path) -> Result<String, AppError> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| AppError::DocumentUnreadable(format!("failed to read PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::DocumentUnreadable(
            "document contained no extractable text".to_string(),
        ));
    }

    Ok(text)
}

/// Returns the first email address found in the text, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Returns the first phone number found in the text, if any.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn has_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

pub fn has_phone(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

/// Heuristic person-name extraction standing in for an NER service.
///
/// Takes the first non-empty line consisting of 2–4 capitalized alphabetic
/// words with no digits or contact markers. Resumes almost always open with
/// the candidate's name; anything smarter belongs behind this boundary.
pub fn extract_person_name(text: &str) -> Option<String> {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains('@') || line.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) {
            continue;
        }
        let name_like = words.iter().all(|w| {
            let mut chars = w.chars();
            chars.next().is_some_and(|c| c.is_uppercase())
                && w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '-')
        });
        if name_like {
            return Some(line.to_string());
        }
    }
    None
}
