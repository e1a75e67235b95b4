//! Document heuristic for attachment scoring
//!
//! Estimates whether a shared file is a scientific paper from nothing
//! but its declared name and size, for platforms where content
//! inspection of the file is unavailable. Each piece of filename
//! evidence adds confidence, tokens that suggest paperwork rather than
//! papers subtract it, and an implausible size is penalized. The
//! threshold leans permissive: a false negative here starves
//! legitimate progress.

use crate::models::AttachmentInfo;
use once_cell::sync::Lazy;
use regex::Regex;

/// Confidence at or above this marks the attachment as a paper
pub const PAPER_CONFIDENCE_THRESHOLD: i32 = 30;

/// Plausible size band for a paper (outside penalizes)
const MIN_PLAUSIBLE_BYTES: u64 = 50 * 1024;
const MAX_PLAUSIBLE_BYTES: u64 = 50 * 1024 * 1024;

static ARXIV_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?\.[a-z0-9]+$").unwrap());
static DOI_IN_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"10\.\d{4,9}").unwrap());
static AUTHOR_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+[-_ ]?(19|20)\d{2}").unwrap());

const SCIENCE_TERMS: &[&str] = &[
    "paper", "study", "research", "analysis", "preprint", "thesis", "dissertation",
    "proceedings", "journal", "experiment", "clinical", "genome", "protein", "quantum",
    "neural", "dataset", "survey", "manuscript", "folding",
];

const PUBLISHER_TOKENS: &[&str] = &[
    "arxiv", "biorxiv", "medrxiv", "nature", "science", "ieee", "acm", "springer",
    "elsevier", "wiley", "plos", "lancet", "pnas",
];

const MUNDANE_TOKENS: &[&str] = &[
    "invoice", "receipt", "resume", "cv", "contract", "agreement", "statement",
    "ticket", "menu", "flyer", "brochure", "timesheet", "payroll",
];

/// Outcome of scoring one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentScore {
    /// Accumulated confidence, clamped to 0-100
    pub confidence: u8,
    pub is_scientific_paper: bool,
}

/// Score an attachment from declared filename and size
pub fn score_document(attachment: &AttachmentInfo) -> DocumentScore {
    let name = attachment.filename.trim().to_lowercase();
    if name.is_empty() {
        return DocumentScore {
            confidence: 0,
            is_scientific_paper: false,
        };
    }

    let mut confidence: i32 = 0;

    // arXiv-style identifier (NNNN.NNNNN.pdf) is near-certain
    if ARXIV_ID_RE.is_match(&name) {
        confidence += 70;
    }

    if DOI_IN_NAME_RE.is_match(&name) {
        confidence += 50;
    }

    if AUTHOR_YEAR_RE.is_match(&name) {
        confidence += 25;
    }

    let tokens: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    for term in SCIENCE_TERMS {
        if tokens.contains(term) {
            confidence += 10;
        }
    }

    for publisher in PUBLISHER_TOKENS {
        if tokens.contains(publisher) {
            confidence += 15;
        }
    }

    for mundane in MUNDANE_TOKENS {
        if tokens.contains(mundane) {
            confidence -= 40;
        }
    }

    // Declared size outside the plausible band for a typeset paper
    if let Some(size) = attachment.size_bytes {
        if size < MIN_PLAUSIBLE_BYTES || size > MAX_PLAUSIBLE_BYTES {
            confidence -= 20;
        }
    }

    let confidence = confidence.clamp(0, 100);
    DocumentScore {
        confidence: confidence as u8,
        is_scientific_paper: confidence >= PAPER_CONFIDENCE_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(filename: &str, size_bytes: Option<u64>) -> AttachmentInfo {
        AttachmentInfo {
            filename: filename.to_string(),
            content_type: None,
            size_bytes,
        }
    }

    #[test]
    fn arxiv_identifier_scores_high() {
        let score = score_document(&attachment("2504.11091.pdf", Some(1_800_000)));
        assert!(score.is_scientific_paper);
        assert!(score.confidence >= 70);
    }

    #[test]
    fn author_year_with_terms_crosses_threshold() {
        let score = score_document(&attachment("smith2021_protein_study.pdf", Some(900_000)));
        assert!(score.is_scientific_paper);
    }

    #[test]
    fn publisher_token_contributes() {
        let score = score_document(&attachment("nature_folding_preprint.docx", Some(2_000_000)));
        assert!(score.is_scientific_paper);
    }

    #[test]
    fn mundane_documents_are_rejected() {
        for name in ["invoice_2024.pdf", "receipt-march.pdf", "resume_final.pdf"] {
            let score = score_document(&attachment(name, Some(120_000)));
            assert!(!score.is_scientific_paper, "{name} should not be a paper");
        }
    }

    #[test]
    fn implausible_size_penalizes() {
        let tiny = score_document(&attachment("analysis.pdf", Some(4_000)));
        let plausible = score_document(&attachment("analysis.pdf", Some(400_000)));
        assert!(tiny.confidence < plausible.confidence);
    }

    #[test]
    fn missing_metadata_is_absent_evidence() {
        let score = score_document(&attachment("", None));
        assert_eq!(score.confidence, 0);
        assert!(!score.is_scientific_paper);
    }
}
