//! Signal classifier
//!
//! Decides whether one activity unit is trivial chatter, an ordinary
//! contributing message, or a shared research paper. Pure and
//! deterministic: same input, same result, no I/O, and it never fails.
//! Malformed attachment metadata counts as absent evidence and
//! uncertainty falls back to an ordinary classification.
//!
//! Paper detection uses escalating evidence, strongest first:
//! 1. an attached PDF
//! 2. a DOI in the message text
//! 3. a link to a known scientific publisher
//! 4. a scored non-PDF attachment (filename/size heuristic)
//! 5. four simultaneous weak text signals (title quote, authorship
//!    marker, year, journal vocabulary)

use crate::models::{ActivityUnit, Classification};
use crate::progression::paper_score::score_document;
use once_cell::sync::Lazy;
use regex::Regex;

/// Normalized text shorter than this is trivial chatter
const MIN_TEXT_CHARS: usize = 5;
/// Word count at or below this is trivial chatter
const MAX_LOW_VALUE_WORDS: usize = 2;
/// Ordinary quality contribution: one point per this many characters
const QUALITY_CHARS_PER_POINT: usize = 20;
/// Ordinary quality contribution cap
const QUALITY_CAP: u8 = 5;
/// Minimum length of a quoted span to count as a candidate paper title
const MIN_TITLE_QUOTE_CHARS: usize = 15;

/// Entire-message greeting/acknowledgement patterns, matched against the
/// normalized (trimmed, lowercased) text
const GREETING_PATTERNS: &[&str] = &[
    "hi", "hello", "hey", "yo", "gm", "gn", "good morning", "good night", "ok", "okay", "k",
    "yes", "no", "yep", "nope", "sure", "thanks", "thank you", "thx", "ty", "tysm", "lol",
    "lmao", "haha", "nice", "cool", "great", "awesome", "wow", "congrats", "welcome", "same",
    "this", "+1",
];

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:a-z0-9]+").unwrap());
static DOI_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bdoi\.org/").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://([^/\s]+)").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”|'([^']+)'"#).unwrap());
// Emoji-only (plus whitespace/punctuation) messages carry no signal
static EMOJI_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\p{Emoji_Presentation}\p{Extended_Pictographic}\p{P}\p{Sk}\u{200d}\u{fe0f}]+$")
        .unwrap()
});

/// Host suffixes of known scientific publishing domains (subdomains allowed)
const PAPER_DOMAINS: &[&str] = &[
    "arxiv.org",
    "biorxiv.org",
    "medrxiv.org",
    "nature.com",
    "science.org",
    "sciencemag.org",
    "cell.com",
    "thelancet.com",
    "nejm.org",
    "pnas.org",
    "plos.org",
    "springer.com",
    "sciencedirect.com",
    "wiley.com",
    "ieee.org",
    "acm.org",
    "ncbi.nlm.nih.gov",
    "scholar.google.com",
    "researchgate.net",
    "semanticscholar.org",
    "ssrn.com",
    "jstor.org",
    "frontiersin.org",
    "mdpi.com",
];

/// Authorship markers for text-only detection
const AUTHOR_MARKERS: &[&str] = &["by ", "authors:", "author:", "et al", "and colleagues"];

/// Journal/publisher vocabulary for text-only detection
const JOURNAL_TOKENS: &[&str] = &[
    "nature", "science", "cell", "lancet", "journal", "proceedings", "arxiv", "biorxiv",
    "medrxiv", "plos", "ieee", "acm", "springer", "elsevier", "wiley", "preprint", "review",
];

/// Classify one activity unit
pub fn classify(activity: &ActivityUnit) -> Classification {
    let normalized = activity.text.trim().to_lowercase();

    // Trivial chatter is filtered first, but only for bare text: an
    // attachment is substance regardless of how terse the message is
    if activity.attachments.is_empty() && is_low_value(&normalized) {
        return Classification::low_value();
    }

    // Strongest evidence: an attached PDF
    if activity
        .attachments
        .iter()
        .any(|a| a.filename.trim().to_lowercase().ends_with(".pdf"))
    {
        return Classification::paper(100);
    }

    // DOI in the text
    if DOI_RE.is_match(&normalized) || DOI_URL_RE.is_match(&normalized) {
        return Classification::paper(100);
    }

    // Link to a known publisher
    if has_paper_domain_link(&normalized) {
        return Classification::paper(90);
    }

    // Non-PDF attachments: score by filename/size since platform-level
    // content inspection is unavailable here
    for attachment in &activity.attachments {
        let score = score_document(attachment);
        if score.is_scientific_paper {
            return Classification::paper(score.confidence);
        }
    }

    // Weakest path: text with no attachment needs all four signals at once
    if activity.attachments.is_empty() && has_weak_paper_signals(activity.text.trim(), &normalized)
    {
        return Classification::paper(60);
    }

    // Low-value check for attachment-bearing messages that produced no
    // paper evidence
    if is_low_value(&normalized) {
        return Classification::low_value();
    }

    Classification::ordinary(quality_contribution(&activity.text))
}

/// Quality contribution of an ordinary message: longer, more substantial
/// messages score higher, capped
fn quality_contribution(text: &str) -> u8 {
    let chars = text.trim().chars().count();
    ((chars / QUALITY_CHARS_PER_POINT) as u8).min(QUALITY_CAP)
}

fn is_low_value(normalized: &str) -> bool {
    if normalized.chars().count() < MIN_TEXT_CHARS {
        return true;
    }
    if GREETING_PATTERNS.contains(&normalized) {
        return true;
    }
    if EMOJI_ONLY_RE.is_match(normalized) {
        return true;
    }
    normalized.split_whitespace().count() <= MAX_LOW_VALUE_WORDS
}

fn has_paper_domain_link(normalized: &str) -> bool {
    for capture in URL_RE.captures_iter(normalized) {
        let host = capture[1].trim_end_matches(|c: char| !c.is_alphanumeric());
        for domain in PAPER_DOMAINS {
            if host == *domain || host.ends_with(&format!(".{domain}")) {
                return true;
            }
        }
    }
    false
}

/// All four weak signals must be present simultaneously:
/// a quoted candidate title, an authorship marker, a year token, and a
/// journal/publisher vocabulary token
fn has_weak_paper_signals(raw: &str, normalized: &str) -> bool {
    let quoted_title = QUOTE_RE.captures_iter(raw).any(|c| {
        c.iter()
            .skip(1)
            .flatten()
            .any(|m| m.as_str().chars().count() >= MIN_TITLE_QUOTE_CHARS)
    });
    if !quoted_title {
        return false;
    }

    if !AUTHOR_MARKERS.iter().any(|m| normalized.contains(m)) {
        return false;
    }

    if !YEAR_RE.is_match(normalized) {
        return false;
    }

    JOURNAL_TOKENS
        .iter()
        .any(|token| normalized.split(|c: char| !c.is_alphanumeric()).any(|w| w == *token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityCategory, AttachmentInfo};

    fn text_activity(text: &str) -> ActivityUnit {
        ActivityUnit {
            id: "msg-1".to_string(),
            text: text.to_string(),
            attachments: vec![],
            author_id: None,
            channel_id: None,
        }
    }

    fn with_attachment(text: &str, filename: &str, size: Option<u64>) -> ActivityUnit {
        ActivityUnit {
            id: "msg-2".to_string(),
            text: text.to_string(),
            attachments: vec![AttachmentInfo {
                filename: filename.to_string(),
                content_type: None,
                size_bytes: size,
            }],
            author_id: None,
            channel_id: None,
        }
    }

    #[test]
    fn trivial_chatter_is_low_value() {
        for text in ["hi", "ok", "👍", "lol thanks", "  hey  ", "gm"] {
            let result = classify(&text_activity(text));
            assert_eq!(
                result.category,
                ActivityCategory::LowValue,
                "expected low value for {text:?}"
            );
            assert_eq!(result.quality_contribution, 0);
        }
    }

    #[test]
    fn substantive_sentence_is_ordinary() {
        let result = classify(&text_activity(
            "We finished the benchmark runs this afternoon today",
        ));
        assert_eq!(result.category, ActivityCategory::Ordinary);
        // 51 characters -> floor(51 / 20) = 2
        assert_eq!(result.quality_contribution, 2);
    }

    #[test]
    fn ordinary_quality_is_capped() {
        let long = "word ".repeat(60);
        let result = classify(&text_activity(&long));
        assert_eq!(result.category, ActivityCategory::Ordinary);
        assert_eq!(result.quality_contribution, 5);
    }

    #[test]
    fn pdf_attachment_is_paper_with_full_confidence() {
        let result = classify(&with_attachment("", "2504.11091.pdf", Some(2_000_000)));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn doi_in_text_is_paper() {
        let result = classify(&text_activity(
            "Worth reading: 10.1038/s41586-021-03819-2 changed how we think about folding",
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert_eq!(result.confidence, 100);

        let result = classify(&text_activity(
            "see https://doi.org/10.1126/science.abc123 for the full methods section",
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn publisher_link_is_paper() {
        let result = classify(&text_activity(
            "this preprint is wild https://www.biorxiv.org/content/early/2024/01/12/575123",
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert_eq!(result.confidence, 90);
    }

    #[test]
    fn subdomain_of_publisher_matches() {
        let result = classify(&text_activity(
            "posted on https://link.springer.com/article/10-whatever yesterday evening",
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
    }

    #[test]
    fn unrelated_link_is_not_paper() {
        let result = classify(&text_activity(
            "check out our new landing page https://example.com/launch when you get a chance",
        ));
        assert_eq!(result.category, ActivityCategory::Ordinary);
    }

    #[test]
    fn four_weak_signals_together_are_paper() {
        let result = classify(&text_activity(
            r#"Just read "Attention Is All You Need" by Vaswani et al. (2017), still the best preprint intro"#,
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert_eq!(result.confidence, 60);
    }

    #[test]
    fn weak_signals_alone_are_not_enough() {
        // Quoted title + year, but no authorship marker and no journal token
        let result = classify(&text_activity(
            r#"Rewatched "The Grand Budapest Hotel" from 2014 over the weekend, great film"#,
        ));
        assert_eq!(result.category, ActivityCategory::Ordinary);
    }

    #[test]
    fn classification_is_deterministic() {
        let activity = text_activity(
            "Sharing https://arxiv.org/abs/2402.01234 since it covers our roadmap discussion",
        );
        let first = classify(&activity);
        for _ in 0..10 {
            assert_eq!(classify(&activity), first);
        }
    }

    #[test]
    fn scientific_non_pdf_attachment_is_paper() {
        let result = classify(&with_attachment(
            "uploading the preprint draft here",
            "nature_2023_protein_folding_study.docx",
            Some(1_500_000),
        ));
        assert_eq!(result.category, ActivityCategory::Paper);
        assert!(result.confidence >= 30);
    }

    #[test]
    fn mundane_attachment_with_terse_text_is_low_value() {
        let result = classify(&with_attachment("here", "invoice_march.xlsx", Some(20_000)));
        assert_eq!(result.category, ActivityCategory::LowValue);
    }
}
