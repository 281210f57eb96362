//! Page-level citations.
//!
//! Citations are derived mechanically from the supporting passages, not
//! from the answer text: any passage tagged with a page yields one
//! citation with a short excerpt.

use std::collections::BTreeSet;

use docsage_core::types::{Citation, Passage, RetrievalResult};

/// Excerpt length carried into each citation.
const EXCERPT_CHARS: usize = 200;

/// One citation per supporting passage that carries a page tag.
/// Passages without a page (plain-text sources) are skipped.
pub fn extract_citations(results: &[RetrievalResult]) -> Vec<Citation> {
    results
        .iter()
        .filter_map(|r| citation_for(&r.passage))
        .collect()
}

fn citation_for(passage: &Passage) -> Option<Citation> {
    let page = passage.page.filter(|p| *p > 0)?;
    let excerpt = if passage.text.chars().count() > EXCERPT_CHARS {
        let head: String = passage.text.chars().take(EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        passage.text.clone()
    };
    Some(Citation { page, excerpt })
}

/// Fraction of citations pointing at a page known to carry text.
///
/// No citations at all scores 0.0. If the document has no pages with
/// extractable text there is nothing to validate against, so the score
/// is a neutral 0.5. Citations to unknown or empty pages are logged.
pub fn citation_accuracy(citations: &[Citation], valid_pages: &BTreeSet<u32>) -> f32 {
    if citations.is_empty() {
        return 0.0;
    }
    if valid_pages.is_empty() {
        return 0.5;
    }

    let mut hits = 0usize;
    for citation in citations {
        if valid_pages.contains(&citation.page) {
            hits += 1;
        } else {
            tracing::warn!(page = citation.page, "citation points at an unknown or empty page");
        }
    }
    hits as f32 / citations.len() as f32
}
