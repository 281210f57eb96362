//! Heuristic confidence score for a composed answer.

use docsage_core::types::RetrievalResult;

/// Answers longer than this earn the length bonus.
const LENGTH_BONUS_THRESHOLD: usize = 50;

/// Score the answer on `[0.0, 1.0]`.
///
/// Rules, in order:
/// - no supporting passages: hard 0.0;
/// - base 0.5, plus 0.2 for two or more passages (0.1 for exactly one);
/// - averaged with the mean retrieval quality `max(0, 1 - avg_distance)`;
/// - plus 0.1 for a substantive answer (length above the threshold;
///   generative answers must also not disclaim that the answer cannot
///   be found);
/// - clamped to the unit interval.
pub fn score(answer: &str, results: &[RetrievalResult], generative: bool) -> f32 {
    if results.is_empty() {
        return 0.0;
    }

    let mut confidence: f32 = 0.5;

    if results.len() >= 2 {
        confidence += 0.2;
    } else {
        confidence += 0.1;
    }

    let avg_distance: f32 =
        results.iter().map(|r| r.distance).sum::<f32>() / results.len() as f32;
    let retrieval_quality = (1.0 - avg_distance).max(0.0);
    confidence = (confidence + retrieval_quality) / 2.0;

    let long_enough = answer.chars().count() > LENGTH_BONUS_THRESHOLD;
    let substantive = if generative {
        long_enough && !answer.to_lowercase().contains("cannot be found")
    } else {
        long_enough
    };
    if substantive {
        confidence += 0.1;
    }

    confidence.clamp(0.0, 1.0)
}
