//! Answer composition strategies.
//!
//! Exactly two variants behind one trait: generative (delegates to the
//! configured text-generation capability) and extractive (keyword
//! sentence selection, no external service). The strategy is fixed at
//! construction — there is no per-call fallback chain.

use async_trait::async_trait;
use docsage_core::traits::Generator;
use docsage_core::types::Passage;

/// Fixed-format string returned when the generation capability fails.
pub const GENERATION_ERROR: &str = "Error generating answer.";

/// Minimum keyword length considered meaningful for extraction.
const MIN_KEYWORD_LEN: usize = 3;

/// Sentences kept by the extractive strategy.
const MAX_SENTENCES: usize = 3;

/// Fallback excerpt length when no sentence matches.
const FALLBACK_CHARS: usize = 500;

/// Composes an answer from a question and its retrieved passages.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    /// Strategy name: "generative" or "extractive".
    fn name(&self) -> &str;

    /// Compose an answer. Never errors — service failures collapse to
    /// a fixed error string.
    async fn compose(&self, question: &str, passages: &[Passage]) -> String;
}

/// Select the answer strategy once, from the optional generation
/// capability.
pub fn select_composer(generator: Option<Box<dyn Generator>>) -> Box<dyn AnswerComposer> {
    match generator {
        Some(generator) => {
            tracing::info!(provider = generator.name(), "using generative answers");
            Box::new(GenerativeComposer { generator })
        }
        None => {
            tracing::info!("no generation capability configured, using extractive answers");
            Box::new(ExtractiveComposer)
        }
    }
}

/// Delegates to an external text-generation capability.
pub struct GenerativeComposer {
    generator: Box<dyn Generator>,
}

impl GenerativeComposer {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self { generator }
    }

    fn build_prompt(question: &str, passages: &[Passage]) -> String {
        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Answer the following question based on the provided context from a document.\n\n\
             If the answer cannot be found in the context, say so explicitly.\n\n\
             Question: {question}\n\n\
             Context:\n{context}\n\n\
             Answer:"
        )
    }
}

#[async_trait]
impl AnswerComposer for GenerativeComposer {
    fn name(&self) -> &str {
        "generative"
    }

    async fn compose(&self, question: &str, passages: &[Passage]) -> String {
        let prompt = Self::build_prompt(question, passages);
        match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("error generating answer: {e}");
                GENERATION_ERROR.to_string()
            }
        }
    }
}

/// Keyword-overlap sentence extraction. Always available.
pub struct ExtractiveComposer;

impl ExtractiveComposer {
    /// Question keywords: words longer than three characters,
    /// lowercased.
    fn keywords(question: &str) -> Vec<String> {
        question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
            .map(|w| w.to_lowercase())
            .collect()
    }

    /// Split passage text into sentences, preserving order.
    fn sentences(text: &str) -> Vec<&str> {
        text.split_inclusive(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Fraction of keywords present in the sentence.
    fn score_sentence(sentence: &str, keywords: &[String]) -> f32 {
        if keywords.is_empty() {
            return 0.0;
        }
        let lower = sentence.to_lowercase();
        let hits = keywords.iter().filter(|k| lower.contains(k.as_str())).count();
        hits as f32 / keywords.len() as f32
    }
}

#[async_trait]
impl AnswerComposer for ExtractiveComposer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn compose(&self, question: &str, passages: &[Passage]) -> String {
        let keywords = Self::keywords(question);

        // Score every sentence, keeping passage/sentence order for
        // stable tie-breaking.
        let mut scored: Vec<(f32, &str)> = Vec::new();
        for passage in passages {
            for sentence in Self::sentences(&passage.text) {
                let score = Self::score_sentence(sentence, &keywords);
                scored.push((score, sentence));
            }
        }

        // Stable sort: equal scores preserve original order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let selected: Vec<&str> = scored
            .iter()
            .filter(|(score, _)| *score > 0.0)
            .take(MAX_SENTENCES)
            .map(|(_, s)| *s)
            .collect();

        if !selected.is_empty() {
            return selected.join(" ");
        }

        // Nothing matched: lead of the top-ranked passage.
        passages
            .first()
            .map(|p| p.text.chars().take(FALLBACK_CHARS).collect())
            .unwrap_or_default()
    }
}
