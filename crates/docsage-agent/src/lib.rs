//! # DocSage Agent
//!
//! The engine that ties the pipeline together: documents in, scored and
//! cited answers out, with a session memory on the side.
//!
//! Capabilities (embedder, answer strategy, memory backend) are
//! resolved once at construction; a misconfiguration fails there.
//! After that the engine degrades instead of erroring: a document whose
//! index could not be built yields sentinel answers, never failures.

use std::collections::{BTreeSet, HashMap};

use docsage_core::config::DocSageConfig;
use docsage_core::error::Result;
use docsage_core::traits::Embedder;
use docsage_core::types::{Answer, DocumentInput, DocumentMetadata, InsightSearchHit, Passage};
use docsage_knowledge::{document_id, retrieve, Chunker, IndexRegistry};
use docsage_memory::{ConversationTurn, MemoryCoordinator};
use docsage_qa::{citations, confidence, select_composer, AnswerComposer};
use serde_json::Value;

/// Sentinel answer text when no document has been added yet.
const NO_DOCUMENT: &str = "No document loaded. Add a document before asking questions.";

/// Sentinel answer text when retrieval finds nothing to ground an
/// answer in (index not built, or no relevant passages).
const NO_RELEVANT_PASSAGES: &str =
    "I couldn't find relevant information in the document to answer this question.";

/// The document Q&A engine.
pub struct DocSage {
    config: DocSageConfig,
    embedder: Box<dyn Embedder>,
    composer: Box<dyn AnswerComposer>,
    /// True when the composer delegates to a generation capability.
    generative: bool,
    chunker: Chunker,
    registry: IndexRegistry,
    memory: MemoryCoordinator,
    documents: HashMap<String, DocumentMetadata>,
    active_document: Option<String>,
}

impl DocSage {
    /// Resolve every capability from configuration. Configuration
    /// problems (unknown provider, missing required API key, unknown
    /// memory backend) are fatal here.
    pub fn new(config: DocSageConfig) -> Result<Self> {
        let embedder = docsage_providers::create_embedder(&config)?;
        let generator = docsage_providers::create_generator(&config)?;
        let generative = generator.is_some();
        let composer = select_composer(generator);
        let memory = MemoryCoordinator::from_config(&config.memory)?;
        let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.overlap);

        tracing::info!(
            embedder = embedder.name(),
            strategy = composer.name(),
            "engine ready"
        );

        Ok(Self {
            config,
            embedder,
            composer,
            generative,
            chunker,
            registry: IndexRegistry::new(),
            memory,
            documents: HashMap::new(),
            active_document: None,
        })
    }

    /// Ingest one document: validate, chunk if the reader did not, and
    /// build its passage index. The new document becomes active.
    ///
    /// An unreachable embedding service is absorbed: the document is
    /// registered but stays unanswerable until a later `add_document`
    /// succeeds for it.
    pub async fn add_document(&mut self, input: DocumentInput) -> Result<String> {
        input.validate()?;

        let id = document_id(&input.metadata.source);
        let passages = self.passages_for(&input);

        match self
            .registry
            .build(&id, &passages, self.embedder.as_ref())
            .await
        {
            Ok(count) => {
                tracing::info!(
                    document_id = %id,
                    source = %input.metadata.source,
                    passages = count,
                    "document indexed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %id,
                    "index build failed, document will be unanswerable: {e}"
                );
            }
        }

        self.documents.insert(id.clone(), input.metadata);
        self.active_document = Some(id.clone());
        Ok(id)
    }

    fn passages_for(&self, input: &DocumentInput) -> Vec<Passage> {
        if let Some(chunks) = &input.chunks {
            return chunks.clone();
        }
        if input.metadata.pages.is_empty() {
            self.chunker.chunk_text(&input.text)
        } else {
            self.chunker.chunk_with_pages(&input.text, &input.metadata.pages)
        }
    }

    /// Rebuild a document's index from explicit passages, bypassing the
    /// chunker. Idempotent for an already-ready document id.
    pub async fn build_index(&mut self, document_id: &str, passages: &[Passage]) -> Result<usize> {
        self.registry
            .build(document_id, passages, self.embedder.as_ref())
            .await
    }

    /// Answer a question against the active document, with the
    /// configured `top_k` and citations included.
    ///
    /// Never errors: with no document or no relevant passages the
    /// answer is a zero-confidence sentinel. Every answered question is
    /// recorded in the session history.
    pub async fn answer(&mut self, question: &str) -> Answer {
        let top_k = self.config.retrieval.top_k;
        self.answer_with(question, top_k, true).await
    }

    /// Answer against the active document with an explicit passage
    /// budget; `include_citations = false` strips the citation list.
    pub async fn answer_with(
        &mut self,
        question: &str,
        top_k: usize,
        include_citations: bool,
    ) -> Answer {
        let Some(document_id) = self.active_document.clone() else {
            return Answer::unavailable(NO_DOCUMENT);
        };
        let mut answer = self.answer_about(&document_id, question, top_k).await;
        if !include_citations {
            answer.citations.clear();
        }
        answer
    }

    /// Answer a question against a specific document.
    pub async fn answer_about(
        &mut self,
        document_id: &str,
        question: &str,
        top_k: usize,
    ) -> Answer {
        let results = retrieve(
            self.registry.get(document_id),
            self.embedder.as_ref(),
            question,
            top_k,
        )
        .await;

        if results.is_empty() {
            let answer = Answer::unavailable(NO_RELEVANT_PASSAGES);
            self.memory.add_turn(question, &answer.text, answer.confidence);
            return answer;
        }

        let passages: Vec<Passage> = results.iter().map(|r| r.passage.clone()).collect();
        let text = self.composer.compose(question, &passages).await;
        let cited = citations::extract_citations(&results);
        let score = confidence::score(&text, &results, self.generative);

        let accuracy =
            citations::citation_accuracy(&cited, &self.valid_pages(document_id));
        tracing::debug!(
            document_id,
            citations = cited.len(),
            accuracy,
            confidence = score,
            "question answered"
        );

        self.memory.add_turn(question, &text, score);

        Answer {
            text,
            citations: cited,
            confidence: score,
            supporting_passages: results.len(),
        }
    }

    /// Pages of a document known to carry extractable text.
    fn valid_pages(&self, document_id: &str) -> BTreeSet<u32> {
        self.documents
            .get(document_id)
            .map(|m| {
                m.pages
                    .iter()
                    .filter(|p| p.has_text)
                    .map(|p| p.page)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record insights for a document in the session cache; with
    /// `persist` set they are written through to the durable bank and
    /// survive a restart.
    pub async fn record_insights(
        &mut self,
        document_id: &str,
        insights: Value,
        metadata: Value,
        persist: bool,
    ) -> Result<()> {
        self.memory
            .store_insights(document_id, insights, metadata, persist)
            .await
    }

    /// Session-first insight recall.
    pub async fn recall_insights(&mut self, document_id: &str) -> Result<Option<Value>> {
        self.memory.recall_insights(document_id).await
    }

    /// Substring-ranked search across all persisted insights.
    pub async fn search_memory(&self, query: &str, limit: usize) -> Result<Vec<InsightSearchHit>> {
        self.memory.search(query, limit).await
    }

    /// Drop insight records older than the configured retention window.
    pub async fn compact_memory(&self) -> Result<usize> {
        self.memory.compact(self.config.memory.max_age_days).await
    }

    /// Ids of every document with persisted insights.
    pub async fn remembered_documents(&self) -> Result<Vec<String>> {
        self.memory.all_documents().await
    }

    /// Forget a document entirely: index, session cache, and bank.
    pub async fn forget_document(&mut self, document_id: &str) -> Result<()> {
        self.registry.remove(document_id);
        self.documents.remove(document_id);
        if self.active_document.as_deref() == Some(document_id) {
            self.active_document = None;
        }
        self.memory.forget(document_id).await
    }

    pub fn recent_history(&self, n: usize) -> &[ConversationTurn] {
        self.memory.recent_history(n)
    }

    pub fn clear_session(&mut self) {
        self.memory.clear_session();
    }

    pub fn active_document(&self) -> Option<&str> {
        self.active_document.as_deref()
    }

    /// Switch the active document. Unknown ids are rejected.
    pub fn set_active_document(&mut self, document_id: &str) -> Result<()> {
        if !self.documents.contains_key(document_id) {
            return Err(docsage_core::error::DocSageError::Document(format!(
                "unknown document id: {document_id}"
            )));
        }
        self.active_document = Some(document_id.to_string());
        Ok(())
    }

    pub fn document_metadata(&self, document_id: &str) -> Option<&DocumentMetadata> {
        self.documents.get(document_id)
    }

    /// Whether questions against this document can return grounded
    /// answers.
    pub fn is_ready(&self, document_id: &str) -> bool {
        self.registry.is_ready(document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsage_core::types::PageInfo;
    use serde_json::json;

    fn test_config(dir: &tempfile::TempDir) -> DocSageConfig {
        let mut config = DocSageConfig::default();
        config.memory.db_path = dir
            .path()
            .join("insights.db")
            .to_string_lossy()
            .into_owned();
        config
    }

    fn report_input() -> DocumentInput {
        DocumentInput {
            text: "The project kickoff happened in January. \
                   The final deadline is March 5. \
                   Budget approval is still pending with finance."
                .to_string(),
            metadata: DocumentMetadata {
                source: "project-report.pdf".to_string(),
                source_type: "pdf".to_string(),
                total_pages: Some(1),
                pages: vec![PageInfo {
                    page: 1,
                    char_count: 120,
                    word_count: 22,
                    has_text: true,
                }],
            },
            chunks: None,
        }
    }

    #[tokio::test]
    async fn test_answer_without_document_is_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let answer = engine.answer("What is the deadline?").await;
        assert_eq!(answer.text, NO_DOCUMENT);
        assert_eq!(answer.confidence, 0.0);
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_add_document_and_answer() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let id = engine.add_document(report_input()).await.unwrap();

        assert!(engine.is_ready(&id));
        assert_eq!(engine.active_document(), Some(id.as_str()));

        let answer = engine.answer("What is the final deadline?").await;
        assert!(answer.text.contains("March 5"));
        assert!(answer.confidence > 0.0);
        assert!(answer.supporting_passages > 0);
        assert_eq!(answer.citations[0].page, 1);
    }

    #[tokio::test]
    async fn test_add_document_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let a = engine.add_document(report_input()).await.unwrap();
        let b = engine.add_document(report_input()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_answers_recorded_in_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        engine.add_document(report_input()).await.unwrap();

        engine.answer("What is the deadline?").await;
        engine.answer("Who approves the budget?").await;

        let history = engine.recent_history(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "What is the deadline?");
    }

    #[tokio::test]
    async fn test_insights_roundtrip_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let id = engine.add_document(report_input()).await.unwrap();

        engine
            .record_insights(
                &id,
                json!({"summary": "deadline is in March"}),
                json!({}),
                true,
            )
            .await
            .unwrap();

        let recalled = engine.recall_insights(&id).await.unwrap().unwrap();
        assert_eq!(recalled["summary"], "deadline is in March");

        let hits = engine.search_memory("march", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, id);
    }

    #[tokio::test]
    async fn test_session_only_insights_do_not_survive_restart() {
        let dir = tempfile::tempdir().unwrap();

        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let id = engine.add_document(report_input()).await.unwrap();
        engine
            .record_insights(&id, json!({"summary": "scratch notes"}), json!({}), false)
            .await
            .unwrap();

        // In-session the insights are recallable.
        let recalled = engine.recall_insights(&id).await.unwrap().unwrap();
        assert_eq!(recalled["summary"], "scratch notes");

        // A fresh engine over the same db sees nothing: the write never
        // reached the bank.
        drop(engine);
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        assert!(engine.recall_insights(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persisted_insights_survive_restart() {
        let dir = tempfile::tempdir().unwrap();

        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let id = engine.add_document(report_input()).await.unwrap();
        engine
            .record_insights(&id, json!({"summary": "kept notes"}), json!({}), true)
            .await
            .unwrap();

        drop(engine);
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let recalled = engine.recall_insights(&id).await.unwrap().unwrap();
        assert_eq!(recalled["summary"], "kept notes");
    }

    #[tokio::test]
    async fn test_forget_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        let id = engine.add_document(report_input()).await.unwrap();
        engine
            .record_insights(&id, json!({"summary": "x"}), json!({}), true)
            .await
            .unwrap();

        engine.forget_document(&id).await.unwrap();
        assert!(!engine.is_ready(&id));
        assert!(engine.active_document().is_none());
        assert!(engine.recall_insights(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_active_document_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        assert!(engine.set_active_document("doc_nope").is_err());
    }

    #[tokio::test]
    async fn test_reader_supplied_chunks_are_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();

        let mut input = report_input();
        input.chunks = Some(vec![
            Passage::with_page("The deadline is March 5.".to_string(), 0, 1),
            Passage::with_page("Budget approval is pending.".to_string(), 1, 1),
        ]);
        let id = engine.add_document(input).await.unwrap();

        let answer = engine.answer_about(&id, "What is the deadline?", 3).await;
        assert!(answer.text.contains("March 5"));
        assert_eq!(answer.supporting_passages, 2);
    }

    #[tokio::test]
    async fn test_answer_with_citations_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();
        engine.add_document(report_input()).await.unwrap();

        let answer = engine.answer_with("What is the deadline?", 3, false).await;
        assert!(answer.text.contains("March 5"));
        assert!(answer.citations.is_empty());
        assert!(answer.supporting_passages > 0);
    }

    #[tokio::test]
    async fn test_build_index_from_explicit_passages() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = DocSage::new(test_config(&dir)).unwrap();

        let passages = vec![
            Passage::new("The vendor contract renews in July.".to_string(), 0),
            Passage::new("Support tickets are handled within a day.".to_string(), 1),
        ];
        let count = engine.build_index("doc_manual", &passages).await.unwrap();
        assert_eq!(count, 2);
        assert!(engine.is_ready("doc_manual"));

        let answer = engine
            .answer_about("doc_manual", "When does the vendor contract renew?", 3)
            .await;
        assert!(answer.text.contains("July"));
    }

    #[tokio::test]
    async fn test_bad_config_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.embedding.provider = "does-not-exist".into();
        assert!(DocSage::new(config).is_err());
    }
}
