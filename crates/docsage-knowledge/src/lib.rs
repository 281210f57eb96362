//! # DocSage Knowledge
//!
//! The retrieval substrate: splits raw document text into bounded,
//! overlapping passages, stores their embeddings in a per-document
//! vector index, and answers nearest-neighbor queries.
//!
//! ```text
//! raw text ──chunk──▶ passages ──build──▶ PassageIndex
//!                                            │
//! question ──embed──▶ query vector ──query──▶ ranked passages
//! ```

pub mod chunker;
pub mod index;
pub mod retriever;

pub use chunker::Chunker;
pub use index::{document_id, IndexRegistry, PassageIndex};
pub use retriever::retrieve;
