//! # DocSage QA
//!
//! Turns retrieved passages into a scored, cited answer:
//! - [`composer`] — the two answer strategies (generative, extractive),
//!   selected once at construction;
//! - [`confidence`] — the heuristic confidence score;
//! - [`citations`] — page-level citation extraction and accuracy checks.

pub mod citations;
pub mod composer;
pub mod confidence;

pub use composer::{select_composer, AnswerComposer, ExtractiveComposer, GenerativeComposer};
