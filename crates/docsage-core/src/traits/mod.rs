//! Capability traits implemented by sibling crates.

pub mod embedder;
pub mod generator;
pub mod store;

pub use embedder::Embedder;
pub use generator::Generator;
pub use store::InsightStore;
