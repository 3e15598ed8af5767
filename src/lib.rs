pub mod chunker;
pub mod config;
pub mod embedder;
pub mod error;
pub mod extract;
pub mod index;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod store;

pub use chunker::{Chunk, SectionChunker};
pub use config::{ChunkingConfig, EmbeddingConfig, SectionVocabulary};
pub use error::{IndexError, IndexResult};
pub use pipeline::Pipeline;
