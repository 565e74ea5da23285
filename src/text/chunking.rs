//! Size-bounded text chunking with overlap over a set of documents
//!
//! Documents are addressed as one concatenated text. Chunks are built greedily
//! from strategy-defined units (characters, sentences or paragraphs) and carry
//! their character positions in that concatenation.

pub mod chunker;
pub mod config;
pub mod error;
pub mod resolver;
pub mod types;

// Re-export main public interfaces
pub use chunker::{BoundaryDetector, ChunkIterator, Splitter, iterate_chunks, split, split_chunks};
pub use config::{
    Characters, ChunkConfig, ChunkSettings, ChunkStrategy, LengthFunction, TryLength,
};
pub use error::{ChunkingError, Result};
pub use resolver::{DocumentSet, get_chunk};
pub use types::{ChunkType, TextChunk};
