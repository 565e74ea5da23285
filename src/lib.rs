pub mod text;
pub mod util;

pub use text::chunking::{
    ChunkConfig, ChunkSettings, ChunkStrategy, ChunkingError, TextChunk, get_chunk, split,
    split_chunks,
};
