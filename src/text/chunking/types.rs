//! Core data structures for text chunking

use serde::Serialize;

/// A chunk of text located in the virtual offset space of a document set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    /// Chunk content (the virtual slice `[char_start, char_end)`)
    pub content: String,
    /// Character start position in the concatenated documents
    pub char_start: usize,
    /// Character end position in the concatenated documents
    pub char_end: usize,
    /// Index of this chunk in the sequence
    pub chunk_index: usize,
    /// Number of leading characters repeated from the previous chunk
    pub overlap_chars: usize,
    /// Length as measured by the configured length function
    pub length: usize,
    /// How the chunk was formed
    pub chunk_type: ChunkType,
}

impl TextChunk {
    /// Get the length of the chunk in characters
    pub fn char_length(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Character position range as a tuple
    pub fn char_range(&self) -> (usize, usize) {
        (self.char_start, self.char_end)
    }

    /// Content after the prefix shared with the previous chunk
    pub fn fresh_content(&self) -> &str {
        match self.content.char_indices().nth(self.overlap_chars) {
            Some((byte_pos, _)) => &self.content[byte_pos..],
            None => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Types of chunks produced by the splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// One or more units packed within the size budget
    Packed,
    /// A single unit larger than the size budget, emitted whole
    OversizedUnit,
}

impl ChunkType {
    /// Check if this chunk exceeds the configured chunk size
    pub fn exceeds_budget(&self) -> bool {
        matches!(self, ChunkType::OversizedUnit)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChunkType::Packed => "Packed units",
            ChunkType::OversizedUnit => "Oversized single unit",
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
