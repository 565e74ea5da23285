//! Virtual offset addressing over an ordered document set
//!
//! All documents are treated as one concatenated text. Offsets are counted in
//! characters; document joins are transparent.

use super::error::{ChunkingError, Result};
use crate::util::text::slice_chars;
use std::borrow::Cow;
use tracing::trace;

/// Prefix-sum index over an ordered set of documents
#[derive(Debug, Clone)]
pub struct DocumentSet<'a, S: AsRef<str>> {
    documents: &'a [S],
    /// `char_offsets[i]` is the virtual character offset where document `i` starts
    char_offsets: Vec<usize>,
    /// `byte_offsets[i]` is the virtual byte offset where document `i` starts
    byte_offsets: Vec<usize>,
}

impl<'a, S: AsRef<str>> DocumentSet<'a, S> {
    pub fn new(documents: &'a [S]) -> Self {
        let mut char_offsets = Vec::with_capacity(documents.len() + 1);
        let mut byte_offsets = Vec::with_capacity(documents.len() + 1);
        let (mut chars, mut bytes) = (0, 0);
        char_offsets.push(chars);
        byte_offsets.push(bytes);
        for document in documents {
            let text = document.as_ref();
            chars += text.chars().count();
            bytes += text.len();
            char_offsets.push(chars);
            byte_offsets.push(bytes);
        }
        Self {
            documents,
            char_offsets,
            byte_offsets,
        }
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of characters across all documents
    pub fn char_len(&self) -> usize {
        self.char_offsets[self.documents.len()]
    }

    /// Total number of bytes across all documents
    pub fn byte_len(&self) -> usize {
        self.byte_offsets[self.documents.len()]
    }

    pub fn document(&self, index: usize) -> Option<&'a str> {
        let documents = self.documents;
        documents.get(index).map(|d| d.as_ref())
    }

    /// Character range `[start, end)` occupied by a document in the virtual offset space
    pub fn document_range(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.documents.len())
            .then(|| (self.char_offsets[index], self.char_offsets[index + 1]))
    }

    pub(crate) fn char_offset(&self, index: usize) -> usize {
        self.char_offsets[index]
    }

    pub(crate) fn byte_offset(&self, index: usize) -> usize {
        self.byte_offsets[index]
    }

    /// Non-empty per-document pieces of the virtual range `[start, end)`
    ///
    /// `start` defaults to 0 and `end` to the total length. `end` beyond the
    /// total length is clamped, while `start` beyond it (or beyond `end`) is an
    /// error.
    pub fn fragments(&self, start: Option<usize>, end: Option<usize>) -> Result<Vec<&'a str>> {
        let total = self.char_len();
        let start_pos = start.unwrap_or(0);
        if start_pos > total || end.is_some_and(|e| start_pos > e) {
            return Err(ChunkingError::out_of_range(start_pos, end, total));
        }
        let end_pos = end.map_or(total, |e| e.min(total));

        let documents = self.documents;
        let mut fragments = Vec::new();
        if start_pos == end_pos {
            return Ok(fragments);
        }

        let first = locate(&self.char_offsets, start_pos);
        for (index, document) in documents.iter().enumerate().skip(first) {
            let (doc_start, doc_end) = (self.char_offsets[index], self.char_offsets[index + 1]);
            if doc_start >= end_pos {
                break;
            }
            let local_start = start_pos.saturating_sub(doc_start);
            let local_end = end_pos.min(doc_end) - doc_start;
            if local_start >= local_end {
                continue;
            }
            let text = document.as_ref();
            if local_start == 0 && local_end == doc_end - doc_start {
                fragments.push(text);
            } else {
                fragments.push(slice_chars(text, local_start, local_end));
            }
        }
        trace!(
            "resolved [{}, {}) to {} fragments",
            start_pos,
            end_pos,
            fragments.len()
        );
        Ok(fragments)
    }

    /// Substring of the virtual concatenation between two character offsets
    pub fn get_chunk(&self, start: Option<usize>, end: Option<usize>) -> Result<String> {
        Ok(self.fragments(start, end)?.concat())
    }

    /// Virtual byte range `[start, end)`; both ends must fall on character boundaries
    pub(crate) fn byte_slice(&self, start: usize, end: usize) -> Cow<'a, str> {
        let documents = self.documents;
        let first = locate(&self.byte_offsets, start);
        let mut pieces = Vec::new();
        for (index, document) in documents.iter().enumerate().skip(first) {
            let (doc_start, doc_end) = (self.byte_offsets[index], self.byte_offsets[index + 1]);
            if doc_start >= end {
                break;
            }
            let local_start = start.saturating_sub(doc_start);
            let local_end = end.min(doc_end) - doc_start;
            if local_start < local_end {
                pieces.push(&document.as_ref()[local_start..local_end]);
            }
        }
        match pieces.as_slice() {
            [] => Cow::Borrowed(""),
            [single] => Cow::Borrowed(*single),
            _ => Cow::Owned(pieces.concat()),
        }
    }
}

/// Index of the document whose range contains `pos` (empty documents are skipped)
fn locate(offsets: &[usize], pos: usize) -> usize {
    offsets.partition_point(|&offset| offset <= pos).saturating_sub(1)
}

/// Substring of the concatenated `documents` between two character offsets
///
/// `get_chunk(documents, None, None)` returns the full concatenation.
pub fn get_chunk<S: AsRef<str>>(
    documents: &[S],
    start: Option<usize>,
    end: Option<usize>,
) -> Result<String> {
    DocumentSet::new(documents).get_chunk(start, end)
}
