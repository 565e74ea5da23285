//! Greedy chunk accumulation over strategy-defined units

use super::{
    config::{Characters, ChunkConfig, ChunkStrategy, LengthFunction},
    error::{ChunkingError, Result},
    resolver::DocumentSet,
    types::{ChunkType, TextChunk},
};
use crate::text::SentenceSplitter;
use crate::util::text::{byte_spans_to_char_spans, trimmed_span};
use regex::Regex;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Smallest piece of text a chunk boundary may not cut through
///
/// Both ranges are in the virtual offset space of the document set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub bytes: Range<usize>,
    pub chars: Range<usize>,
}

/// Candidate split units for each strategy
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    sentence_splitter: SentenceSplitter,
    paragraph_regex: Regex,
}

impl BoundaryDetector {
    pub fn new() -> Result<Self> {
        // one or more blank lines (which may hold spaces or tabs)
        let paragraph_regex = Regex::new(r"\n[^\S\n]*\n")?;
        Ok(Self {
            sentence_splitter: SentenceSplitter::default(),
            paragraph_regex,
        })
    }

    /// Byte spans of the units of one document, in order
    pub fn document_units(&self, strategy: ChunkStrategy, text: &str) -> Vec<Range<usize>> {
        match strategy {
            ChunkStrategy::Character => text
                .char_indices()
                .map(|(pos, c)| pos..pos + c.len_utf8())
                .collect(),
            ChunkStrategy::Sentence => self.sentence_splitter.split_spans(text),
            ChunkStrategy::Paragraph => self.detect_paragraph_boundaries(text),
        }
    }

    fn detect_paragraph_boundaries(&self, text: &str) -> Vec<Range<usize>> {
        let mut paragraphs = Vec::new();
        let mut last_end = 0;

        for mat in self.paragraph_regex.find_iter(text) {
            if let Some(span) = trimmed_span(text, last_end..mat.start()) {
                paragraphs.push(span);
            }
            last_end = mat.end();
        }
        if let Some(span) = trimmed_span(text, last_end..text.len()) {
            paragraphs.push(span);
        }
        paragraphs
    }

    /// Units of every document, placed in the virtual offset space
    pub fn units<S: AsRef<str>>(
        &self,
        strategy: ChunkStrategy,
        documents: &DocumentSet<'_, S>,
    ) -> Vec<Unit> {
        let mut units = Vec::new();
        for index in 0..documents.len() {
            let Some(text) = documents.document(index) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let byte_base = documents.byte_offset(index);
            let char_base = documents.char_offset(index);
            let spans = self.document_units(strategy, text);
            let char_spans = match strategy {
                ChunkStrategy::Character => {
                    (0..spans.len()).map(|i| i..i + 1).collect::<Vec<_>>()
                }
                _ => byte_spans_to_char_spans(text, &spans),
            };
            units.extend(spans.into_iter().zip(char_spans).map(|(bytes, chars)| Unit {
                bytes: byte_base + bytes.start..byte_base + bytes.end,
                chars: char_base + chars.start..char_base + chars.end,
            }));
        }
        units
    }
}

/// Lazily produces chunks; stops after the first error
pub struct ChunkIterator<'a, S: AsRef<str>, L = Characters> {
    config: &'a ChunkConfig<L>,
    documents: DocumentSet<'a, S>,
    units: Vec<Unit>,
    /// First unit not yet emitted in any chunk
    next_unit: usize,
    /// First unit of the overlap seed carried into the next chunk (`== next_unit` when none)
    seed_start: usize,
    chunk_index: usize,
    failed: bool,
}

impl<'a, S: AsRef<str>, L: LengthFunction> ChunkIterator<'a, S, L> {
    pub fn new(
        documents: &'a [S],
        config: &'a ChunkConfig<L>,
        detector: &BoundaryDetector,
    ) -> Self {
        let documents = DocumentSet::new(documents);
        let units = detector.units(config.chunk_strategy, &documents);
        debug!(
            "Detected {} {} units across {} documents ({} chars)",
            units.len(),
            config.chunk_strategy,
            documents.len(),
            documents.char_len()
        );
        Self {
            config,
            documents,
            units,
            next_unit: 0,
            seed_start: 0,
            chunk_index: 0,
            failed: false,
        }
    }

    /// Number of units still to be emitted
    pub fn remaining_units(&self) -> usize {
        self.units.len() - self.next_unit
    }

    /// Length of the virtual text spanning `units[first..end]`
    fn measure_units(&self, first: usize, end: usize) -> Result<usize> {
        let text = self
            .documents
            .byte_slice(self.units[first].bytes.start, self.units[end - 1].bytes.end);
        self.config.measure(&text)
    }

    fn next_chunk(&mut self) -> Result<TextChunk> {
        let chunk_size = self.config.chunk_size;
        let fresh = self.next_unit;
        let unit_length = self.measure_units(fresh, fresh + 1)?;

        let (first, end, length, chunk_type) = if unit_length > chunk_size {
            warn!(
                "Unit at chars {}..{} exceeds chunk size ({} > {}), emitting it whole",
                self.units[fresh].chars.start,
                self.units[fresh].chars.end,
                unit_length,
                chunk_size
            );
            (fresh, fresh + 1, unit_length, ChunkType::OversizedUnit)
        } else {
            // keep as much of the seed as leaves room for the first fresh unit
            let (kept, seeded_length) =
                last_within(fresh - self.seed_start, chunk_size, unit_length, |k| {
                    self.measure_units(fresh - k, fresh + 1)
                })?;
            let first = fresh - kept;
            let (extra, length) = last_within(
                self.units.len() - fresh - 1,
                chunk_size,
                seeded_length,
                |k| self.measure_units(first, fresh + 1 + k),
            )?;
            (first, fresh + 1 + extra, length, ChunkType::Packed)
        };

        let char_start = self.units[first].chars.start;
        let char_end = self.units[end - 1].chars.end;
        let overlap_chars = if first < fresh {
            self.units[fresh - 1].chars.end - char_start
        } else {
            0
        };
        let content = self
            .documents
            .byte_slice(self.units[first].bytes.start, self.units[end - 1].bytes.end)
            .into_owned();

        self.seed_start = self.overlap_seed(first, end)?;
        self.next_unit = end;

        let chunk = TextChunk {
            content,
            char_start,
            char_end,
            chunk_index: self.chunk_index,
            overlap_chars,
            length,
            chunk_type,
        };
        self.chunk_index += 1;
        trace!(
            "Chunk {}: chars {}..{}, length {}, overlap {} chars",
            chunk.chunk_index, chunk.char_start, chunk.char_end, chunk.length, chunk.overlap_chars
        );
        Ok(chunk)
    }

    /// First unit of the longest suffix of `units[first..end]` whose length fits the overlap
    fn overlap_seed(&self, first: usize, end: usize) -> Result<usize> {
        let chunk_overlap = self.config.chunk_overlap;
        if chunk_overlap == 0 || end >= self.units.len() {
            return Ok(end);
        }
        let (kept, _) = last_within(end - first, chunk_overlap, 0, |k| {
            self.measure_units(end - k, end)
        })?;
        Ok(end - kept)
    }
}

/// Largest `k` in `0..=max` whose measure stays within `budget`, with that measure
///
/// `measure` must not decrease as `k` grows, and `at_zero` (the measure of `k = 0`)
/// must be within the budget. Probes gallop outwards, then bisect, so each call
/// costs `O(log k)` measurements none much longer than the result.
fn last_within(
    max: usize,
    budget: usize,
    at_zero: usize,
    mut measure: impl FnMut(usize) -> Result<usize>,
) -> Result<(usize, usize)> {
    let (mut good, mut good_length) = (0, at_zero);
    let mut bad = max + 1;
    let mut step = 1;
    while good < max {
        let probe = (good + step).min(max);
        let length = measure(probe)?;
        if length > budget {
            bad = probe;
            break;
        }
        good = probe;
        good_length = length;
        step *= 2;
    }
    while bad - good > 1 {
        let mid = good + (bad - good) / 2;
        let length = measure(mid)?;
        if length > budget {
            bad = mid;
        } else {
            good = mid;
            good_length = length;
        }
    }
    Ok((good, good_length))
}

impl<S: AsRef<str>, L: LengthFunction> Iterator for ChunkIterator<'_, S, L> {
    type Item = Result<TextChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_unit >= self.units.len() {
            return None;
        }
        match self.next_chunk() {
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                warn!("Chunking aborted ({}): {}", e.category(), e);
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Reusable splitter holding a validated configuration
pub struct Splitter<L = Characters> {
    config: ChunkConfig<L>,
    detector: BoundaryDetector,
}

impl<L: LengthFunction> Splitter<L> {
    pub fn new(config: ChunkConfig<L>) -> Result<Self> {
        config
            .validate()
            .map_err(ChunkingError::invalid_configuration)?;
        Ok(Self {
            config,
            detector: BoundaryDetector::new()?,
        })
    }

    /// Get configuration reference
    pub fn config(&self) -> &ChunkConfig<L> {
        &self.config
    }

    pub fn chunks<'a, S: AsRef<str>>(&'a self, documents: &'a [S]) -> ChunkIterator<'a, S, L> {
        ChunkIterator::new(documents, &self.config, &self.detector)
    }

    pub fn split_chunks<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<TextChunk>> {
        collect_chunks(self.chunks(documents), documents.len(), &self.config)
    }

    pub fn split<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<String>> {
        Ok(self
            .split_chunks(documents)?
            .into_iter()
            .map(|chunk| chunk.content)
            .collect())
    }
}

/// Lazily split `documents`; the configuration is validated before any work
pub fn iterate_chunks<'a, S: AsRef<str>, L: LengthFunction>(
    documents: &'a [S],
    config: &'a ChunkConfig<L>,
) -> Result<ChunkIterator<'a, S, L>> {
    config
        .validate()
        .map_err(ChunkingError::invalid_configuration)?;
    let detector = BoundaryDetector::new()?;
    Ok(ChunkIterator::new(documents, config, &detector))
}

/// Split `documents` into chunks with positions
pub fn split_chunks<S: AsRef<str>, L: LengthFunction>(
    documents: &[S],
    config: &ChunkConfig<L>,
) -> Result<Vec<TextChunk>> {
    collect_chunks(iterate_chunks(documents, config)?, documents.len(), config)
}

fn collect_chunks<S: AsRef<str>, L: LengthFunction>(
    chunks: ChunkIterator<'_, S, L>,
    document_count: usize,
    config: &ChunkConfig<L>,
) -> Result<Vec<TextChunk>> {
    let chunks = chunks.collect::<Result<Vec<_>>>()?;
    debug!(
        "Split {} documents into {} chunks ({} oversized, size {}, overlap {})",
        document_count,
        chunks.len(),
        chunks.iter().filter(|c| c.chunk_type.exceeds_budget()).count(),
        config.chunk_size,
        config.chunk_overlap
    );
    Ok(chunks)
}

/// Split `documents` into chunk strings
pub fn split<S: AsRef<str>, L: LengthFunction>(
    documents: &[S],
    config: &ChunkConfig<L>,
) -> Result<Vec<String>> {
    Ok(split_chunks(documents, config)?
        .into_iter()
        .map(|chunk| chunk.content)
        .collect())
}
