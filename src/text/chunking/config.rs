//! Configuration, length policies and boundary strategies for text chunking

use super::error::{ChunkingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length policy used for every chunk-size comparison
///
/// This trait abstracts the notion of "size" so that chunks can be bounded by
/// characters, tokens of an external tokenizer, or any other measure.
///
/// Lengths are integers. Fractional measures are expressed in fixed point by
/// scaling both the length and `chunk_size` (e.g. hundredths). The length of a
/// text must not decrease when units are appended to it.
pub trait LengthFunction {
    /// Measure a text fragment
    fn length(&self, text: &str) -> anyhow::Result<usize>;
}

/// Default length policy: number of characters (Unicode scalar values)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Characters;

impl LengthFunction for Characters {
    fn length(&self, text: &str) -> anyhow::Result<usize> {
        Ok(text.chars().count())
    }
}

impl<F> LengthFunction for F
where
    F: Fn(&str) -> usize,
{
    fn length(&self, text: &str) -> anyhow::Result<usize> {
        Ok(self(text))
    }
}

/// Adapter for length functions that may fail (e.g. an external tokenizer)
#[derive(Clone, Copy)]
pub struct TryLength<F>(pub F);

impl<F> LengthFunction for TryLength<F>
where
    F: Fn(&str) -> anyhow::Result<usize>,
{
    fn length(&self, text: &str) -> anyhow::Result<usize> {
        (self.0)(text)
    }
}

/// Where candidate split points may occur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Every character is a unit
    #[default]
    #[serde(alias = "char", alias = "characters")]
    Character,
    /// Sentences delimited by terminal punctuation
    #[serde(alias = "sentences")]
    Sentence,
    /// Paragraphs delimited by blank lines
    #[serde(alias = "paragraphs")]
    Paragraph,
}

impl ChunkStrategy {
    pub const ALL: [ChunkStrategy; 3] = [Self::Character, Self::Sentence, Self::Paragraph];

    /// String literal accepted by `FromStr` and serde
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Character => "character",
            ChunkStrategy::Sentence => "sentence",
            ChunkStrategy::Paragraph => "paragraph",
        }
    }

    /// Whether whitespace between units may be dropped at chunk boundaries
    pub fn collapses_whitespace(&self) -> bool {
        !matches!(self, ChunkStrategy::Character)
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = ChunkingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" | "characters" | "char" => Ok(ChunkStrategy::Character),
            "sentence" | "sentences" => Ok(ChunkStrategy::Sentence),
            "paragraph" | "paragraphs" => Ok(ChunkStrategy::Paragraph),
            other => Err(ChunkingError::invalid_configuration(format!(
                "unknown chunk strategy: {other:?}"
            ))),
        }
    }
}

/// Configuration for splitting documents into chunks
#[derive(Clone)]
pub struct ChunkConfig<L = Characters> {
    /// Maximum length of a chunk, as measured by `length_function`
    pub chunk_size: usize,
    /// Maximum length of content repeated from the previous chunk
    pub chunk_overlap: usize,
    pub length_function: L,
    pub chunk_strategy: ChunkStrategy,
}

impl ChunkConfig<Characters> {
    /// Character-counted configuration with no overlap
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap: 0,
            length_function: Characters,
            chunk_strategy: ChunkStrategy::default(),
        }
    }
}

impl<L> ChunkConfig<L> {
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_chunk_strategy(mut self, chunk_strategy: ChunkStrategy) -> Self {
        self.chunk_strategy = chunk_strategy;
        self
    }

    /// Replace the length policy
    pub fn with_length_function<M: LengthFunction>(self, length_function: M) -> ChunkConfig<M> {
        ChunkConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            length_function,
            chunk_strategy: self.chunk_strategy,
        }
    }

    /// Validate configuration settings
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        Ok(())
    }
}

impl<L: LengthFunction> ChunkConfig<L> {
    /// Measure text with the configured length policy
    pub fn measure(&self, text: &str) -> Result<usize> {
        self.length_function
            .length(text)
            .map_err(ChunkingError::LengthFunction)
    }
}

impl Default for ChunkConfig<Characters> {
    fn default() -> Self {
        Self::new(512)
    }
}

impl<L> fmt::Debug for ChunkConfig<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkConfig")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("length_function", &std::any::type_name::<L>())
            .field("chunk_strategy", &self.chunk_strategy)
            .finish()
    }
}

/// Serializable chunk settings, e.g. read from environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    #[serde(default)]
    pub chunk_overlap: usize,
    #[serde(default)]
    pub chunk_strategy: ChunkStrategy,
}

impl ChunkSettings {
    pub const ENV_PREFIX: &'static str = "CHUNK_";

    /// Load settings from `CHUNK_CHUNK_SIZE`, `CHUNK_CHUNK_OVERLAP` and `CHUNK_CHUNK_STRATEGY`
    pub fn from_env() -> Result<Self> {
        Ok(envy::prefixed(Self::ENV_PREFIX).from_env::<ChunkSettings>()?)
    }

    /// Load settings from explicit `(name, value)` pairs using the same variable names as `from_env`
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(Self::ENV_PREFIX).from_iter::<_, ChunkSettings>(vars)?)
    }

    /// Build a validated character-counted configuration
    pub fn into_config(self) -> Result<ChunkConfig<Characters>> {
        self.into_config_with(Characters)
    }

    /// Build a validated configuration with a custom length policy
    pub fn into_config_with<L: LengthFunction>(self, length_function: L) -> Result<ChunkConfig<L>> {
        let config = ChunkConfig::new(self.chunk_size)
            .with_chunk_overlap(self.chunk_overlap)
            .with_chunk_strategy(self.chunk_strategy)
            .with_length_function(length_function);
        config
            .validate()
            .map_err(ChunkingError::invalid_configuration)?;
        Ok(config)
    }
}
