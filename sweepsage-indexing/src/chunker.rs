//! Recursive character splitting of documents into segments.
//!
//! Text is split on the most preferred separator that occurs in it. Pieces that still exceed the
//! chunk size are split again with the remaining separators, and once those run out they are
//! split per character. Neighbouring pieces are then merged back up to the chunk size, carrying
//! the tail of each chunk over into the next one as overlap.
//!
//! Separators are kept, attached to the start of the piece that follows them, and every chunk is
//! trimmed of surrounding whitespace. Joining the chunks with their overlap removed gives back the
//! input text up to whitespace at chunk boundaries.
use std::collections::VecDeque;

use derive_builder::Builder;
use sweepsage_core::{Document, Segment};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkerError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
    #[error("missing chunker setting: {0}")]
    MissingSetting(&'static str),
}

/// Splits documents into segments of at most `chunk_size` characters.
///
/// Lengths are counted in characters, not bytes.
///
/// # Example
///
/// ```
/// # use sweepsage_indexing::RecursiveCharacterSplitter;
/// let splitter = RecursiveCharacterSplitter::builder()
///     .chunk_size(10_usize)
///     .chunk_overlap(0_usize)
///     .separators(vec![" ".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(splitter.split_text("charge the robot"), vec!["charge the", "robot"]);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "ChunkerError"))]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    #[builder(default)]
    chunk_overlap: usize,
    #[builder(default = "default_separators()")]
    separators: Vec<String>,
}

/// Paragraph, line and sentence boundaries, for both latin and CJK punctuation
pub fn default_separators() -> Vec<String> {
    ["\n\n", "\n", "。", "！", "？", ".", "!", "?", " ", ""]
        .into_iter()
        .map(String::from)
        .collect()
}

impl RecursiveCharacterSplitterBuilder {
    fn validate(&self) -> Result<(), ChunkerError> {
        let size = self.chunk_size.unwrap_or_default();
        let overlap = self.chunk_overlap.unwrap_or_default();
        if size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if overlap >= size {
            return Err(ChunkerError::OverlapTooLarge { size, overlap });
        }
        Ok(())
    }
}

impl From<derive_builder::UninitializedFieldError> for ChunkerError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        ChunkerError::MissingSetting(e.field_name())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveCharacterSplitter {
    pub fn builder() -> RecursiveCharacterSplitterBuilder {
        RecursiveCharacterSplitterBuilder::default()
    }

    /// # Errors
    ///
    /// Fails when `chunk_size` is zero or `chunk_overlap` is not smaller than `chunk_size`.
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: Vec<String>,
    ) -> Result<Self, ChunkerError> {
        Self::builder()
            .chunk_size(chunk_size)
            .chunk_overlap(chunk_overlap)
            .separators(separators)
            .build()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits every document, copying its metadata onto each of its segments
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Segment> {
        documents
            .iter()
            .flat_map(|document| {
                self.split_text(&document.text)
                    .into_iter()
                    .map(|text| Segment::new(text, document.metadata.clone()))
            })
            .collect()
    }

    /// Splits text into trimmed, non-empty chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; the empty separator always matches
        let (separator, remaining) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(sep.as_str()))
            .map_or(("", &[][..]), |(i, sep)| (sep.as_str(), &separators[i + 1..]));

        let mut chunks = Vec::new();
        let mut small_pieces: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small_pieces.push(piece);
                continue;
            }

            if !small_pieces.is_empty() {
                chunks.extend(self.merge_pieces(&small_pieces));
                small_pieces.clear();
            }

            if char_len(piece) == self.chunk_size {
                chunks.extend(trimmed(piece));
            } else if remaining.is_empty() {
                // Out of separators, fall back to splitting per character
                chunks.extend(self.merge_pieces(&split_keeping_separator(piece, "")));
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !small_pieces.is_empty() {
            chunks.extend(self.merge_pieces(&small_pieces));
        }

        chunks
    }

    /// Greedily joins pieces into chunks, keeping up to `chunk_overlap` characters of trailing
    /// pieces at the start of the next chunk
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                chunks.extend(trimmed(&current.iter().copied().collect::<String>()));

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let Some(dropped) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(dropped);
                }
            }

            current.push_back(piece);
            total += len;
        }

        chunks.extend(trimmed(&current.iter().copied().collect::<String>()));
        chunks
    }
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Splits on `separator`, attaching each separator to the start of the piece after it. The empty
/// separator splits into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
        }
        start = index;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
