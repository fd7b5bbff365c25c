//! Recursive character splitter with overlap.
//!
//! Splits text into windows of at most `chunk_size` characters with
//! `chunk_overlap` characters shared between consecutive windows. Each window
//! prefers to end at the highest-priority separator found in its second half:
//! paragraph break, then newline, then space, then a hard character cut.

use async_trait::async_trait;
use ragserve_core::{ChunkConfig, ChunkError, ChunkOutput, Chunker};
use tracing::debug;

/// Separator-priority recursive splitter.
pub struct RecursiveChunker;

impl RecursiveChunker {
    /// Create a new recursive chunker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Chunker for RecursiveChunker {
    fn name(&self) -> &str {
        "recursive_character"
    }

    async fn chunk(
        &self,
        text: &str,
        config: &ChunkConfig,
    ) -> Result<Vec<ChunkOutput>, ChunkError> {
        if config.chunk_size == 0 {
            return Err(ChunkError::InvalidConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(ChunkError::InvalidConfig(
                "chunk_overlap must be smaller than chunk_size".to_string(),
            ));
        }

        if text.is_empty() {
            return Ok(vec![]);
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let target_end = (start + config.chunk_size).min(total);
            let end = find_break_point(&chars, start, target_end, total);

            let content: String = chars[start..end].iter().collect();
            if !content.trim().is_empty() {
                chunks.push(ChunkOutput {
                    content,
                    char_range: start..end,
                });
            }

            if end >= total {
                break;
            }

            // Step back by the overlap, but always make forward progress.
            start = end.saturating_sub(config.chunk_overlap).max(start + 1);
        }

        debug!(
            "split {} chars into {} chunks (size {}, overlap {})",
            total,
            chunks.len(),
            config.chunk_size,
            config.chunk_overlap
        );
        Ok(chunks)
    }
}

/// Find the best break point at or before `target_end`.
///
/// Searches the second half of the window so a chunk never shrinks below half
/// the configured size just to honor a separator.
fn find_break_point(chars: &[char], start: usize, target_end: usize, total: usize) -> usize {
    if target_end >= total {
        return total;
    }

    let search_start = start + (target_end - start) / 2;

    // Paragraph break first
    for i in (search_start..target_end.saturating_sub(1)).rev() {
        if chars[i] == '\n' && chars[i + 1] == '\n' {
            return i + 2;
        }
    }

    // Then single newline
    for i in (search_start..target_end).rev() {
        if chars[i] == '\n' {
            return i + 1;
        }
    }

    // Then space
    for i in (search_start..target_end).rev() {
        if chars[i] == ' ' {
            return i + 1;
        }
    }

    // Hard cut
    target_end
}
