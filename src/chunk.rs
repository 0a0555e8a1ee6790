//! Blank-line paragraph chunker.
//!
//! Splits pasted text into paragraph-level chunks on runs of two or more
//! newlines. Each chunk is trimmed; whitespace-only chunks are dropped and
//! relative order is preserved. Single newlines inside a paragraph survive.

/// Split text into ingestion chunks on blank-line runs.
pub fn split_chunks(text: &str) -> Vec<String> {
    // Splitting on the two-newline separator and discarding empties is
    // equivalent to splitting on runs of >= 2 newlines: a chunk body can
    // never itself contain a blank line.
    text.split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
