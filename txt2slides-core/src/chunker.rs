//! Splitting raw text into slide-sized chunks.
//!
//! A chunk is a run of non-blank lines; a line that is blank after trimming
//! closes the current chunk. Chunks are returned in input order.

use serde::{Deserialize, Serialize};

/// Text content of one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        Chunk { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// How the final chunk (after the last blank line) is formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingChunk {
    /// The accumulated lines, each terminated by `\n`, like every other chunk.
    #[default]
    Buffered,
    /// Only the last physical line, without terminator. Matches the output of
    /// earlier txt2slides releases, which drop all but the last line of the
    /// final paragraph.
    LastLine,
}

/// Split `content` using [`TrailingChunk::Buffered`].
pub fn split(content: &str) -> Vec<Chunk> {
    split_with(content, TrailingChunk::Buffered)
}

/// Split `content` into chunks, always returning at least one.
pub fn split_with(content: &str, trailing: TrailingChunk) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut buffer = String::new();
    let mut last_line = "";

    for line in content.lines() {
        last_line = line;
        if line.trim().is_empty() {
            out.push(Chunk::new(std::mem::take(&mut buffer)));
            continue;
        }
        buffer.push_str(line);
        buffer.push('\n');
    }

    out.push(match trailing {
        TrailingChunk::Buffered => Chunk::new(buffer),
        TrailingChunk::LastLine => Chunk::new(last_line),
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_single_empty_chunk() {
        assert_eq!(texts(&split("")), vec![""]);
        assert_eq!(texts(&split_with("", TrailingChunk::LastLine)), vec![""]);
    }

    #[test]
    fn lines_without_separator_form_one_chunk() {
        assert_eq!(texts(&split("a\nb")), vec!["a\nb\n"]);
    }

    #[test]
    fn blank_line_separates_chunks() {
        assert_eq!(texts(&split("a\n\nb")), vec!["a\n", "b\n"]);
    }

    #[test]
    fn last_line_policy_keeps_only_raw_final_line() {
        assert_eq!(
            texts(&split_with("a\n\nb", TrailingChunk::LastLine)),
            vec!["a\n", "b"]
        );
        assert_eq!(texts(&split_with("a\nb", TrailingChunk::LastLine)), vec!["b"]);
    }

    #[test]
    fn whitespace_only_line_counts_as_blank() {
        assert_eq!(texts(&split("one\n  \t \ntwo\n")), vec!["one\n", "two\n"]);
    }

    #[test]
    fn consecutive_blank_lines_yield_empty_chunks() {
        assert_eq!(texts(&split("a\n\n\nb")), vec!["a\n", "", "b\n"]);
    }

    #[test]
    fn trailing_blank_line_leaves_empty_remainder() {
        assert_eq!(texts(&split("a\n\n")), vec!["a\n", ""]);
    }

    #[test]
    fn crlf_terminators_are_not_kept() {
        assert_eq!(texts(&split("a\r\nb\r\n\r\nc")), vec!["a\nb\n", "c\n"]);
    }

    #[test]
    fn rejoining_chunks_reproduces_non_blank_lines() {
        let input = "title one\nbody\n\ntitle two\n\n\nthree\nfour";
        let chunks = split(input);
        let rejoined: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.text.lines().map(str::to_owned))
            .collect();
        let original: Vec<String> = input
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_owned)
            .collect();
        assert_eq!(rejoined, original);
        assert!(!chunks.is_empty());
    }
}
