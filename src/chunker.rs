//! Recursive, overlap-preserving text chunking.

use crate::config::ChunkConfig;
use crate::page::Chunk;

/// Splits content into size-bounded chunks.
///
/// Content at or under the size bound comes back as a single trimmed chunk,
/// including empty input. Longer content is segmented by recursive separator
/// descent, coarsest separator first, with greedy accumulation; a part that
/// no separator can break is cut into fixed windows of exactly
/// `max_chunk_size` characters. After segmentation, every chunk past the
/// first is prefixed with the trailing `overlap` characters of its
/// predecessor segment, so chunks may exceed the size bound by the overlap.
/// All lengths are measured in characters, not bytes.
pub fn chunk_text(content: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let max = config.max_chunk_size();
    if char_len(content) <= max {
        return vec![Chunk {
            content: content.trim().to_string(),
            chunk_index: 0,
            total_chunks: 1,
            section: None,
        }];
    }

    let segments = split_recursive(content, config.separators(), max);
    let total = segments.len();
    let overlap = config.overlap();

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let content = if index == 0 {
                segment.trim().to_string()
            } else {
                let tail = char_tail(&segments[index - 1], overlap);
                format!("{tail} {segment}").trim().to_string()
            };
            Chunk {
                content,
                chunk_index: index,
                total_chunks: total,
                section: None,
            }
        })
        .collect()
}

fn split_recursive(content: &str, separators: &[String], max: usize) -> Vec<String> {
    let Some((sep, rest)) = separators.split_first() else {
        return force_windows(content, max);
    };
    if sep.is_empty() {
        return force_windows(content, max);
    }

    let parts: Vec<&str> = content.split(sep.as_str()).collect();
    if parts.len() == 1 {
        return split_recursive(content, rest, max);
    }

    let sep_len = char_len(sep);
    let mut segments = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for part in parts {
        let part_len = char_len(part);
        if buffer.is_empty() {
            if part_len <= max {
                buffer.push_str(part);
                buffer_len = part_len;
            } else {
                segments.extend(split_recursive(part, rest, max));
            }
            continue;
        }

        if buffer_len + sep_len + part_len <= max {
            buffer.push_str(sep);
            buffer.push_str(part);
            buffer_len += sep_len + part_len;
        } else {
            segments.push(std::mem::take(&mut buffer));
            buffer_len = 0;
            if part_len <= max {
                buffer.push_str(part);
                buffer_len = part_len;
            } else {
                segments.extend(split_recursive(part, rest, max));
            }
        }
    }

    if !buffer.is_empty() {
        segments.push(buffer);
    }
    segments
}

fn force_windows(content: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    chars
        .chunks(max.max(1))
        .map(|window| window.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn char_tail(text: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }
    let total = char_len(text);
    if total <= count {
        return text;
    }
    match text.char_indices().nth(total - count) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(max: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig::new(max, overlap)
    }

    #[test]
    fn short_content_is_a_single_trimmed_chunk() {
        let chunks = chunk_text("  hello world  ", &config(1000, 200));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn empty_content_is_a_single_empty_chunk() {
        let chunks = chunk_text("", &config(1000, 200));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "");
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn separator_free_content_falls_back_to_fixed_windows() {
        let content = "A".repeat(2500);
        let chunks = chunk_text(&content, &config(1000, 200));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.chars().count(), 1000);
        assert_eq!(chunks[1].content.chars().count(), 1201);
        assert_eq!(chunks[2].content.chars().count(), 701);
        assert!(chunks[1].content.starts_with(&"A".repeat(200)));
        assert_eq!(chunks[1].content.chars().nth(200), Some(' '));
    }

    #[test]
    fn paragraphs_split_on_the_coarsest_separator_first() {
        let first = "a".repeat(600);
        let second = "b".repeat(600);
        let content = format!("{first}\n\n{second}");
        let chunks = chunk_text(&content, &config(1000, 200));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, first);
        let expected = format!("{} {second}", "a".repeat(200));
        assert_eq!(chunks[1].content, expected);
    }

    #[test]
    fn small_paragraphs_accumulate_greedily() {
        let para = "word ".repeat(40).trim().to_string();
        let content = format!("{para}\n\n{para}\n\n{para}\n\n{para}\n\n{para}\n\n{para}");
        let chunks = chunk_text(&content, &config(1000, 200));

        assert!(chunks.len() > 1);
        assert!(chunks[0].content.chars().count() <= 1000);
        assert!(chunks[0].content.contains("\n\n"));
    }

    #[test]
    fn long_paragraph_descends_to_sentence_separators() {
        let sentence = "x".repeat(120);
        let content = vec![sentence.clone(); 12].join(". ");
        let chunks = chunk_text(&content, &config(1000, 200));

        // Eight sentences fit the first segment, four land in the second;
        // the second chunk carries the 200-character overlap plus the joining
        // space.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.chars().count(), 974);
        assert_eq!(chunks[1].content.chars().count(), 687);
    }

    #[test]
    fn indices_are_contiguous_and_totals_consistent() {
        let content = "lorem ipsum dolor sit amet. ".repeat(200);
        let chunks = chunk_text(&content, &config(500, 100));

        let total = chunks.len();
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, expected);
            assert_eq!(chunk.total_chunks, total);
        }
    }

    #[test]
    fn overlap_repeats_the_predecessor_tail() {
        let first = "a".repeat(400);
        let second = "b".repeat(400);
        let third = "c".repeat(400);
        let content = format!("{first}\n\n{second}\n\n{third}");
        let chunks = chunk_text(&content, &config(500, 50));

        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].content.starts_with(&format!("{} b", "a".repeat(50))));
        assert!(chunks[2].content.starts_with(&format!("{} c", "b".repeat(50))));
    }

    #[test]
    fn zero_overlap_keeps_segments_verbatim() {
        let first = "a".repeat(600);
        let second = "b".repeat(600);
        let content = format!("{first}\n\n{second}");
        let chunks = chunk_text(&content, &config(1000, 0));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, first);
        assert_eq!(chunks[1].content, second);
    }

    #[test]
    fn multibyte_lengths_are_counted_in_characters() {
        let content = "é".repeat(1500);
        let chunks = chunk_text(&content, &config(1000, 100));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.chars().count(), 1000);
        assert_eq!(chunks[1].content.chars().count(), 601);
    }
}
