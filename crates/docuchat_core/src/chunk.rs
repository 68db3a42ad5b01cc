//! crates/docuchat_core/src/chunk.rs
//!
//! Splits extracted document text into bounded-size segments so that each
//! segment fits comfortably inside the embedding model's context window.
//! Boundaries fall on whitespace; segments are non-empty and preserve the
//! original order of the text.

/// Upper bound on the character length of a single segment.
pub const MAX_SEGMENT_CHARS: usize = 1000;

/// Chunks `text` into segments of at most `max_chars` characters.
///
/// Words are accumulated greedily. A single word longer than `max_chars`
/// is split at character boundaries so the bound always holds.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                segments.push(piece.iter().collect());
            }
            continue;
        }

        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word_len > max_chars {
            segments.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_segments() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("   \n\t  ", 100).is_empty());
    }

    #[test]
    fn short_text_is_a_single_segment() {
        let segments = chunk_text("hello world", 100);
        assert_eq!(segments, vec!["hello world".to_string()]);
    }

    #[test]
    fn segments_respect_the_character_bound() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let segments = chunk_text(text, 20);
        assert!(segments.len() > 1);
        for segment in &segments {
            assert!(segment.chars().count() <= 20, "segment too long: {segment:?}");
            assert!(!segment.trim().is_empty());
        }
    }

    #[test]
    fn word_order_is_preserved() {
        let text = "one two three four five six seven eight nine ten";
        let segments = chunk_text(text, 12);
        let rejoined: Vec<&str> = segments
            .iter()
            .flat_map(|s| s.split_whitespace())
            .collect();
        assert_eq!(
            rejoined,
            vec!["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"]
        );
    }

    #[test]
    fn oversized_word_is_split_at_the_bound() {
        let long_word = "x".repeat(25);
        let segments = chunk_text(&long_word, 10);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 10);
        assert_eq!(segments[1].len(), 10);
        assert_eq!(segments[2].len(), 5);
    }

    #[test]
    fn whitespace_runs_are_collapsed() {
        let segments = chunk_text("a   b\n\nc", 100);
        assert_eq!(segments, vec!["a b c".to_string()]);
    }
}
