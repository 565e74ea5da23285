pub mod tracing;

pub mod text {
    use std::ops::Range;

    /// Byte position of the `char_index`-th character, or `text.len()` past the end
    pub fn char_to_byte(text: &str, char_index: usize) -> usize {
        text.char_indices()
            .nth(char_index)
            .map(|(byte_pos, _)| byte_pos)
            .unwrap_or(text.len())
    }

    /// Slice `text` by character positions (clamped to the text)
    pub fn slice_chars(text: &str, char_start: usize, char_end: usize) -> &str {
        if char_start >= char_end {
            return "";
        }
        let byte_start = char_to_byte(text, char_start);
        let byte_end = byte_start + char_to_byte(&text[byte_start..], char_end - char_start);
        &text[byte_start..byte_end]
    }

    /// Byte range of `text[range]` without surrounding whitespace, `None` if blank
    pub fn trimmed_span(text: &str, range: Range<usize>) -> Option<Range<usize>> {
        let slice = &text[range.clone()];
        let trimmed = slice.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lead = slice.len() - slice.trim_start().len();
        let start = range.start + lead;
        Some(start..start + trimmed.len())
    }

    /// Map ordered, non-overlapping byte ranges of `text` to character ranges in one pass
    pub fn byte_spans_to_char_spans(text: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
        let mut result = Vec::with_capacity(spans.len());
        let mut last_byte = 0;
        let mut last_char = 0;
        for span in spans {
            let start = last_char + text[last_byte..span.start].chars().count();
            let end = start + text[span.clone()].chars().count();
            result.push(start..end);
            last_byte = span.end;
            last_char = end;
        }
        result
    }

}
