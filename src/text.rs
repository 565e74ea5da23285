pub mod chunking;

use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Sentence boundary detection over byte spans
///
/// A sentence ends at a run of stop characters (optionally followed by closing
/// quotes) when whitespace or the end of text follows. Force characters end a
/// sentence immediately. Stop characters inside paired brackets are ignored.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    stop_chars: HashSet<char>,
    force: HashSet<char>,
    parentheses: HashMap<char, char>,
}

impl SentenceSplitter {
    // 地の文だけをまとめる括弧。この中の句点では区切らない。
    // ()[]はプログラミングや顔文字など文以外でも使われるので扱わない
    pub const PARENTHESES: [(char, char); 3] = [('「', '」'), ('『', '』'), ('【', '】')];

    pub const STOP_CHARS: [char; 4] = ['.', '!', '?', '…'];

    // 全角の句点は後続の空白を待たずに区切る
    pub const FORCE_CHARS: [char; 4] = ['。', '．', '！', '？'];

    pub const CLOSING_QUOTES: [char; 7] = ['"', '\'', ')', ']', '”', '’', '）'];

    pub fn new(
        stop_chars: Option<HashSet<char>>,
        force: Option<HashSet<char>>,
        parentheses: Option<HashMap<char, char>>,
    ) -> Self {
        SentenceSplitter {
            stop_chars: stop_chars.unwrap_or(Self::STOP_CHARS.iter().cloned().collect()),
            force: force.unwrap_or(Self::FORCE_CHARS.iter().cloned().collect()),
            parentheses: parentheses.unwrap_or(Self::PARENTHESES.iter().cloned().collect()),
        }
    }

    fn is_terminal(&self, c: char) -> bool {
        self.stop_chars.contains(&c) || self.force.contains(&c)
    }

    /// Byte spans of the sentences in `text`, without surrounding whitespace
    pub fn split_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut sentence_start: Option<usize> = None;
        let mut waiting_stack: Vec<char> = vec![];
        let mut chars = text.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            let start = match sentence_start {
                Some(start) => start,
                None if c.is_whitespace() => continue,
                None => {
                    sentence_start = Some(pos);
                    pos
                }
            };

            if let Some(close) = self.parentheses.get(&c) {
                waiting_stack.push(*close);
                continue;
            }
            if let Some(d) = waiting_stack.last() {
                if c == *d {
                    waiting_stack.pop();
                } else if c == '\n' {
                    // unbalanced bracket: do not swallow the rest of the text
                    waiting_stack.clear();
                }
                continue;
            }
            if !self.is_terminal(c) {
                continue;
            }

            let mut forced = self.force.contains(&c);
            let mut end = pos + c.len_utf8();
            while let Some(&(next_pos, next)) = chars.peek() {
                if self.is_terminal(next) || Self::CLOSING_QUOTES.contains(&next) {
                    forced |= self.force.contains(&next);
                    end = next_pos + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let at_boundary = forced
                || chars
                    .peek()
                    .is_none_or(|&(_, next)| next.is_whitespace());
            if at_boundary {
                spans.push(start..end);
                sentence_start = None;
            }
        }

        if let Some(start) = sentence_start {
            let end = text.trim_end().len();
            if end > start {
                spans.push(start..end);
            }
        }
        spans
    }

    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.split_spans(text)
            .into_iter()
            .map(|span| &text[span])
            .collect()
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}
