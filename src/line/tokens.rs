use crate::line::syntax::DelimiterSet;
use std::borrow::Cow;

/// Split `text` on any character of `set`, collapsing runs of delimiters into
/// a single split point.
///
/// Empty pieces can only appear at the edges: a leading delimiter run yields
/// a leading `""`, a trailing run a trailing `""`, and the empty string
/// yields `[""]`.
pub fn split_compressed<'a>(text: &'a str, set: &DelimiterSet) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !set.contains(ch) {
            continue;
        }
        pieces.push(&text[start..idx]);

        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if !set.contains(next) {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }
        start = end;
    }

    pieces.push(&text[start..]);
    pieces
}

/// The tokens of a config segment.
///
/// Tokens borrow from the source line until one is overwritten by a
/// substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence<'a> {
    tokens: Vec<Cow<'a, str>>,
}

impl<'a> TokenSequence<'a> {
    pub fn split(segment: &'a str, separator: &DelimiterSet) -> Self {
        Self {
            tokens: split_compressed(segment, separator)
                .into_iter()
                .map(Cow::Borrowed)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|token| &**token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|token| &**token)
    }

    /// Overwrite the token at `index`. Returns `false` if there is no such
    /// token.
    pub fn replace(&mut self, index: usize, value: &str) -> bool {
        match self.tokens.get_mut(index) {
            Some(slot) => {
                *slot = Cow::Owned(value.to_string());
                true
            }
            None => false,
        }
    }

    /// Join tokens `0..=last` with `separator`, skipping empty tokens.
    pub fn join_through(&self, last: usize, separator: char) -> String {
        let mut out = String::new();
        for token in self.tokens.iter().take(last + 1) {
            if token.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(separator);
            }
            out.push_str(token);
        }
        out
    }
}
