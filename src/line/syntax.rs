use std::fmt;

/// A non-empty set of single-character delimiters.
///
/// Both the comment marker (`-c`) and the key/value separator (`-s`) are
/// sets: any member character delimits. Where a single character has to be
/// written back (joining tokens), the first character of the set is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterSet {
    chars: Vec<char>,
}

impl DelimiterSet {
    /// Build a set from the characters of `text`. Returns `None` when `text`
    /// is empty.
    pub fn new(text: &str) -> Option<Self> {
        let mut chars: Vec<char> = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if !chars.contains(&ch) {
                chars.push(ch);
            }
        }
        if chars.is_empty() {
            None
        } else {
            Some(Self { chars })
        }
    }

    /// Whether `ch` is a member of the set.
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    /// The character emitted when rejoining delimited text.
    pub fn primary(&self) -> char {
        self.chars[0]
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl fmt::Display for DelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{}", ch.escape_debug())?;
        }
        Ok(())
    }
}

/// Delimiters describing a flat `key SEP value COMMENT tail` line format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSyntax {
    pub comment: DelimiterSet,
    pub separator: DelimiterSet,
}

impl LineSyntax {
    pub fn new(comment: DelimiterSet, separator: DelimiterSet) -> Self {
        Self { comment, separator }
    }

    /// `#` comments with space-separated values, as used by `sshd_config`.
    pub fn sshd() -> Self {
        Self {
            comment: DelimiterSet { chars: vec!['#'] },
            separator: DelimiterSet { chars: vec![' '] },
        }
    }
}
