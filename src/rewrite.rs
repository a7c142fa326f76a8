//! Key/value substitution on a single line.
//!
//! The config segment's tokens are scanned left to right. The first token
//! equal to a requested key has the token after it replaced by the requested
//! value, and scanning stops: at most one substitution per line. A key in
//! last position has nothing to replace and scanning moves on.

use crate::line::{DataLine, Line, LineSyntax, TokenSequence};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Requested `key -> value` substitutions.
///
/// Ordered by key so iteration (verbose echo, profile merging) is
/// reproducible. Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementSet {
    entries: BTreeMap<String, String>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, returning the value it displaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ReplacementSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for ReplacementSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'s> IntoIterator for &'s ReplacementSet {
    type Item = (&'s String, &'s String);
    type IntoIter = btree_map::Iter<'s, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Where a substitution happened within a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The key that matched.
    pub key: String,
    /// Index of the key token.
    pub key_index: usize,
    /// Index of the overwritten value token (`key_index + 1`).
    pub value_index: usize,
}

/// Apply the first applicable substitution to `tokens`.
///
/// Empty tokens only occur at the edges of a sequence (collapsed separator
/// runs) and never match a key.
pub fn substitute(
    tokens: &mut TokenSequence<'_>,
    replacements: &ReplacementSet,
) -> Option<Substitution> {
    for key_index in 0..tokens.len() {
        let key = match tokens.get(key_index) {
            Some(token) if !token.is_empty() && replacements.contains_key(token) => {
                token.to_string()
            }
            _ => continue,
        };

        let value_index = key_index + 1;
        if value_index >= tokens.len() {
            continue;
        }

        let value = replacements.get(&key)?;
        tokens.replace(value_index, value);
        return Some(Substitution {
            key,
            key_index,
            value_index,
        });
    }

    None
}

/// Outcome of rewriting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult<'a> {
    /// The line is emitted exactly as read.
    Unchanged(&'a str),
    /// The line was rebuilt around a substitution.
    Changed {
        line: String,
        substitution: Substitution,
    },
}

impl RewriteResult<'_> {
    pub fn is_changed(&self) -> bool {
        matches!(self, RewriteResult::Changed { .. })
    }

    /// The text to write for this line.
    pub fn text(&self) -> &str {
        match self {
            RewriteResult::Unchanged(line) => *line,
            RewriteResult::Changed { line, .. } => line.as_str(),
        }
    }
}

/// Classify and rewrite a raw line (without terminator).
pub fn rewrite_line<'a>(
    raw: &'a str,
    syntax: &LineSyntax,
    replacements: &ReplacementSet,
) -> RewriteResult<'a> {
    match Line::classify(raw, syntax) {
        Line::Blank | Line::CommentOnly(_) => RewriteResult::Unchanged(raw),
        Line::Data(data) => rewrite_data_line(&data, syntax, replacements),
    }
}

/// Rewrite a data line.
///
/// On a substitution the line is rebuilt from the non-empty tokens up to and
/// including the new value, joined with the separator's primary character.
/// Tokens after the value are dropped. If the line carries a comment, the
/// separator run that ended the config segment and the comment tail follow
/// unchanged. A rebuilt line equal to the original is `Unchanged`.
pub fn rewrite_data_line<'a>(
    data: &DataLine<'a>,
    syntax: &LineSyntax,
    replacements: &ReplacementSet,
) -> RewriteResult<'a> {
    let mut tokens = data.tokens(&syntax.separator);
    let Some(substitution) = substitute(&mut tokens, replacements) else {
        return RewriteResult::Unchanged(data.raw());
    };

    let mut line = tokens.join_through(substitution.value_index, syntax.separator.primary());
    if let Some(comment) = data.comment() {
        line.push_str(data.trailing_separators(&syntax.separator));
        line.push_str(comment);
    }

    if line == data.raw() {
        return RewriteResult::Unchanged(data.raw());
    }

    RewriteResult::Changed { line, substitution }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::DelimiterSet;

    fn set(pairs: &[(&str, &str)]) -> ReplacementSet {
        pairs.iter().copied().collect()
    }

    fn rewrite(raw: &str, pairs: &[(&str, &str)]) -> String {
        rewrite_line(raw, &LineSyntax::sshd(), &set(pairs))
            .text()
            .to_string()
    }

    #[test]
    fn test_replaces_value_and_keeps_comment() {
        assert_eq!(
            rewrite("Port 22 #listen port", &[("Port", "2222")]),
            "Port 2222 #listen port"
        );
    }

    #[test]
    fn test_comment_line_untouched() {
        let result = rewrite_line("# Port 22", &LineSyntax::sshd(), &set(&[("Port", "2222")]));
        assert_eq!(result, RewriteResult::Unchanged("# Port 22"));
    }

    #[test]
    fn test_blank_line_untouched() {
        let result = rewrite_line("", &LineSyntax::sshd(), &set(&[("Port", "2222")]));
        assert_eq!(result, RewriteResult::Unchanged(""));
    }

    #[test]
    fn test_no_match_preserves_spacing() {
        let raw = "  Protocol    2   # keep";
        assert_eq!(rewrite(raw, &[("Port", "2222")]), raw);
    }

    #[test]
    fn test_key_in_last_position_is_skipped() {
        let replacements = set(&[("Port", "2222"), ("ListenAddress", "::")]);
        let result = rewrite_line("ListenAddress 0.0.0.0 Port", &LineSyntax::sshd(), &replacements);
        match result {
            RewriteResult::Changed { line, substitution } => {
                assert_eq!(line, "ListenAddress ::");
                assert_eq!(substitution.key, "ListenAddress");
            }
            other => panic!("expected change, got {other:?}"),
        }

        let result = rewrite_line("value Port", &LineSyntax::sshd(), &replacements);
        assert_eq!(result, RewriteResult::Unchanged("value Port"));
    }

    #[test]
    fn test_only_first_match_is_rewritten() {
        let replacements = set(&[("Port", "2222"), ("Protocol", "2")]);
        assert_eq!(
            rewrite("Protocol 1 Port 22", &[("Port", "2222"), ("Protocol", "2")]),
            "Protocol 2"
        );
        let result = rewrite_line("Port 22 Protocol 1", &LineSyntax::sshd(), &replacements);
        match result {
            RewriteResult::Changed { substitution, .. } => {
                assert_eq!(substitution.key_index, 0);
                assert_eq!(substitution.value_index, 1);
            }
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn test_key_matches_at_any_position() {
        assert_eq!(
            rewrite("Match User bob", &[("User", "alice")]),
            "Match User alice"
        );
    }

    #[test]
    fn test_trailing_tokens_dropped() {
        assert_eq!(
            rewrite("AllowUsers a@h b@h c@h", &[("AllowUsers", "root@localhost")]),
            "AllowUsers root@localhost"
        );
    }

    #[test]
    fn test_multi_token_value_is_idempotent() {
        let pairs = [("AllowUsers", "a@h b@h")];
        let once = rewrite("AllowUsers x", &pairs);
        assert_eq!(once, "AllowUsers a@h b@h");
        let result = rewrite_line(&once, &LineSyntax::sshd(), &set(&pairs));
        assert!(!result.is_changed());
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let result = rewrite_line("Port 2222", &LineSyntax::sshd(), &set(&[("Port", "2222")]));
        assert_eq!(result, RewriteResult::Unchanged("Port 2222"));
    }

    #[test]
    fn test_leading_indent_and_runs_collapse() {
        assert_eq!(
            rewrite("   Port     22", &[("Port", "2222")]),
            "Port 2222"
        );
    }

    #[test]
    fn test_comment_tail_is_byte_identical() {
        assert_eq!(
            rewrite("Port 22   ## old ## value #", &[("Port", "2")]),
            "Port 2   ## old ## value #"
        );
        assert_eq!(rewrite("Port 22#tight", &[("Port", "2")]), "Port 2#tight");
    }

    #[test]
    fn test_separator_set_uses_primary_for_join() {
        let syntax = LineSyntax::new(
            DelimiterSet::new(";").unwrap(),
            DelimiterSet::new("= ").unwrap(),
        );
        let replacements = set(&[("timeout", "30")]);
        let result = rewrite_line("timeout = 10 ; seconds", &syntax, &replacements);
        assert_eq!(result.text(), "timeout=30 ; seconds");
    }

    #[test]
    fn test_whitespace_only_line_is_unchanged() {
        let result = rewrite_line("    ", &LineSyntax::sshd(), &set(&[("Port", "1")]));
        assert_eq!(result, RewriteResult::Unchanged("    "));
    }

    #[test]
    fn test_replacement_set_last_write_wins() {
        let mut replacements = ReplacementSet::new();
        assert_eq!(replacements.insert("Port", "1"), None);
        assert_eq!(replacements.insert("Port", "2"), Some("1".to_string()));
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements.get("Port"), Some("2"));
    }

    #[test]
    fn test_replacement_set_iterates_sorted() {
        let replacements = set(&[("b", "2"), ("a", "1"), ("c", "3")]);
        let keys: Vec<&str> = replacements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
