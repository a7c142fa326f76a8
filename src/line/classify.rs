use crate::line::syntax::{DelimiterSet, LineSyntax};
use crate::line::tokens::{split_compressed, TokenSequence};

/// Classification of one line of a config file (without its terminator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Zero characters.
    Blank,
    /// First non-space character is a comment delimiter. Passed through
    /// verbatim.
    CommentOnly(&'a str),
    /// Anything else.
    Data(DataLine<'a>),
}

impl<'a> Line<'a> {
    /// Classify `raw` under `syntax`.
    ///
    /// Only U+0020 counts as leading whitespace here; a line starting with a
    /// tab is data even if a comment delimiter follows the tab.
    pub fn classify(raw: &'a str, syntax: &LineSyntax) -> Self {
        if raw.is_empty() {
            return Line::Blank;
        }

        match raw.chars().find(|&ch| ch != ' ') {
            Some(ch) if syntax.comment.contains(ch) => Line::CommentOnly(raw),
            _ => Line::Data(DataLine::split(raw, &syntax.comment)),
        }
    }

    /// The data view of this line, if it is a data line.
    pub fn as_data(&self) -> Option<&DataLine<'a>> {
        match self {
            Line::Data(data) => Some(data),
            _ => None,
        }
    }
}

/// A data line split at its first comment delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine<'a> {
    raw: &'a str,
    config: &'a str,
    comment: Option<&'a str>,
}

impl<'a> DataLine<'a> {
    fn split(raw: &'a str, comment: &DelimiterSet) -> Self {
        match raw.find(|ch: char| comment.contains(ch)) {
            Some(at) => Self {
                raw,
                config: &raw[..at],
                comment: Some(&raw[at..]),
            },
            None => Self {
                raw,
                config: raw,
                comment: None,
            },
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Text before the first comment delimiter.
    pub fn config(&self) -> &'a str {
        self.config
    }

    /// Everything from the first comment delimiter to end of line, delimiter
    /// included.
    pub fn comment(&self) -> Option<&'a str> {
        self.comment
    }

    /// The comment text split on the comment delimiters (compressed), i.e.
    /// every segment after the config segment.
    pub fn comment_segments(&self, comment: &DelimiterSet) -> Vec<&'a str> {
        match self.comment {
            Some(tail) => split_compressed(tail, comment).into_iter().skip(1).collect(),
            None => Vec::new(),
        }
    }

    pub fn tokens(&self, separator: &DelimiterSet) -> TokenSequence<'a> {
        TokenSequence::split(self.config, separator)
    }

    /// The run of separator characters ending the config segment.
    pub fn trailing_separators(&self, separator: &DelimiterSet) -> &'a str {
        let trimmed = self.config.trim_end_matches(|ch: char| separator.contains(ch));
        &self.config[trimmed.len()..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(Line::classify("", &LineSyntax::sshd()), Line::Blank);
    }

    #[test]
    fn test_comment_only_with_leading_spaces() {
        let syntax = LineSyntax::sshd();
        assert_eq!(
            Line::classify("   # Port 22", &syntax),
            Line::CommentOnly("   # Port 22")
        );
        assert_eq!(Line::classify("#", &syntax), Line::CommentOnly("#"));
    }

    #[test]
    fn test_tab_indent_is_not_skipped() {
        let line = Line::classify("\t# Port 22", &LineSyntax::sshd());
        let data = line.as_data().expect("data line");
        assert_eq!(data.config(), "\t");
        assert_eq!(data.comment(), Some("# Port 22"));
    }

    #[test]
    fn test_comment_set_membership() {
        let syntax = LineSyntax::new(
            DelimiterSet::new("#;").unwrap(),
            DelimiterSet::new("=").unwrap(),
        );
        assert!(matches!(
            Line::classify("; legacy", &syntax),
            Line::CommentOnly(_)
        ));
        let line = Line::classify("key=value ; note # more", &syntax);
        let data = line.as_data().unwrap();
        assert_eq!(data.config(), "key=value ");
        assert_eq!(data.comment(), Some("; note # more"));
        assert_eq!(
            data.comment_segments(&syntax.comment),
            vec![" note ", " more"]
        );
    }

    #[test]
    fn test_data_line_tokens() {
        let syntax = LineSyntax::sshd();
        let line = Line::classify("Port 22 #listen port", &syntax);
        let data = line.as_data().unwrap();
        let tokens = data.tokens(&syntax.separator);
        assert_eq!(tokens.iter().collect::<Vec<_>>(), vec!["Port", "22", ""]);
        assert_eq!(data.trailing_separators(&syntax.separator), " ");
        assert_eq!(data.comment_segments(&syntax.comment), vec!["listen port"]);
    }

    #[test]
    fn test_whitespace_only_line_is_data() {
        let syntax = LineSyntax::sshd();
        let line = Line::classify("    ", &syntax);
        let data = line.as_data().unwrap();
        assert_eq!(data.comment(), None);
        assert_eq!(data.tokens(&syntax.separator).iter().collect::<Vec<_>>(), vec!["", ""]);
    }
}
