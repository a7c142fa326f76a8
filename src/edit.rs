use crate::line::{Line, LineSyntax};
use crate::rewrite::{rewrite_data_line, ReplacementSet, RewriteResult};
use crate::safety::{Target, TargetError};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("Invalid UTF-8 encoding detected at line {line}")]
    InvalidEncoding {
        line: usize,
        /// The part of the line before the first invalid byte
        valid_prefix: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Temporary file already exists: {0}")]
    TempFileExists(PathBuf),

    #[error("Failed to replace {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What a pass over the input produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Lines read (and written)
    pub lines: usize,
    /// 1-based numbers of the lines that were rewritten
    pub changed_lines: Vec<usize>,
}

impl StreamSummary {
    /// Whether any line changed.
    pub fn changed(&self) -> bool {
        !self.changed_lines.is_empty()
    }
}

/// Split a raw line into content and terminator. `\r\n` is kept as `\r\n`;
/// a missing terminator on the last line becomes `\n`.
fn split_terminator(buf: &[u8]) -> (&[u8], &'static str) {
    if let Some(content) = buf.strip_suffix(b"\r\n") {
        (content, "\r\n")
    } else if let Some(content) = buf.strip_suffix(b"\n") {
        (content, "\n")
    } else {
        (buf, "\n")
    }
}

/// Rewrite every line of `reader` into `writer`.
///
/// Exactly one line is written per line read. Each line is checked for valid
/// UTF-8 before anything else; the first invalid line stops the pass with
/// [`RewriteError::InvalidEncoding`] and nothing after it is written.
pub fn rewrite_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    syntax: &LineSyntax,
    replacements: &ReplacementSet,
) -> Result<StreamSummary, RewriteError> {
    let mut summary = StreamSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        summary.lines += 1;
        let number = summary.lines;

        let (content, terminator) = split_terminator(&buf);
        let raw = std::str::from_utf8(content).map_err(|source| {
            let valid = &content[..source.valid_up_to()];
            RewriteError::InvalidEncoding {
                line: number,
                valid_prefix: String::from_utf8_lossy(valid).into_owned(),
                source,
            }
        })?;

        let result = match Line::classify(raw, syntax) {
            Line::Blank => RewriteResult::Unchanged(raw),
            Line::CommentOnly(_) => {
                debug!(line = number, "commented line, ignoring");
                RewriteResult::Unchanged(raw)
            }
            Line::Data(data) => rewrite_data_line(&data, syntax, replacements),
        };

        if let RewriteResult::Changed { line, substitution } = &result {
            debug!(
                line = number,
                key = %substitution.key,
                before = raw,
                after = %line,
                "value replaced"
            );
            summary.changed_lines.push(number);
        }

        writer.write_all(result.text().as_bytes())?;
        writer.write_all(terminator.as_bytes())?;
    }

    writer.flush()?;
    Ok(summary)
}

/// Result of a file rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteOutcome reports whether the file changed"]
pub enum RewriteOutcome {
    /// The rewritten file replaced the original
    Committed { file: PathBuf, summary: StreamSummary },
    /// Nothing matched; the original was left untouched
    Unchanged { file: PathBuf, summary: StreamSummary },
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, RewriteOutcome::Committed { .. })
    }

    pub fn file(&self) -> &Path {
        match self {
            RewriteOutcome::Committed { file, .. } | RewriteOutcome::Unchanged { file, .. } => file,
        }
    }

    pub fn summary(&self) -> &StreamSummary {
        match self {
            RewriteOutcome::Committed { summary, .. }
            | RewriteOutcome::Unchanged { summary, .. } => summary,
        }
    }
}

/// Rewritten content computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file: PathBuf,
    pub original: String,
    pub rewritten: String,
    pub summary: StreamSummary,
}

/// Rewrites one config file in place.
#[derive(Debug, Clone)]
pub struct FileRewriter<'a> {
    path: PathBuf,
    syntax: &'a LineSyntax,
    replacements: &'a ReplacementSet,
}

impl<'a> FileRewriter<'a> {
    pub fn new(
        path: impl Into<PathBuf>,
        syntax: &'a LineSyntax,
        replacements: &'a ReplacementSet,
    ) -> Self {
        Self {
            path: path.into(),
            syntax,
            replacements,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the file through a sibling `<name>.tmp` file.
    ///
    /// The temp file is renamed over the original only when every line was
    /// processed and at least one changed. On any error, or when nothing
    /// changed, the temp file is removed and the original is left as it was.
    pub fn run(&self) -> Result<RewriteOutcome, RewriteError> {
        let target = Target::resolve(&self.path)?;
        let source = File::open(target.canonical()).map_err(|source| TargetError::Inaccessible {
            path: self.path.clone(),
            source,
        })?;
        let permissions = source.metadata()?.permissions();

        let temp_name = target.temp_file_name();
        let temp = tempfile::Builder::new()
            .prefix(&temp_name)
            .rand_bytes(0)
            .tempfile_in(target.directory())
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => RewriteError::TempFileExists(target.temp_path()),
                _ => RewriteError::Io(err),
            })?;
        debug!(temp = %temp.path().display(), "streaming into temp file");

        let streamed = rewrite_stream(
            BufReader::new(source),
            BufWriter::new(temp.as_file()),
            self.syntax,
            self.replacements,
        );
        let summary = match streamed {
            Ok(summary) => summary,
            Err(err) => {
                // Dropping `temp` deletes it
                warn!(file = %self.path.display(), error = %err, "aborting, original left untouched");
                return Err(err);
            }
        };

        if !summary.changed() {
            temp.close()?;
            info!(file = %self.path.display(), lines = summary.lines, "no changes");
            return Ok(RewriteOutcome::Unchanged {
                file: self.path.clone(),
                summary,
            });
        }

        // Flush to disk (fsync) and carry over the original mode
        temp.as_file().sync_all()?;
        fs::set_permissions(temp.path(), permissions)?;

        // Atomic rename over the original; it is never deleted first
        temp.persist(target.canonical())
            .map_err(|err| RewriteError::Publish {
                path: self.path.clone(),
                source: err.error,
            })?;

        #[cfg(unix)]
        {
            if let Err(err) = File::open(target.directory()).and_then(|dir| dir.sync_all()) {
                warn!(
                    dir = %target.directory().display(),
                    error = %err,
                    "could not fsync directory after rename"
                );
            }
        }

        info!(
            file = %self.path.display(),
            lines = summary.lines,
            changed = summary.changed_lines.len(),
            "rewrite committed"
        );
        Ok(RewriteOutcome::Committed {
            file: self.path.clone(),
            summary,
        })
    }

    /// Compute the rewrite in memory (dry run).
    pub fn preview(&self) -> Result<Preview, RewriteError> {
        let target = Target::resolve(&self.path)?;
        let original = fs::read(target.canonical()).map_err(|source| TargetError::Inaccessible {
            path: self.path.clone(),
            source,
        })?;

        let mut rewritten = Vec::with_capacity(original.len());
        let summary = rewrite_stream(
            original.as_slice(),
            &mut rewritten,
            self.syntax,
            self.replacements,
        )?;

        Ok(Preview {
            file: self.path.clone(),
            original: String::from_utf8_lossy(&original).into_owned(),
            rewritten: String::from_utf8_lossy(&rewritten).into_owned(),
            summary,
        })
    }
}
