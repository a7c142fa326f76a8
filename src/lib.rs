//! confedit: in-place key/value editing for line-oriented config files
//!
//! Edits `key SEP value COMMENT tail` lines (the `sshd_config` family) while
//! keeping comments, blank lines and line order intact.
//!
//! # Architecture
//!
//! - [`line`] classifies each line as blank, comment-only or data, and splits
//!   data lines into a config segment, a comment tail and tokens.
//! - [`rewrite`] applies at most one `key -> value` substitution per line and
//!   rebuilds the line around it.
//! - [`edit`] streams a whole file through the rewriter into a sibling
//!   `<name>.tmp` file and renames it over the original only on success.
//!
//! # Safety
//!
//! - Every line is validated as UTF-8 before it is processed; the first
//!   invalid line aborts the run and leaves the original untouched
//! - Atomic replacement (temp file + fsync + rename), the original is never
//!   deleted before the new content is in place
//! - Files where nothing matched are not rewritten at all
//!
//! # Example
//!
//! ```no_run
//! use confedit::{FileRewriter, LineSyntax, ReplacementSet};
//!
//! let syntax = LineSyntax::sshd();
//! let mut replacements = ReplacementSet::new();
//! replacements.insert("Port", "2222");
//!
//! match FileRewriter::new("/etc/ssh/sshd_config", &syntax, &replacements).run() {
//!     Ok(outcome) => println!("changed: {}", outcome.changed()),
//!     Err(e) => eprintln!("rewrite failed: {}", e),
//! }
//! ```

pub mod config;
pub mod edit;
pub mod line;
pub mod rewrite;
pub mod safety;

// Re-exports
pub use config::{
    load_from_path, load_from_str, ConfigError, Profile, ProfileError, Settings, SettingsError,
    SettingsInput,
};
pub use edit::{rewrite_stream, FileRewriter, Preview, RewriteError, RewriteOutcome, StreamSummary};
pub use line::{split_compressed, DataLine, DelimiterSet, Line, LineSyntax, TokenSequence};
pub use rewrite::{
    rewrite_data_line, rewrite_line, substitute, ReplacementSet, RewriteResult, Substitution,
};
pub use safety::{Target, TargetError};
