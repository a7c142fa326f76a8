//! Per-line classification and tokenization.
//!
//! A line is blank, a full-line comment, or data. Data lines are split at the
//! first comment delimiter into a config segment and a comment tail, and the
//! config segment is split on the separator set with delimiter runs
//! collapsed.

pub mod classify;
pub mod syntax;
pub mod tokens;

pub use classify::{DataLine, Line};
pub use syntax::{DelimiterSet, LineSyntax};
pub use tokens::{split_compressed, TokenSequence};
