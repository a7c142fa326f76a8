use crate::config::schema::Profile;
use crate::line::{DelimiterSet, LineSyntax};
use crate::rewrite::ReplacementSet;
use std::path::PathBuf;
use thiserror::Error;

/// Raw values collected from the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsInput {
    pub path: Option<PathBuf>,
    pub comment: Option<String>,
    pub separator: Option<String>,
    /// `-a KEY VALUE` pairs in command-line order
    pub assignments: Vec<(String, String)>,
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path: PathBuf,
    pub syntax: LineSyntax,
    pub replacements: ReplacementSet,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("No path \"-p\" parameter specified")]
    MissingPath,

    #[error(
        "No comment character \"-c\" parameter specified, \
         this parameter might need to be wrapped in quote characters"
    )]
    MissingComment,

    #[error(
        "No separator character \"-s\" parameter specified, \
         this parameter might need to be wrapped in quote characters"
    )]
    MissingSeparator,

    #[error("Empty key in \"-a\" pair (value '{0}')")]
    EmptyKey(String),

    #[error("Value '{value}' for key '{key}' contains a comment character")]
    ValueContainsComment { key: String, value: String },
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl Settings {
    /// Merge command-line values over an optional profile.
    ///
    /// `-c`/`-s` take precedence over the profile's `[syntax]`. The profile's
    /// `[set]` is applied first and `-a` pairs after it, so a repeated key
    /// keeps its last value.
    pub fn resolve(input: SettingsInput, profile: Option<&Profile>) -> Result<Self, SettingsError> {
        let path = input.path.ok_or(SettingsError::MissingPath)?;

        let comment = non_empty(input.comment.as_deref())
            .or_else(|| non_empty(profile.and_then(|p| p.syntax.comment.as_deref())))
            .and_then(DelimiterSet::new)
            .ok_or(SettingsError::MissingComment)?;

        let separator = non_empty(input.separator.as_deref())
            .or_else(|| non_empty(profile.and_then(|p| p.syntax.separator.as_deref())))
            .and_then(DelimiterSet::new)
            .ok_or(SettingsError::MissingSeparator)?;

        let mut replacements = ReplacementSet::new();
        if let Some(profile) = profile {
            replacements.extend(profile.set.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        for (key, value) in input.assignments {
            if key.is_empty() {
                return Err(SettingsError::EmptyKey(value));
            }
            replacements.insert(key, value);
        }

        // A value holding a comment character would be read back as the
        // start of a comment on the next run.
        if let Some((key, value)) = replacements
            .iter()
            .find(|(_, value)| value.chars().any(|ch| comment.contains(ch)))
        {
            return Err(SettingsError::ValueContainsComment {
                key: key.clone(),
                value: value.clone(),
            });
        }

        Ok(Self {
            path,
            syntax: LineSyntax::new(comment, separator),
            replacements,
        })
    }
}
