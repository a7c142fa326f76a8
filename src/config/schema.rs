use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A reusable set of edits for one config format.
///
/// ```toml
/// [syntax]
/// comment = "#"
/// separator = " "
///
/// [set]
/// Port = "2222"
/// ```
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub syntax: SyntaxSection,
    #[serde(default)]
    pub set: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyntaxSection {
    pub comment: Option<String>,
    pub separator: Option<String>,
}

impl Profile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.syntax.comment.as_deref() == Some("") {
            issues.push(ValidationIssue::EmptyDelimiter { field: "syntax.comment" });
        }
        if self.syntax.separator.as_deref() == Some("") {
            issues.push(ValidationIssue::EmptyDelimiter {
                field: "syntax.separator",
            });
        }

        let comment = self.syntax.comment.as_deref().unwrap_or("");
        for (key, value) in &self.set {
            if key.is_empty() {
                issues.push(ValidationIssue::EmptyKey {
                    value: value.clone(),
                });
            }
            if value.chars().any(|ch| comment.contains(ch)) {
                issues.push(ValidationIssue::ValueContainsComment {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyDelimiter { field: &'static str },
    EmptyKey { value: String },
    ValueContainsComment { key: String, value: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyDelimiter { field } => {
                write!(f, "'{field}' must contain at least one character")
            }
            ValidationIssue::EmptyKey { value } => {
                write!(f, "empty key in [set] (value '{value}')")
            }
            ValidationIssue::ValueContainsComment { key, value } => {
                write!(f, "value '{value}' for '{key}' contains a comment character")
            }
        }
    }
}
