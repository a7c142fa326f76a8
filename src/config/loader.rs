//! Reading `--profile` TOML files.

use crate::config::schema::{Profile, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A profile's text could not be turned into a usable [`Profile`].
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to parse profile TOML: {0}")]
    Parse(#[from] toml_edit::de::Error),

    #[error("invalid profile: {0}")]
    Invalid(#[from] ValidationError),
}

/// A profile file could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read profile {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Profile {
        path: PathBuf,
        #[source]
        source: ProfileError,
    },
}

pub fn load_from_str(input: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = toml_edit::de::from_str(input)?;
    profile.validate()?;
    Ok(profile)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Profile, ConfigError> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|contents| {
            load_from_str(&contents).map_err(|source| ConfigError::Profile {
                path: path.to_path_buf(),
                source,
            })
        })
}
