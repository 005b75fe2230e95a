// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! These are *setup* errors: anything that goes wrong before the first
//! filter is spawned. Failures while launching or running filters are
//! reported through [`crate::exec::SpawnError`] and the run report instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid MIME type: {0}")]
    InvalidMimeType(String),

    #[error("Unable to determine MIME type of \"{0}\"")]
    UnknownSourceType(String),

    #[error("Unknown destination MIME type {0}")]
    UnknownDestType(String),

    #[error("No filter to convert from {source_type} to {dest_type}")]
    NoFilter {
        source_type: String,
        dest_type: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
