// src/mime/mod.rs

//! MIME typing and chain resolution.
//!
//! The executor never looks inside this module directly; it only consumes
//! the two narrow traits below. [`MimeDatabase`] is the implementation built
//! from the `[[type]]` and `[[filter]]` sections of the config file.

use std::path::Path;

use crate::errors::Result;
use crate::types::FilterChain;

pub mod database;
pub mod types;

pub use database::{MimeDatabase, TypeRule};
pub use types::MimeType;

/// Result of sniffing an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedType {
    pub mime: MimeType,
    /// True when the file is gzip-compressed; `mime` then describes the
    /// decompressed content.
    pub compressed: bool,
}

/// Work out what kind of file we were handed.
pub trait TypeDetector {
    fn detect_type(&self, path: &Path) -> Result<DetectedType>;
}

/// Pick the filters that convert one type into another.
pub trait ChainResolver {
    /// Whether `mime` is a type this resolver knows about at all.
    fn has_type(&self, mime: &MimeType) -> bool;

    /// Cheapest chain from `source` to `dest`, or `FilterError::NoFilter`.
    fn resolve_chain(&self, source: &MimeType, dest: &MimeType) -> Result<FilterChain>;
}
