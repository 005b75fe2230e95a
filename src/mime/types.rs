// src/mime/types.rs

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::FilterError;

/// `super` is capped at 15 characters and `type` at 255.
static MIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/\s]{1,15})/(\S{1,255})$").expect("static MIME regex is valid")
});

/// A `super/type` MIME type, normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MimeType {
    super_type: String,
    subtype: String,
}

impl MimeType {
    pub fn new(super_type: &str, subtype: &str) -> Self {
        Self {
            super_type: super_type.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        }
    }

    pub fn super_type(&self) -> &str {
        &self.super_type
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }
}

impl FromStr for MimeType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MIME_RE
            .captures(s.trim())
            .ok_or_else(|| FilterError::InvalidMimeType(s.to_string()))?;
        Ok(MimeType::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.super_type, self.subtype)
    }
}
