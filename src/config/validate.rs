// src/config/validate.rs

use std::collections::HashSet;

use globset::GlobBuilder;

use crate::config::model::{ConfigFile, FilterConfig, RawConfigFile};
use crate::errors::{FilterError, Result};
use crate::mime::MimeType;
use crate::types::FilterSpec;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FilterError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let known = validate_types(&raw)?;
        let filters = validate_filters(&raw.filter, &known)?;
        let decompress = validate_decompress(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.paths, decompress, raw.types, filters))
    }
}

/// Run validation on a raw config without consuming it.
pub fn validate_config(raw: &RawConfigFile) -> Result<()> {
    ConfigFile::try_from(raw.clone()).map(|_| ())
}

fn validate_types(cfg: &RawConfigFile) -> Result<HashSet<MimeType>> {
    let mut known = HashSet::new();

    for ty in cfg.types.iter() {
        let mime: MimeType = ty.name.parse().map_err(|_| {
            FilterError::ConfigError(format!("[[type]] has invalid name '{}'", ty.name))
        })?;

        if !known.insert(mime.clone()) {
            return Err(FilterError::ConfigError(format!(
                "[[type]] '{}' is declared more than once",
                mime
            )));
        }

        for pattern in ty.extensions.iter() {
            GlobBuilder::new(pattern).build().map_err(|e| {
                FilterError::ConfigError(format!(
                    "[[type]] '{}' has invalid extension glob '{}': {}",
                    mime, pattern, e
                ))
            })?;
        }

        if ty.magic.iter().any(|m| m.is_empty()) {
            return Err(FilterError::ConfigError(format!(
                "[[type]] '{}' has an empty magic prefix",
                mime
            )));
        }
    }

    Ok(known)
}

fn validate_filters(
    filters: &[FilterConfig],
    known: &HashSet<MimeType>,
) -> Result<Vec<FilterSpec>> {
    let mut specs = Vec::with_capacity(filters.len());

    for f in filters.iter() {
        if f.program.trim().is_empty() {
            return Err(FilterError::ConfigError(format!(
                "[[filter]] {} -> {} has an empty program",
                f.source, f.dest
            )));
        }

        let source = known_type(&f.source, known, &f.program)?;
        let dest = known_type(&f.dest, known, &f.program)?;

        specs.push(
            FilterSpec::new(f.program.trim())
                .with_cost(f.cost)
                .with_types(source, dest),
        );
    }

    Ok(specs)
}

fn known_type(name: &str, known: &HashSet<MimeType>, program: &str) -> Result<MimeType> {
    let mime: MimeType = name.parse().map_err(|_| {
        FilterError::ConfigError(format!(
            "[[filter]] '{}' has invalid type '{}'",
            program, name
        ))
    })?;

    if !known.contains(&mime) {
        return Err(FilterError::ConfigError(format!(
            "[[filter]] '{}' references undeclared type '{}'",
            program, mime
        )));
    }

    Ok(mime)
}

fn validate_decompress(cfg: &RawConfigFile) -> Result<FilterSpec> {
    let program = cfg.filters.decompress.trim();
    if program.is_empty() {
        return Err(FilterError::ConfigError(
            "[filters].decompress must name a program".to_string(),
        ));
    }
    Ok(FilterSpec::new(program))
}
