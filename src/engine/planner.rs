// src/engine/planner.rs

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{FilterError, Result};
use crate::mime::{ChainResolver, DetectedType, MimeType, TypeDetector};
use crate::types::{FilterChain, FilterSpec};

/// What will be run for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source: DetectedType,
    pub dest: MimeType,
    pub chain: FilterChain,
}

/// Detect `input`, then pick the chain that converts it to `dest`.
///
/// - Same source and destination type: nothing to convert, so the chain is
///   just `decompress` for gzip input and empty otherwise.
/// - Otherwise the resolver's cheapest chain, with `decompress` in front
///   when the input is compressed.
pub fn plan_chain(
    detector: &dyn TypeDetector,
    resolver: &dyn ChainResolver,
    input: &Path,
    dest: &MimeType,
    decompress: &FilterSpec,
) -> Result<Plan> {
    let source = detector.detect_type(input)?;

    if !resolver.has_type(dest) {
        return Err(FilterError::UnknownDestType(dest.to_string()));
    }

    let chain = if source.mime == *dest {
        debug!(mime = %dest, compressed = source.compressed, "source already has destination type");
        if source.compressed {
            FilterChain::new(vec![decompress.clone()])
        } else {
            FilterChain::empty()
        }
    } else {
        let resolved = resolver.resolve_chain(&source.mime, dest)?;
        if source.compressed {
            resolved.with_first(decompress.clone())
        } else {
            resolved
        }
    };

    info!(
        source = %source.mime,
        dest = %dest,
        compressed = source.compressed,
        filters = ?chain.programs(),
        cost = chain.total_cost(),
        "planned filter chain"
    );

    Ok(Plan {
        source,
        dest: dest.clone(),
        chain,
    })
}
