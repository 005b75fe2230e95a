// src/mime/database.rs

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{FilterError, Result};
use crate::mime::{ChainResolver, DetectedType, MimeType, TypeDetector};
use crate::types::{FilterChain, FilterSpec};

/// How much of the file head is inspected for magic prefixes.
const SNIFF_LEN: u64 = 4096;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compiled `[[type]]` entry.
#[derive(Debug, Clone)]
pub struct TypeRule {
    pub mime: MimeType,
    globs: GlobSet,
    magic: Vec<Vec<u8>>,
}

impl TypeRule {
    pub fn new(mime: MimeType, extensions: &[String], magic: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in extensions {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| FilterError::ConfigError(format!("bad glob '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|e| FilterError::ConfigError(format!("building globs for {mime}: {e}")))?;

        Ok(Self {
            mime,
            globs,
            magic: magic.iter().map(|m| m.as_bytes().to_vec()).collect(),
        })
    }

    fn matches(&self, file_name: &str, head: &[u8]) -> bool {
        self.magic.iter().any(|m| head.starts_with(m)) || self.globs.is_match(file_name)
    }
}

/// Type rules plus the filter graph, built from a validated config.
#[derive(Debug)]
pub struct MimeDatabase {
    rules: Vec<TypeRule>,
    filters: Vec<FilterSpec>,
    graph: DiGraph<MimeType, usize>,
    nodes: HashMap<MimeType, NodeIndex>,
}

impl MimeDatabase {
    pub fn new(rules: Vec<TypeRule>, filters: Vec<FilterSpec>) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for rule in rules.iter() {
            nodes
                .entry(rule.mime.clone())
                .or_insert_with(|| graph.add_node(rule.mime.clone()));
        }

        for (idx, filter) in filters.iter().enumerate() {
            let (Some(src), Some(dst)) = (&filter.source, &filter.dest) else {
                continue;
            };
            let a = *nodes
                .entry(src.clone())
                .or_insert_with(|| graph.add_node(src.clone()));
            let b = *nodes
                .entry(dst.clone())
                .or_insert_with(|| graph.add_node(dst.clone()));
            graph.add_edge(a, b, idx);
        }

        Self {
            rules,
            filters,
            graph,
            nodes,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut rules = Vec::with_capacity(cfg.types.len());
        for ty in cfg.types.iter() {
            let mime: MimeType = ty.name.parse()?;
            rules.push(TypeRule::new(mime, &ty.extensions, &ty.magic)?);
        }
        Ok(Self::new(rules, cfg.filters.clone()))
    }

    pub fn type_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}

impl TypeDetector for MimeDatabase {
    fn detect_type(&self, path: &Path) -> Result<DetectedType> {
        let (head, compressed) = read_head(path)?;

        let mut file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if compressed {
            if let Some(stripped) = file_name.strip_suffix(".gz") {
                file_name = stripped.to_string();
            }
        }

        let mime = self
            .rules
            .iter()
            .find(|rule| rule.matches(&file_name, &head))
            .map(|rule| rule.mime.clone())
            .ok_or_else(|| FilterError::UnknownSourceType(path.display().to_string()))?;

        debug!(file = %path.display(), %mime, compressed, "detected input type");

        Ok(DetectedType { mime, compressed })
    }
}

impl ChainResolver for MimeDatabase {
    fn has_type(&self, mime: &MimeType) -> bool {
        self.nodes.contains_key(mime)
    }

    fn resolve_chain(&self, source: &MimeType, dest: &MimeType) -> Result<FilterChain> {
        let no_filter = || FilterError::NoFilter {
            source_type: source.to_string(),
            dest_type: dest.to_string(),
        };

        let (Some(&start), Some(&goal)) = (self.nodes.get(source), self.nodes.get(dest)) else {
            return Err(no_filter());
        };

        let (cost, path) = astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| self.filters[*e.weight()].cost,
            |_| 0,
        )
        .ok_or_else(no_filter)?;

        let mut stages = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let cheapest = self
                .graph
                .edges_connecting(pair[0], pair[1])
                .map(|e| &self.filters[*e.weight()])
                .min_by_key(|f| f.cost)
                .ok_or_else(no_filter)?;
            stages.push(cheapest.clone());
        }

        debug!(%source, %dest, cost, stages = stages.len(), "resolved filter chain");

        Ok(FilterChain::new(stages))
    }
}

/// Read the start of `path`. For gzip input the decompressed head is
/// returned and the second value is `true`.
fn read_head(path: &Path) -> Result<(Vec<u8>, bool)> {
    let mut head = Vec::new();
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

    if !head.starts_with(&GZIP_MAGIC) {
        return Ok((head, false));
    }

    let mut inner = Vec::new();
    let decoder = GzDecoder::new(File::open(path)?);
    // A truncated stream still leaves whatever was decoded in `inner`.
    if let Err(e) = decoder.take(SNIFF_LEN).read_to_end(&mut inner) {
        debug!(file = %path.display(), error = %e, "partial gzip read while sniffing");
    }

    Ok((inner, true))
}
