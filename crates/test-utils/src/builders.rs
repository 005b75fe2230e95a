#![allow(dead_code)]

use std::path::{Path, PathBuf};

use filterchain::config::{
    ConfigFile, FilterConfig, FiltersSection, PathsSection, RawConfigFile, ServerConfig,
    TypeConfig,
};
use filterchain::types::{FilterChain, FilterSpec};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                paths: PathsSection::default(),
                filters: FiltersSection::default(),
                types: Vec::new(),
                filter: Vec::new(),
            },
        }
    }

    /// Declare a type with file-name globs and magic prefixes.
    pub fn with_type(mut self, name: &str, extensions: &[&str], magic: &[&str]) -> Self {
        self.config.types.push(TypeConfig {
            name: name.to_string(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            magic: magic.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn with_filter(mut self, source: &str, dest: &str, cost: u32, program: &str) -> Self {
        self.config.filter.push(FilterConfig {
            source: source.to_string(),
            dest: dest.to_string(),
            cost,
            program: program.to_string(),
        });
        self
    }

    pub fn with_decompress(mut self, program: &str) -> Self {
        self.config.filters.decompress = program.to_string();
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.config.paths.data_dir = Some(dir.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A small print-shop style database: text → postscript → raster, plus a
/// pricey direct text → raster filter and a pdf route.
pub fn sample_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_type("text/plain", &["*.txt"], &[])
        .with_type("application/pdf", &["*.pdf"], &["%PDF"])
        .with_type("application/postscript", &["*.ps"], &["%!"])
        .with_type("application/vnd.cups-raster", &[], &["RaS2"])
        .with_filter("text/plain", "application/postscript", 33, "texttops")
        .with_filter("application/pdf", "application/postscript", 66, "pdftops")
        .with_filter("application/postscript", "application/vnd.cups-raster", 100, "pstoraster")
        .with_filter("text/plain", "application/vnd.cups-raster", 200, "texttoraster")
        .build()
}

/// Builder for `FilterChain`.
pub struct ChainBuilder {
    stages: Vec<FilterSpec>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stage(mut self, program: &str) -> Self {
        self.stages.push(FilterSpec::new(program));
        self
    }

    pub fn stage_path(self, program: &Path) -> Self {
        self.stage(&program.display().to_string())
    }

    pub fn build(self) -> FilterChain {
        FilterChain::new(self.stages)
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed server paths with relative filters looked up in `filter_dir`.
pub fn server_config(filter_dir: &Path) -> ServerConfig {
    ServerConfig {
        data_dir: PathBuf::from("/srv/data"),
        font_path: "/srv/data/fonts".to_string(),
        server_bin: PathBuf::from("/srv/bin"),
        server_root: PathBuf::from("/srv/etc"),
        filter_dir: filter_dir.to_path_buf(),
        search_path: "/usr/bin:/bin".to_string(),
        rip_cache: "8m".to_string(),
        default_ppd: PathBuf::from("model/laserjet.ppd"),
    }
}

/// Environment lookup backed by a fixed list.
pub fn fixed_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}
