// src/config/model.rs

use serde::Deserialize;

use crate::mime::MimeType;
use crate::types::FilterSpec;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// data_dir = "/usr/share/cups"
/// server_bin = "/usr/lib/cups"
///
/// [filters]
/// decompress = "gziptoany"
///
/// [[type]]
/// name = "application/pdf"
/// extensions = ["*.pdf"]
/// magic = ["%PDF"]
///
/// [[filter]]
/// source = "application/pdf"
/// dest = "application/postscript"
/// cost = 66
/// program = "pdftops"
/// ```
///
/// All sections are optional and have reasonable defaults, but a config
/// without any `[[type]]` cannot detect anything.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub filters: FiltersSection,

    /// `[[type]]` entries, tried in file order during detection.
    #[serde(default, rename = "type")]
    pub types: Vec<TypeConfig>,

    /// `[[filter]]` entries, the edges of the conversion graph.
    #[serde(default, rename = "filter")]
    pub filter: Vec<FilterConfig>,
}

/// Validated configuration; only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub decompress_filter: FilterSpec,
    pub types: Vec<TypeConfig>,
    pub filters: Vec<FilterSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        paths: PathsSection,
        decompress_filter: FilterSpec,
        types: Vec<TypeConfig>,
        filters: Vec<FilterSpec>,
    ) -> Self {
        Self {
            paths,
            decompress_filter,
            types,
            filters,
        }
    }

    /// Parsed MIME types in declaration order.
    pub fn mime_types(&self) -> impl Iterator<Item = MimeType> + '_ {
        self.types.iter().filter_map(|t| t.name.parse().ok())
    }
}

/// `[paths]` section.
///
/// Every entry is optional. `CUPS_DATADIR`, `CUPS_FONTPATH` and
/// `CUPS_SERVERBIN` in the environment take precedence over the file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PathsSection {
    #[serde(default)]
    pub data_dir: Option<String>,

    #[serde(default)]
    pub font_path: Option<String>,

    #[serde(default)]
    pub server_bin: Option<String>,

    /// Defaults to the directory holding the config file.
    #[serde(default)]
    pub server_root: Option<String>,

    /// Where relative filter programs live. Defaults to `<server_bin>/filter`.
    #[serde(default)]
    pub filter_dir: Option<String>,

    /// `PATH` handed to filters.
    #[serde(default)]
    pub search_path: Option<String>,

    #[serde(default)]
    pub rip_cache: Option<String>,

    /// PPD used when neither `-p` nor `$PPD` is given, relative to `data_dir`.
    #[serde(default)]
    pub default_ppd: Option<String>,
}

/// `[filters]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersSection {
    /// Program run first when the input is compressed.
    #[serde(default = "default_decompress")]
    pub decompress: String,
}

fn default_decompress() -> String {
    "gziptoany".to_string()
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            decompress: default_decompress(),
        }
    }
}

/// `[[type]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeConfig {
    /// `super/type`.
    pub name: String,

    /// File-name globs, e.g. `"*.pdf"`. Matched case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Byte prefixes, e.g. `"%PDF"`.
    #[serde(default)]
    pub magic: Vec<String>,
}

/// `[[filter]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub source: String,
    pub dest: String,
    #[serde(default)]
    pub cost: u32,
    pub program: String,
}
