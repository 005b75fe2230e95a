// src/config/server.rs

//! Immutable server paths handed to every filter.

use std::path::{Path, PathBuf};

use crate::config::model::PathsSection;

pub const DEFAULT_DATA_DIR: &str = "/usr/share/cups";
pub const DEFAULT_FONT_PATH: &str = "/usr/share/cups/fonts";
pub const DEFAULT_SERVER_BIN: &str = "/usr/lib/cups";
pub const DEFAULT_RIP_CACHE: &str = "8m";
pub const DEFAULT_PPD: &str = "model/laserjet.ppd";

/// Read a variable from the real process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolved paths. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub font_path: String,
    pub server_bin: PathBuf,
    pub server_root: PathBuf,
    pub filter_dir: PathBuf,
    pub search_path: String,
    pub rip_cache: String,
    pub default_ppd: PathBuf,
}

impl ServerConfig {
    /// Combine the `[paths]` section with the environment.
    ///
    /// Precedence for `data_dir`, `font_path` and `server_bin`:
    /// environment, then file, then built-in default.
    pub fn resolve(
        paths: &PathsSection,
        config_path: &Path,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |env: &str, file: &Option<String>, default: &str| {
            lookup(env)
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let data_dir = PathBuf::from(pick("CUPS_DATADIR", &paths.data_dir, DEFAULT_DATA_DIR));
        let font_path = pick("CUPS_FONTPATH", &paths.font_path, DEFAULT_FONT_PATH);
        let server_bin =
            PathBuf::from(pick("CUPS_SERVERBIN", &paths.server_bin, DEFAULT_SERVER_BIN));

        let server_root = paths
            .server_root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config_root_dir(config_path));

        let filter_dir = paths
            .filter_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| server_bin.join("filter"));

        let search_path = paths.search_path.clone().unwrap_or_else(|| {
            format!("{}:/usr/bin:/usr/sbin:/bin", filter_dir.display())
        });

        Self {
            data_dir,
            font_path,
            server_bin,
            server_root,
            filter_dir,
            search_path,
            rip_cache: paths
                .rip_cache
                .clone()
                .unwrap_or_else(|| DEFAULT_RIP_CACHE.to_string()),
            default_ppd: PathBuf::from(
                paths.default_ppd.as_deref().unwrap_or(DEFAULT_PPD),
            ),
        }
    }

    /// PPD path used when neither an override nor `$PPD` is present.
    pub fn default_ppd_path(&self) -> PathBuf {
        self.data_dir.join(&self.default_ppd)
    }

    /// Absolute programs are used verbatim; anything else lives in the
    /// filter directory.
    pub fn program_path(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.filter_dir.join(path)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::resolve(&PathsSection::default(), Path::new(""), &|_| None)
    }
}

/// Figure out the server root from the config path.
///
/// - If the config path has a non-empty parent (e.g. "conf/filterchain.toml"),
///   we use that directory.
/// - If it's just a bare filename (parent = ""), we fall back to the current
///   working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
