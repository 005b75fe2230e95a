// src/config/mod.rs

//! Configuration loading and validation for filterchain.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate types, filters and globs (`validate.rs`).
//! - Resolve the immutable server paths handed to filters (`server.rs`).

pub mod loader;
pub mod model;
pub mod server;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, FilterConfig, FiltersSection, PathsSection, RawConfigFile, TypeConfig,
};
pub use server::{ServerConfig, process_env};
pub use validate::validate_config;
