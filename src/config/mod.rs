//! Configuration module for Web-Code-Bundler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The configuration file is optional: `Config::default()` is a valid setup.
//!
//! # Example
//!
//! ```no_run
//! use web_code_bundler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bundler.toml")).unwrap();
//! println!("Archive will be written to: {}", config.archive.output_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, Compression, Config, FetcherConfig, LocatorConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
