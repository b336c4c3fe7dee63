//! URL handling module for Web-Code-Bundler
//!
//! This module provides input normalization, reference scoping and
//! resolution, and archive naming for fetched resources.

mod normalize;
mod reference;

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// Re-export main functions
pub use normalize::normalize_input;
pub use reference::{leaf_name, resolve_reference};

/// Which document references are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceScope {
    /// Skip any reference that carries its own scheme; everything else is
    /// resolved against the base URL. Protocol-relative references pass.
    #[default]
    Prefix,
    /// Resolve every reference and keep only those on the base URL's origin
    SameOrigin,
}

impl ReferenceScope {
    /// Returns the configuration string for this scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::SameOrigin => "same-origin",
        }
    }
}

impl fmt::Display for ReferenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Self::Prefix),
            "same-origin" => Ok(Self::SameOrigin),
            other => Err(format!(
                "unknown scope '{}', expected 'prefix' or 'same-origin'",
                other
            )),
        }
    }
}
