use crate::url::ReferenceScope;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Web-Code-Bundler
///
/// Every section is optional; a missing file or section falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub locator: LocatorConfig,
    pub archive: ArchiveConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Stall limit (seconds): the whole request for text bodies, the gap
    /// between body chunks for binary ones
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("web-code-bundler/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Asset discovery configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Which references count as in-scope for fetching
    pub scope: ReferenceScope,
}

/// Zip compression method for archive members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

/// Archive output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Where the finished archive is written
    #[serde(rename = "output-path")]
    pub output_path: String,

    pub compression: Compression,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_path: "web_code.zip".to_string(),
            compression: Compression::Deflated,
        }
    }
}
