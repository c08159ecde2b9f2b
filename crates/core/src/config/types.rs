use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheSettings;
use crate::render::RenderOptions;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    /// Folders to exclude from scans (relative to vault_root).
    /// These folders and their contents never appear in query results.
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

/// Cache lifetimes and bounds, in seconds and entry counts.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_structure_ttl")]
    pub structure_ttl_secs: u64,
    #[serde(default = "default_content_ttl")]
    pub content_ttl_secs: u64,
    #[serde(default = "default_content_capacity")]
    pub content_capacity: usize,
    #[serde(default = "default_context_ttl")]
    pub context_ttl_secs: u64,
    #[serde(default = "default_context_capacity")]
    pub context_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            structure_ttl_secs: default_structure_ttl(),
            content_ttl_secs: default_content_ttl(),
            content_capacity: default_content_capacity(),
            context_ttl_secs: default_context_ttl(),
            context_capacity: default_context_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn to_settings(&self) -> CacheSettings {
        CacheSettings {
            structure_ttl: Duration::from_secs(self.structure_ttl_secs),
            content_ttl: Duration::from_secs(self.content_ttl_secs),
            content_capacity: self.content_capacity,
            context_ttl: Duration::from_secs(self.context_ttl_secs),
            context_capacity: self.context_capacity,
        }
    }
}

fn default_structure_ttl() -> u64 {
    300
}

fn default_content_ttl() -> u64 {
    600
}

fn default_content_capacity() -> usize {
    500
}

fn default_context_ttl() -> u64 {
    300
}

fn default_context_capacity() -> usize {
    128
}

/// Output heuristics for the renderer.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Row count at which `smart` switches from full output to a summary.
    #[serde(default = "default_smart_threshold")]
    pub smart_threshold: usize,
    #[serde(default = "default_compact_max_chars")]
    pub compact_max_chars: usize,
    #[serde(default = "default_summary_preview_rows")]
    pub summary_preview_rows: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            smart_threshold: default_smart_threshold(),
            compact_max_chars: default_compact_max_chars(),
            summary_preview_rows: default_summary_preview_rows(),
        }
    }
}

impl RenderConfig {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            smart_threshold: self.smart_threshold,
            compact_max_chars: self.compact_max_chars,
            summary_preview_rows: self.summary_preview_rows,
        }
    }
}

fn default_smart_threshold() -> usize {
    50
}

fn default_compact_max_chars() -> usize {
    4000
}

fn default_summary_preview_rows() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    /// Folders to exclude from scans (relative to vault_root).
    pub excluded_folders: Vec<PathBuf>,
    pub cache: CacheConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Build a configuration for a bare vault directory with default settings.
    ///
    /// Used when no config file is present but a vault root is known.
    pub fn for_vault(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            active_profile: "default".to_string(),
            vault_root: vault_root.into(),
            excluded_folders: Vec::new(),
            cache: CacheConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
