pub mod doctor;
pub mod output;
pub mod query;
pub mod show;
pub mod stats;
pub mod structure;

use mdquery_core::config::loader::ConfigLoader;
use mdquery_core::config::types::ResolvedConfig;
use mdquery_core::QueryEngine;
use std::path::Path;

/// Resolve configuration for a command, exiting on failure.
///
/// `--vault` alone needs no config file; combined with `--config` it
/// overrides the profile's vault root.
pub fn load_config(
    config: Option<&Path>,
    profile: Option<&str>,
    vault: Option<&Path>,
) -> ResolvedConfig {
    if let (Some(vault), None, None) = (vault, config, profile) {
        return ResolvedConfig::for_vault(vault);
    }

    match ConfigLoader::load(config, profile) {
        Ok(mut rc) => {
            if let Some(vault) = vault {
                rc.vault_root = vault.to_path_buf();
            }
            rc
        }
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn open_engine(rc: &ResolvedConfig) -> QueryEngine {
    match QueryEngine::from_config(rc) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error opening vault: {}", e);
            std::process::exit(1);
        }
    }
}
