use mdquery_core::config::loader::{default_config_path, ConfigLoader};
use std::path::Path;

use crate::logging;

pub fn run(config: Option<&Path>, profile: Option<&str>, vault: Option<&Path>) {
    match ConfigLoader::load(config, profile) {
        Ok(mut rc) => {
            if let Some(vault) = vault {
                rc.vault_root = vault.to_path_buf();
            }
            logging::init(&rc);

            println!("OK   mdq doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("vault_root: {}", rc.vault_root.display());
            let excluded: Vec<String> =
                rc.excluded_folders.iter().map(|p| p.display().to_string()).collect();
            println!("excluded_folders: [{}]", excluded.join(", "));
            println!(
                "cache.ttl: structure={}s content={}s context={}s",
                rc.cache.structure_ttl_secs, rc.cache.content_ttl_secs, rc.cache.context_ttl_secs
            );
            println!(
                "cache.capacity: content={} context={}",
                rc.cache.content_capacity, rc.cache.context_capacity
            );
            println!("render.smart_threshold: {}", rc.render.smart_threshold);
            println!("build: {}", mdquery_core::build_info());

            if !rc.vault_root.is_dir() {
                tracing::warn!("vault root {} is not a directory", rc.vault_root.display());
                println!("FAIL vault_root does not exist: {}", rc.vault_root.display());
                std::process::exit(1);
            }
        }
        Err(e) => {
            println!("FAIL mdq doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
