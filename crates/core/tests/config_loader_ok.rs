use mdquery_core::config::loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_default_profile_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/vault"
excluded_folders = ["{{vault_root}}/archive/", "templates"]

[cache]
structure_ttl_secs = 60
content_capacity = 50

[render]
smart_threshold = 25
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/vault");
    assert_eq!(
        rc.excluded_folders,
        vec![PathBuf::from("/tmp/vault/archive"), PathBuf::from("templates")]
    );

    let settings = rc.cache.to_settings();
    assert_eq!(settings.structure_ttl, Duration::from_secs(60));
    assert_eq!(settings.content_capacity, 50);
    assert_eq!(settings.content_ttl, Duration::from_secs(600));

    let options = rc.render.to_options();
    assert_eq!(options.smart_threshold, 25);
    assert_eq!(options.summary_preview_rows, 10);
}

#[test]
fn load_with_profile_override_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("mdquery/config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/def"

[profiles.work]
vault_root = "/tmp/work"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), Some("work")).expect("should load");
    assert_eq!(rc.active_profile, "work");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/work");
    assert!(rc.excluded_folders.is_empty());
}

#[test]
fn log_file_expands_vault_root() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[profiles.default]
vault_root = "/tmp/vault"

[logging]
level = "debug"
file = "{{vault_root}}/.mdquery/mdq.log"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file, Some(PathBuf::from("/tmp/vault/.mdquery/mdq.log")));
}
